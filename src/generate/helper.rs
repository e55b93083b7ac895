use {
	super::{Error, ImageGenerator, Request},
	crate::API_KEY_VAR,
	std::{
		io::Read,
		path::PathBuf,
		process::{Child, Command, Output, Stdio},
		thread,
		time::{Duration, Instant},
	},
	tracing::{debug, warn},
};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

pub struct HelperScript {
	runner: String,
	script: PathBuf,
	apiKey: String,
}

impl HelperScript {
	pub fn new(runner: &str, script: PathBuf, apiKey: String) -> Self {
		HelperScript { runner: runner.to_owned(), script, apiKey }
	}

	/// `<runner> run <script> --prompt .. --filename .. --resolution ..` with the key in the environment.
	pub fn command(&self, request: &Request) -> Command {
		let mut command = Command::new(&self.runner);
		command
			.arg("run")
			.arg(&self.script)
			.arg("--prompt")
			.arg(&request.prompt)
			.arg("--filename")
			.arg(&request.output)
			.arg("--resolution")
			.arg(request.resolution.asStr())
			.env(API_KEY_VAR, &self.apiKey);
		command
	}
}

impl ImageGenerator for HelperScript {
	fn name(&self) -> &'static str {
		"nano-banana-pro"
	}

	fn generate(&self, request: &Request) -> Result<(), Error> {
		if !self.script.is_file() {
			return Err(Error::MissingHelper(self.script.clone()));
		}
		if request.aspectRatio.is_some() {
			debug!("the helper script takes no aspect ratio; relying on the prompt");
		}
		let output = runWithTimeout(self.command(request), request.timeout)?;
		if !output.status.success() {
			return Err(Error::HelperFailed {
				status: output.status,
				stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
			});
		}
		let stdout = String::from_utf8_lossy(&output.stdout);
		for line in stdout.lines().filter(|line| !line.trim().is_empty()) {
			debug!("helper: {line}");
		}
		if !request.output.is_file() {
			return Err(Error::NoImage(format!("helper exited successfully but wrote no {}", request.output.display())));
		}
		Ok(())
	}
}

/// Runs `command` to completion with captured output, killing it once `timeout` has passed.
pub fn runWithTimeout(mut command: Command, timeout: Duration) -> Result<Output, Error> {
	let program = command.get_program().to_string_lossy().into_owned();
	let mut child = command
		.stdin(Stdio::null())
		.stdout(Stdio::piped())
		.stderr(Stdio::piped())
		.spawn()
		.map_err(|source| Error::Spawn { program, source })?;
	// Drained on their own threads so a chatty child cannot block on a full pipe.
	let stdout = drain(child.stdout.take());
	let stderr = drain(child.stderr.take());
	let deadline = Instant::now() + timeout;
	let status = loop {
		if let Some(status) = child.try_wait()? {
			break status;
		}
		if Instant::now() >= deadline {
			kill(&mut child);
			return Err(Error::Timeout(timeout));
		}
		thread::sleep(POLL_INTERVAL);
	};
	Ok(Output { status, stdout: join(stdout), stderr: join(stderr) })
}

fn drain(pipe: Option<impl Read + Send + 'static>) -> Option<thread::JoinHandle<Vec<u8>>> {
	pipe.map(|mut pipe| {
		thread::spawn(move || {
			let mut buffer = Vec::new();
			if let Err(err) = pipe.read_to_end(&mut buffer) {
				warn!("reading child output: {err}");
			}
			buffer
		})
	})
}

fn join(handle: Option<thread::JoinHandle<Vec<u8>>>) -> Vec<u8> {
	handle.and_then(|handle| handle.join().ok()).unwrap_or_default()
}

fn kill(child: &mut Child) {
	if let Err(err) = child.kill() {
		warn!("cannot kill timed-out child {}: {err}", child.id());
	}
	_ = child.wait();
}

#[cfg(test)]
mod tests {
	use {super::*, crate::generate::Resolution, std::ffi::OsStr};

	fn request() -> Request {
		Request {
			prompt: "sheet".to_owned(),
			resolution: Resolution::OneK,
			aspectRatio: None,
			output: "portraits/sheet.png".into(),
			timeout: Duration::from_secs(5),
		}
	}

	#[test]
	fn commandPassesPromptFileAndResolution() {
		let helper = HelperScript::new("uv", "/opt/generate_image.py".into(), "secret".to_owned());
		let command = helper.command(&request());
		assert_eq!(command.get_program(), "uv");
		let args: Vec<_> = command.get_args().collect();
		assert_eq!(
			args,
			["run", "/opt/generate_image.py", "--prompt", "sheet", "--filename", "portraits/sheet.png", "--resolution", "1K"]
				.map(OsStr::new)
		);
		let env: Vec<_> = command.get_envs().collect();
		assert_eq!(env, [(OsStr::new("GEMINI_API_KEY"), Some(OsStr::new("secret")))]);
	}

	#[test]
	fn missingScriptIsReportedBeforeSpawning() {
		let helper = HelperScript::new("definitely-not-a-runner", "/nonexistent/generate_image.py".into(), "k".to_owned());
		assert!(matches!(helper.generate(&request()), Err(Error::MissingHelper(path)) if path.ends_with("generate_image.py")));
	}

	#[test]
	fn unknownProgramIsASpawnError() {
		let err = runWithTimeout(Command::new("definitely-not-a-program-7f3a"), Duration::from_secs(1)).unwrap_err();
		assert!(matches!(err, Error::Spawn { program, .. } if program == "definitely-not-a-program-7f3a"));
	}

	#[cfg(unix)]
	#[test]
	fn capturesOutputAndStatus() {
		let mut command = Command::new("sh");
		command.args(["-c", "echo out; echo err >&2; exit 3"]);
		let output = runWithTimeout(command, Duration::from_secs(10)).unwrap();
		assert_eq!(output.status.code(), Some(3));
		assert_eq!(output.stdout, b"out\n");
		assert_eq!(output.stderr, b"err\n");
	}

	#[cfg(unix)]
	#[test]
	fn slowChildIsKilledAtTheDeadline() {
		let mut command = Command::new("sh");
		command.args(["-c", "sleep 10"]);
		let started = Instant::now();
		let err = runWithTimeout(command, Duration::from_millis(200)).unwrap_err();
		assert!(matches!(err, Error::Timeout(timeout) if timeout == Duration::from_millis(200)));
		assert!(started.elapsed() < Duration::from_secs(5));
	}

	#[cfg(unix)]
	#[test]
	fn successWithoutAnImageIsNoImage() {
		let dir = tempfile::tempdir().unwrap();
		let script = dir.path().join("generate_image.py");
		std::fs::write(&script, "").unwrap();
		// `true run <script> ...` exits 0 and writes nothing.
		let helper = HelperScript::new("true", script, "k".to_owned());
		let request = Request { output: dir.path().join("sheet.png"), ..request() };
		match helper.generate(&request) {
			Err(Error::NoImage(message)) => assert!(message.contains("sheet.png"), "{message}"),
			other => panic!("{other:?}"),
		}
	}

	#[cfg(unix)]
	#[test]
	fn failingHelperKeepsStderr() {
		let dir = tempfile::tempdir().unwrap();
		let script = dir.path().join("generate_image.py");
		std::fs::write(&script, "").unwrap();
		// `sh run <script> ...` runs a file named `run`, which does not exist, so sh fails on stderr.
		let helper = HelperScript::new("sh", script, "k".to_owned());
		match helper.generate(&request()) {
			Err(Error::HelperFailed { status, stderr }) => {
				assert!(!status.success());
				assert!(!stderr.is_empty());
			}
			other => panic!("{other:?}"),
		}
	}
}
