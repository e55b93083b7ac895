//! Arguments shared by the tools.

use {
	crate::{
		config::Config,
		generate::{self, apiKeyFromEnv, Backend, Request, Resolution},
		logging::initLogging,
		prompt::{preview, Style},
	},
	anyhow::Context,
	clap::Args,
	std::{path::PathBuf, time::Duration},
	tracing::info,
};

#[derive(Args, Debug)]
pub struct CommonArgs {
	/// TOML config; `portraits.toml` in the working directory is used when present.
	#[clap(long)]
	pub config: Option<PathBuf>,

	/// More log output (-v debug, -vv trace).
	#[clap(short, long, parse(from_occurrences))]
	pub verbose: u8,
}

#[derive(Args, Debug)]
pub struct GenerationArgs {
	/// `api` calls Gemini directly, `helper` shells out to the nano-banana-pro script.
	#[clap(long, default_value = "api")]
	pub backend: Backend,

	/// 1K, 2K or 4K.
	#[clap(long)]
	pub resolution: Option<Resolution>,

	/// `flash` or `pro` wording.
	#[clap(long, default_value = "pro")]
	pub style: Style,

	/// Print the prompt and exit without calling anything.
	#[clap(long)]
	pub printPrompt: bool,
}

impl CommonArgs {
	pub fn startLogging(&self) {
		initLogging(self.verbose);
	}

	pub fn loadConfig(&self) -> anyhow::Result<Config> {
		Config::load(self.config.as_deref()).context("loading config")
	}
}

impl GenerationArgs {
	pub fn request(
		&self,
		prompt: String,
		defaultResolution: Resolution,
		aspectRatio: Option<&str>,
		output: PathBuf,
		timeout: Duration,
	) -> Request {
		Request {
			prompt,
			resolution: self.resolution.unwrap_or(defaultResolution),
			aspectRatio: aspectRatio.map(str::to_owned),
			output,
			timeout,
		}
	}

	/// The key a generator needs, checked before any other work. `None` with `--print-prompt`.
	pub fn apiKey(&self) -> Result<Option<String>, generate::Error> {
		if self.printPrompt {
			Ok(None)
		} else {
			apiKeyFromEnv().map(Some)
		}
	}

	/// Generates `request.output`, or without a key only prints the prompt and returns `false`.
	pub fn run(&self, config: &Config, request: &Request, apiKey: Option<String>) -> anyhow::Result<bool> {
		let Some(apiKey) = apiKey else {
			println!("{}", request.prompt);
			return Ok(false);
		};
		info!("prompt: {}", preview(&request.prompt, 100));
		let generator = generate::generator(self.backend, config, apiKey);
		generate::run(generator.as_ref(), request)
			.with_context(|| format!("generating {}", request.output.display()))?;
		Ok(true)
	}
}
