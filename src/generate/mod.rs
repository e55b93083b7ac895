//! Image generation through Gemini, either over HTTP or through the nano-banana-pro helper script.

mod gemini;
mod helper;

pub use {
	gemini::{extractImage, GeminiApi, GenerateContentRequest, GenerateContentResponse},
	helper::{runWithTimeout, HelperScript},
};

use {
	crate::{config::Config, writePNG, API_KEY_VAR},
	core::str::FromStr,
	std::{
		env, fmt, io,
		path::PathBuf,
		process::ExitStatus,
		time::{Duration, Instant},
	},
	tracing::info,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
	OneK,
	TwoK,
	FourK,
}

impl Resolution {
	pub fn asStr(self) -> &'static str {
		match self {
			Resolution::OneK => "1K",
			Resolution::TwoK => "2K",
			Resolution::FourK => "4K",
		}
	}
}

impl FromStr for Resolution {
	type Err = String;
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_uppercase().as_str() {
			"1K" => Ok(Resolution::OneK),
			"2K" => Ok(Resolution::TwoK),
			"4K" => Ok(Resolution::FourK),
			_ => Err(format!("unknown resolution {s:?} (expected 1K, 2K or 4K)")),
		}
	}
}

impl fmt::Display for Resolution {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.asStr())
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Backend {
	/// Direct `generateContent` call.
	Api,
	/// `uv run` of the nano-banana-pro script.
	Helper,
}

impl FromStr for Backend {
	type Err = String;
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"api" => Ok(Backend::Api),
			"helper" => Ok(Backend::Helper),
			_ => Err(format!("unknown backend {s:?} (expected `api` or `helper`)")),
		}
	}
}

#[derive(Clone, Debug)]
pub struct Request {
	pub prompt: String,
	pub resolution: Resolution,
	/// e.g. `"16:9"`; the model picks when absent.
	pub aspectRatio: Option<String>,
	pub output: PathBuf,
	pub timeout: Duration,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("GEMINI_API_KEY is not set; export GEMINI_API_KEY='<your key>'")]
	MissingApiKey,

	#[error("nano-banana-pro helper script not found at {}", .0.display())]
	MissingHelper(PathBuf),

	#[error("generation timed out after {} s", .0.as_secs())]
	Timeout(Duration),

	#[error("cannot launch {program}")]
	Spawn { program: String, source: io::Error },

	#[error("helper exited with {status}: {stderr}")]
	HelperFailed { status: ExitStatus, stderr: String },

	#[error("API request failed with HTTP {status}: {body}")]
	Api { status: u16, body: String },

	#[error("API transport error: {0}")]
	Transport(String),

	#[error("no image data in the response: {0}")]
	NoImage(String),

	#[error("inline image data is not valid base64")]
	Base64(#[from] base64::DecodeError),

	#[error("returned bytes are not a readable image")]
	Decode(#[from] image::ImageError),

	#[error("cannot save image")]
	Save(#[from] png::EncodingError),

	#[error(transparent)]
	Io(#[from] io::Error),
}

impl Error {
	/// Follow-up advice for failures the user can fix on their side.
	pub fn hint(&self) -> Option<&'static str> {
		match self {
			Error::Api { status: 404, .. } => {
				Some("the model name may be wrong or the key lacks access to it; check the API key permissions")
			}
			Error::Api { status: 401 | 403, .. } => Some("check that the API key is valid and has access to the model"),
			Error::Api { body, .. } if body.contains("models/") || body.contains("not found") => {
				Some("the model name may be wrong or the key lacks access to it; check the API key permissions")
			}
			Error::MissingHelper(_) => Some("install the nano-banana-pro skill or use `--backend api`"),
			Error::Timeout(_) => Some("the network may be slow; try again or raise the timeout in portraits.toml"),
			_ => None,
		}
	}
}

pub trait ImageGenerator {
	fn name(&self) -> &'static str;

	/// Produces `request.output`. Parent directories already exist.
	fn generate(&self, request: &Request) -> Result<(), Error>;
}

/// The API key from the environment. An empty value counts as missing.
pub fn apiKeyFromEnv() -> Result<String, Error> {
	apiKeyFrom(env::var(API_KEY_VAR).ok())
}

pub fn apiKeyFrom(value: Option<String>) -> Result<String, Error> {
	match value {
		Some(key) if !key.trim().is_empty() => Ok(key),
		_ => Err(Error::MissingApiKey),
	}
}

pub fn generator(backend: Backend, config: &Config, apiKey: String) -> Box<dyn ImageGenerator> {
	match backend {
		Backend::Api => Box::new(GeminiApi::new(&config.gemini.endpoint, &config.gemini.model, apiKey)),
		Backend::Helper => Box::new(HelperScript::new(&config.helper.runner, config.helper.scriptPath(), apiKey)),
	}
}

/// Creates the output directory and runs one generation.
pub fn run(generator: &dyn ImageGenerator, request: &Request) -> Result<(), Error> {
	crate::ensureParentDir(&request.output)?;
	info!(
		backend = generator.name(),
		resolution = %request.resolution,
		output = %request.output.display(),
		"generating, this usually takes 30-60 s"
	);
	let started = Instant::now();
	generator.generate(request)?;
	info!(elapsed = ?started.elapsed(), "saved {}", request.output.display());
	Ok(())
}

/// Decodes whatever format the service returned and stores it as PNG.
pub fn saveImageBytes(bytes: &[u8], request: &Request) -> Result<(), Error> {
	let image = image::load_from_memory(bytes)?.to_rgba8();
	writePNG(&request.output, &image)?;
	Ok(())
}
