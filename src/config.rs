use {
	crate::{crop::CropSettings, Vec2},
	const_format::concatcp,
	serde::Deserialize,
	std::{
		env, fs, io,
		path::{Path, PathBuf},
		time::Duration,
	},
};

/// Looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "portraits.toml";

pub const GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const GEMINI_IMAGE_MODEL: &str = "gemini-3-pro-image-preview";

/// Relative to the home directory.
pub const HELPER_SCRIPT: &str =
	concatcp!(".npm-global/lib/node_modules/openclaw/skills/", "nano-banana-pro", "/scripts/generate_image.py");

pub const PORTRAITS_DIR: &str = "portraits";
pub const SPRITESHEET_FILE: &str = concatcp!(PORTRAITS_DIR, "/spritesheet_all.png");
pub const BACKGROUND_FILE: &str = "maps/ch0_prologue/prologue_bg.png";

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct Config {
	pub gemini: GeminiConfig,
	pub helper: HelperConfig,
	pub crop: CropConfig,
	pub paths: PathsConfig,
}

#[derive(Deserialize, Debug)]
#[serde(default)]
pub struct GeminiConfig {
	pub endpoint: String,
	pub model: String,
	pub spritesheetTimeoutSecs: u64,
	pub backgroundTimeoutSecs: u64,
}

#[derive(Deserialize, Debug)]
#[serde(default)]
pub struct HelperConfig {
	/// Program that runs the helper script, as `<runner> run <script> ...`.
	pub runner: String,
	/// Defaults to `~/` + [`HELPER_SCRIPT`].
	pub script: Option<PathBuf>,
}

#[derive(Deserialize, Debug)]
#[serde(default)]
pub struct CropConfig {
	pub targetWidth: u32,
	pub targetHeight: u32,
	pub verticalInset: u32,
	pub squareCells: bool,
}

#[derive(Deserialize, Debug)]
#[serde(default)]
pub struct PathsConfig {
	pub spritesheet: PathBuf,
	pub portraitsDir: PathBuf,
	pub background: PathBuf,
	/// Built-in roster when absent.
	pub roster: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("cannot read config {path}")]
	Read { path: String, source: io::Error },

	#[error("malformed config {path}")]
	Parse { path: String, source: toml::de::Error },

	#[error("crop target must be at least 1x1, got {0}x{1}")]
	EmptyTarget(u32, u32),
}

impl Default for GeminiConfig {
	fn default() -> Self {
		GeminiConfig {
			endpoint: GEMINI_ENDPOINT.to_owned(),
			model: GEMINI_IMAGE_MODEL.to_owned(),
			spritesheetTimeoutSecs: 180,
			backgroundTimeoutSecs: 120,
		}
	}
}

impl Default for HelperConfig {
	fn default() -> Self {
		HelperConfig { runner: "uv".to_owned(), script: None }
	}
}

impl Default for CropConfig {
	fn default() -> Self {
		CropConfig { targetWidth: 240, targetHeight: 240, verticalInset: 2, squareCells: true }
	}
}

impl Default for PathsConfig {
	fn default() -> Self {
		PathsConfig {
			spritesheet: SPRITESHEET_FILE.into(),
			portraitsDir: PORTRAITS_DIR.into(),
			background: BACKGROUND_FILE.into(),
			roster: None,
		}
	}
}

impl Config {
	/// `path` must exist when given; otherwise [`DEFAULT_CONFIG_FILE`] is read if present, else defaults.
	pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
		let path = match path {
			Some(path) => path,
			None if Path::new(DEFAULT_CONFIG_FILE).is_file() => Path::new(DEFAULT_CONFIG_FILE),
			None => return Ok(Config::default()),
		};
		let text = fs::read_to_string(path)
			.map_err(|source| ConfigError::Read { path: path.display().to_string(), source })?;
		let config = Config::fromTOML(&text)
			.map_err(|source| ConfigError::Parse { path: path.display().to_string(), source })?;
		Ok(config)
	}

	pub fn fromTOML(toml: &str) -> Result<Config, toml::de::Error> {
		toml::from_str(toml)
	}
}

impl GeminiConfig {
	pub fn spritesheetTimeout(&self) -> Duration {
		Duration::from_secs(self.spritesheetTimeoutSecs)
	}

	pub fn backgroundTimeout(&self) -> Duration {
		Duration::from_secs(self.backgroundTimeoutSecs)
	}
}

impl HelperConfig {
	pub fn scriptPath(&self) -> PathBuf {
		match &self.script {
			Some(script) => script.clone(),
			None => homeDir().join(HELPER_SCRIPT),
		}
	}
}

impl CropConfig {
	pub fn settings(&self) -> Result<CropSettings, ConfigError> {
		let targetDimensions: Vec2 = [self.targetWidth, self.targetHeight];
		if targetDimensions.contains(&0) {
			return Err(ConfigError::EmptyTarget(self.targetWidth, self.targetHeight));
		}
		Ok(CropSettings { targetDimensions, verticalInset: self.verticalInset, squareCells: self.squareCells })
	}
}

fn homeDir() -> PathBuf {
	env::var_os("HOME").or_else(|| env::var_os("USERPROFILE")).map_or_else(|| PathBuf::from("."), PathBuf::from)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn emptyFileGivesDefaults() {
		let config = Config::fromTOML("").unwrap();
		assert_eq!(config.gemini.model, GEMINI_IMAGE_MODEL);
		assert_eq!(config.gemini.spritesheetTimeout(), Duration::from_secs(180));
		assert_eq!(config.gemini.backgroundTimeout(), Duration::from_secs(120));
		assert_eq!(config.helper.runner, "uv");
		assert_eq!(config.paths.spritesheet, Path::new("portraits/spritesheet_all.png"));
		assert_eq!(config.paths.portraitsDir, Path::new("portraits"));
		let settings = config.crop.settings().unwrap();
		assert_eq!(settings.targetDimensions, [240, 240]);
		assert_eq!(settings.verticalInset, 2);
		assert!(settings.squareCells);
	}

	#[test]
	fn partialSectionsKeepOtherDefaults() {
		let config = Config::fromTOML(
			r#"
			[gemini]
			model = "gemini-2.0-flash-exp"

			[crop]
			targetWidth = 96
			squareCells = false

			[paths]
			roster = "rosters/wide.toml"
			"#,
		)
		.unwrap();
		assert_eq!(config.gemini.model, "gemini-2.0-flash-exp");
		assert_eq!(config.gemini.endpoint, GEMINI_ENDPOINT);
		assert_eq!(config.crop.targetWidth, 96);
		assert_eq!(config.crop.targetHeight, 240);
		assert!(!config.crop.squareCells);
		assert_eq!(config.paths.roster.as_deref(), Some(Path::new("rosters/wide.toml")));
	}

	#[test]
	fn zeroTargetIsRejected() {
		let config = Config::fromTOML("[crop]\ntargetHeight = 0\n").unwrap();
		assert!(matches!(config.crop.settings(), Err(ConfigError::EmptyTarget(240, 0))));
	}

	#[test]
	fn explicitScriptWinsOverHome() {
		let config = Config::fromTOML("[helper]\nscript = \"/opt/gen.py\"\n").unwrap();
		assert_eq!(config.helper.scriptPath(), Path::new("/opt/gen.py"));
		assert!(Config::default().helper.scriptPath().ends_with("nano-banana-pro/scripts/generate_image.py"));
	}

	#[test]
	fn missingExplicitFileIsAnError() {
		let err = Config::load(Some(Path::new("/nonexistent/portraits.toml"))).unwrap_err();
		assert!(matches!(err, ConfigError::Read { .. }));
		let chain = format!("{:#}", anyhow::Error::from(err));
		assert_eq!(chain.matches("os error").count(), 1, "{chain}");
	}

	#[test]
	fn cropSettingsAreOnlyCheckedByTheCropPaths() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("portraits.toml");
		fs::write(&path, "[crop]\ntargetWidth = 0\n").unwrap();
		let config = Config::load(Some(&path)).unwrap();
		assert!(matches!(config.crop.settings(), Err(ConfigError::EmptyTarget(0, 240))));
	}
}
