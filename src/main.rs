#![warn(clippy::pedantic, elided_lifetimes_in_paths, explicit_outlives_requirements)]
#![allow(non_snake_case)]

use {
	anyhow::Context,
	clap::Parser,
	std::{path::PathBuf, process::ExitCode},
	tactics_portraits::{
		cli::{CommonArgs, GenerationArgs},
		crop::cropSpritesheet,
		generate::Resolution,
		prompt::spritesheetPrompt,
		roster::Roster,
		runTool,
	},
	tracing::{info, warn},
};

fn main() -> ExitCode {
	/// Generate the spritesheet, then cut it into portraits.
	#[derive(Parser, Debug)]
	struct Args {
		#[clap(flatten)]
		common: CommonArgs,
		#[clap(flatten)]
		generation: GenerationArgs,
		/// Roster TOML; the built-in 16-character cast when omitted.
		#[clap(long)]
		roster: Option<PathBuf>,
		/// Crop the existing spritesheet without generating a new one.
		#[clap(long)]
		skipGeneration: bool,
	}
	let Args { common, generation, roster, skipGeneration } = Args::parse();
	common.startLogging();
	runTool(|| {
		let apiKey = if skipGeneration { None } else { generation.apiKey()? };
		let config = common.loadConfig()?;
		let roster = Roster::load(roster.as_deref().or(config.paths.roster.as_deref())).context("loading roster")?;
		let settings = config.crop.settings()?;
		let sheet = config.paths.spritesheet.clone();
		if skipGeneration {
			info!("skipping generation, cropping {}", sheet.display());
		} else {
			let request = generation.request(
				spritesheetPrompt(&roster, generation.style),
				Resolution::TwoK,
				None,
				sheet.clone(),
				config.gemini.spritesheetTimeout(),
			);
			if !generation.run(&config, &request, apiKey)? {
				return Ok(());
			}
		}
		let written = cropSpritesheet(&sheet, &config.paths.portraitsDir, &roster, &settings)?;
		if written.len() < roster.grid.cellCount() {
			warn!("{} of {} cells have no character and were skipped", roster.grid.cellCount() - written.len(), roster.grid.cellCount());
		}
		info!("done: {} portraits in {}; check them before committing", written.len(), config.paths.portraitsDir.display());
		Ok(())
	})
}
