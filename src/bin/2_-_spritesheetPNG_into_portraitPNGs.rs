#![warn(clippy::pedantic, elided_lifetimes_in_paths, explicit_outlives_requirements)]
#![allow(non_snake_case)]

use {
	anyhow::Context,
	clap::Parser,
	std::{path::PathBuf, process::ExitCode},
	tactics_portraits::{cli::CommonArgs, crop::cropSpritesheet, roster::Roster, runTool},
	tracing::info,
};

fn main() -> ExitCode {
	/// Cut a generated spritesheet into one fixed-size portrait per roster character.
	#[derive(Parser, Debug)]
	struct Args {
		#[clap(flatten)]
		common: CommonArgs,
		/// Roster TOML naming the cells in row-major order; the built-in cast when omitted.
		#[clap(long)]
		roster: Option<PathBuf>,
		/// Directory for `<id>.png` files (default from config: portraits/).
		#[clap(long)]
		outputDir: Option<PathBuf>,
		/// Spritesheet PNG (default from config: portraits/spritesheet_all.png).
		spritesheet: Option<PathBuf>,
	}
	let Args { common, roster, outputDir, spritesheet } = Args::parse();
	common.startLogging();
	runTool(|| {
		let config = common.loadConfig()?;
		let roster = Roster::load(roster.as_deref().or(config.paths.roster.as_deref())).context("loading roster")?;
		let settings = config.crop.settings()?;
		let outputDir = outputDir.unwrap_or_else(|| config.paths.portraitsDir.clone());
		let written = cropSpritesheet(
			&spritesheet.unwrap_or_else(|| config.paths.spritesheet.clone()),
			&outputDir,
			&roster,
			&settings,
		)?;
		info!("done: {} portraits in {}", written.len(), outputDir.display());
		Ok(())
	})
}
