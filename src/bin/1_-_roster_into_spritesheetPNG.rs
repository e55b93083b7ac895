#![warn(clippy::pedantic, elided_lifetimes_in_paths, explicit_outlives_requirements)]
#![allow(non_snake_case)]

use {
	anyhow::Context,
	clap::Parser,
	std::{path::PathBuf, process::ExitCode},
	tactics_portraits::{
		cli::{CommonArgs, GenerationArgs},
		generate::Resolution,
		prompt::spritesheetPrompt,
		roster::Roster,
		runTool,
	},
	tracing::info,
};

fn main() -> ExitCode {
	/// Generate the character spritesheet, one portrait per grid cell.
	#[derive(Parser, Debug)]
	struct Args {
		#[clap(flatten)]
		common: CommonArgs,
		#[clap(flatten)]
		generation: GenerationArgs,
		/// Roster TOML; the built-in 16-character cast when omitted.
		#[clap(long)]
		roster: Option<PathBuf>,
		/// Where to write the sheet (default from config: portraits/spritesheet_all.png).
		#[clap(long)]
		output: Option<PathBuf>,
	}
	let Args { common, generation, roster, output } = Args::parse();
	common.startLogging();
	runTool(|| {
		let apiKey = generation.apiKey()?;
		let config = common.loadConfig()?;
		let roster = Roster::load(roster.as_deref().or(config.paths.roster.as_deref())).context("loading roster")?;
		let output = output.unwrap_or_else(|| config.paths.spritesheet.clone());
		let request = generation.request(
			spritesheetPrompt(&roster, generation.style),
			Resolution::TwoK,
			None,
			output,
			config.gemini.spritesheetTimeout(),
		);
		if generation.run(&config, &request, apiKey)? {
			info!(
				"check {} ({} portraits, {}x{} grid); if it looks right, run 2_-_spritesheetPNG_into_portraitPNGs, \
				 otherwise adjust the roster descriptions and retry",
				request.output.display(),
				roster.characters.len(),
				roster.grid.rows,
				roster.grid.columns,
			);
		}
		Ok(())
	})
}
