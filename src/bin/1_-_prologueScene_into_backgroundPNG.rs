#![warn(clippy::pedantic, elided_lifetimes_in_paths, explicit_outlives_requirements)]
#![allow(non_snake_case)]

use {
	clap::Parser,
	std::{path::PathBuf, process::ExitCode},
	tactics_portraits::{
		cli::{CommonArgs, GenerationArgs},
		generate::Resolution,
		prompt::prologuePrompt,
		runTool,
	},
	tracing::info,
};

const ASPECT_RATIO: &str = "16:9";

fn main() -> ExitCode {
	/// Generate the prologue background: the palace hall under siege at night.
	#[derive(Parser, Debug)]
	struct Args {
		#[clap(flatten)]
		common: CommonArgs,
		#[clap(flatten)]
		generation: GenerationArgs,
		/// Where to write the background (default from config: maps/ch0_prologue/prologue_bg.png).
		#[clap(long)]
		output: Option<PathBuf>,
	}
	let Args { common, generation, output } = Args::parse();
	common.startLogging();
	runTool(|| {
		let apiKey = generation.apiKey()?;
		let config = common.loadConfig()?;
		// 1K is plenty for a GBA-style scene.
		let request = generation.request(
			prologuePrompt(generation.style).to_owned(),
			Resolution::OneK,
			Some(ASPECT_RATIO),
			output.unwrap_or_else(|| config.paths.background.clone()),
			config.gemini.backgroundTimeout(),
		);
		if generation.run(&config, &request, apiKey)? {
			info!("check {}; commit it if it looks right", request.output.display());
		}
		Ok(())
	})
}
