#![warn(clippy::pedantic, elided_lifetimes_in_paths, explicit_outlives_requirements)]
#![allow(non_snake_case)]

pub mod cli;
pub mod config;
pub mod crop;
pub mod generate;
pub mod grid;
pub mod logging;
pub mod prompt;
pub mod roster;

use {
	image::RgbaImage,
	png::{BitDepth, ColorType},
	std::{
		fs::{self, File},
		io::{self, BufWriter},
		path::Path,
		process::ExitCode,
	},
	tracing::error,
};

pub type Vec2 = [u32; 2];
pub type Rectangle = [Vec2; 2];

pub const X: usize = 0;
pub const Y: usize = 1;
pub const WIDTH: usize = 0;
pub const HEIGHT: usize = 1;
pub const POINT: usize = 0;
pub const DIMENSIONS: usize = 1;

pub const API_KEY_VAR: &str = "GEMINI_API_KEY";

pub fn ensureParentDir(path: &Path) -> io::Result<()> {
	match path.parent() {
		Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
		_ => Ok(()),
	}
}

/// Writes `image` as an 8-bit RGBA PNG, creating missing parent directories.
pub fn writePNG(path: &Path, image: &RgbaImage) -> Result<(), png::EncodingError> {
	ensureParentDir(path)?;
	let mut png = png::Encoder::new(BufWriter::new(File::create(path)?), image.width(), image.height());
	png.set_color(ColorType::Rgba);
	png.set_depth(BitDepth::Eight);
	png.write_header()?.write_image_data(image.as_raw())
}

/// Runs a tool body, logging the error chain (and a hint, if the error carries one) on failure.
pub fn runTool(body: impl FnOnce() -> anyhow::Result<()>) -> ExitCode {
	match body() {
		Ok(()) => ExitCode::SUCCESS,
		Err(err) => {
			error!("{err:#}");
			if let Some(hint) = err.downcast_ref::<generate::Error>().and_then(generate::Error::hint) {
				error!("hint: {hint}");
			}
			ExitCode::FAILURE
		}
	}
}
