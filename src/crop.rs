//! Splitting a generated spritesheet into fixed-size portraits.

use {
	crate::{
		grid::{centeredOffset, fitWithin, trimBleed},
		roster::{Roster, RosterError},
		writePNG, Rectangle, Vec2, DIMENSIONS, HEIGHT, POINT, WIDTH, X, Y,
	},
	image::{imageops, imageops::FilterType, RgbaImage},
	std::path::{Path, PathBuf},
	tracing::{debug, info},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CropSettings {
	pub targetDimensions: Vec2,
	/// Pixels dropped from the top and bottom of every cell.
	pub verticalInset: u32,
	/// Trim wide cells to a square before scaling.
	pub squareCells: bool,
}

impl Default for CropSettings {
	fn default() -> Self {
		CropSettings { targetDimensions: [240, 240], verticalInset: 2, squareCells: true }
	}
}

#[derive(Debug, thiserror::Error)]
pub enum CropError {
	#[error("cannot find {}; run the spritesheet generator (1_-_roster_into_spritesheetPNG) first", .0.display())]
	MissingSpritesheet(PathBuf),

	#[error("invalid roster")]
	Roster(#[from] RosterError),

	#[error("cannot read {}", .path.display())]
	Open { path: PathBuf, source: image::ImageError },

	#[error("a {width}x{height} sheet is too small for a {rows}x{columns} grid")]
	SheetTooSmall { width: u32, height: u32, rows: u32, columns: u32 },

	#[error("cannot write {}", .path.display())]
	Write { path: PathBuf, source: png::EncodingError },
}

/// Crops `cell` out of `sheet` and centers it, scaled to fit, on a transparent canvas of the target size.
pub fn cropPortrait(sheet: &RgbaImage, cell: Rectangle, settings: &CropSettings) -> RgbaImage {
	let [point, dimensions] = trimBleed(cell, settings.verticalInset, settings.squareCells);
	let cropped = imageops::crop_imm(sheet, point[X], point[Y], dimensions[WIDTH], dimensions[HEIGHT]).to_image();
	let scaled = fitWithin(dimensions, settings.targetDimensions);
	let resized = if scaled == dimensions {
		cropped
	} else {
		imageops::resize(&cropped, scaled[WIDTH], scaled[HEIGHT], FilterType::Lanczos3)
	};
	let offset = centeredOffset(scaled, settings.targetDimensions);
	let mut canvas = RgbaImage::new(settings.targetDimensions[WIDTH], settings.targetDimensions[HEIGHT]);
	imageops::replace(&mut canvas, &resized, i64::from(offset[X]), i64::from(offset[Y]));
	canvas
}

/// Writes `<outputDir>/<id>.png` for every roster character, in row-major cell order.
pub fn cropSpritesheet(
	sheetPath: &Path,
	outputDir: &Path,
	roster: &Roster,
	settings: &CropSettings,
) -> Result<Vec<PathBuf>, CropError> {
	// Ids become file names under `outputDir`.
	roster.validate()?;
	if !sheetPath.is_file() {
		return Err(CropError::MissingSpritesheet(sheetPath.to_owned()));
	}
	let sheet = image::open(sheetPath)
		.map_err(|source| CropError::Open { path: sheetPath.to_owned(), source })?
		.to_rgba8();
	let (width, height) = sheet.dimensions();
	let grid = roster.grid;
	if width < grid.columns || height < grid.rows {
		return Err(CropError::SheetTooSmall { width, height, rows: grid.rows, columns: grid.columns });
	}
	info!("spritesheet {width}x{height}, cells ~{}x{}", width / grid.columns, height / grid.rows);

	let mut written = Vec::with_capacity(roster.characters.len());
	for (i, ((row, column, cell), character)) in grid.cells([width, height]).zip(&roster.characters).enumerate() {
		debug!(row, column, point = ?cell[POINT], dimensions = ?cell[DIMENSIONS], "cell");
		let portrait = cropPortrait(&sheet, cell, settings);
		let path = outputDir.join(format!("{}.png", character.id));
		writePNG(&path, &portrait).map_err(|source| CropError::Write { path: path.clone(), source })?;
		info!("[{i:02}] {}: saved to {}", character.id, path.display());
		written.push(path);
	}
	Ok(written)
}

#[cfg(test)]
mod tests {
	use {super::*, image::Rgba};

	fn filled(dimensions: Vec2, color: [u8; 4]) -> RgbaImage {
		RgbaImage::from_pixel(dimensions[WIDTH], dimensions[HEIGHT], Rgba(color))
	}

	#[test]
	fn exactFitIsCopiedLosslessly() {
		let mut sheet = RgbaImage::new(244, 244);
		for (x, y, pixel) in sheet.enumerate_pixels_mut() {
			*pixel = Rgba([x as u8, y as u8, 7, 255]);
		}
		let settings = CropSettings { targetDimensions: [244, 240], verticalInset: 2, squareCells: false };
		let portrait = cropPortrait(&sheet, [[0, 0], [244, 244]], &settings);
		assert_eq!(portrait.dimensions(), (244, 240));
		assert_eq!(portrait.get_pixel(0, 0), &Rgba([0, 2, 7, 255]));
		assert_eq!(portrait.get_pixel(243, 239), &Rgba([243, 241, 7, 255]));
	}

	#[test]
	fn wideCellIsCenteredWithTransparentBands() {
		let sheet = filled([300, 200], [40, 80, 120, 255]);
		// 300x200 -> square trim 50 each side and 2 top/bottom -> 200x196 -> 240x235, offset (0, 2).
		let portrait = cropPortrait(&sheet, [[0, 0], [300, 200]], &default());
		assert_eq!(portrait.dimensions(), (240, 240));
		assert_eq!(portrait.get_pixel(120, 0)[3], 0);
		assert_eq!(portrait.get_pixel(120, 1)[3], 0);
		assert_eq!(portrait.get_pixel(120, 238)[3], 0);
		let center = portrait.get_pixel(120, 120);
		for (channel, expected) in center.0.iter().zip([40, 80, 120, 255]) {
			assert!(channel.abs_diff(expected) <= 1, "{center:?}");
		}
	}

	#[test]
	fn tallCellGetsSideBands() {
		let sheet = filled([100, 204], [255, 0, 0, 255]);
		let portrait = cropPortrait(&sheet, [[0, 0], [100, 204]], &default());
		// 100x200 -> 120x240, offset (60, 0).
		assert_eq!(portrait.get_pixel(59, 120)[3], 0);
		assert_eq!(portrait.get_pixel(180, 120)[3], 0);
		assert!(portrait.get_pixel(60, 120)[3] > 0);
		assert!(portrait.get_pixel(179, 120)[3] > 0);
	}

	fn default() -> CropSettings {
		CropSettings::default()
	}
}
