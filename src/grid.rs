use {
	crate::{Rectangle, Vec2, HEIGHT, WIDTH, X, Y},
	serde::{Deserialize, Serialize},
};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Grid {
	pub rows: u32,
	pub columns: u32,
}

impl Grid {
	pub fn cellCount(&self) -> usize {
		self.rows as usize * self.columns as usize
	}

	/// Bounding box of the cell at (`row`, `column`). Edges are `floor(i * W / C)`, so neighbouring
	/// cells share an edge and the last one ends exactly on the image border.
	pub fn cell(&self, imageDimensions: Vec2, row: u32, column: u32) -> Rectangle {
		let edge = |i: u32, count: u32, extent: u32| (u64::from(i) * u64::from(extent) / u64::from(count)) as u32;
		let (left, top) = (edge(column, self.columns, imageDimensions[WIDTH]), edge(row, self.rows, imageDimensions[HEIGHT]));
		let (right, bottom) = (
			edge(column + 1, self.columns, imageDimensions[WIDTH]),
			edge(row + 1, self.rows, imageDimensions[HEIGHT]),
		);
		[[left, top], [right - left, bottom - top]]
	}

	/// Row-major `(row, column, cell)` triples.
	pub fn cells(&self, imageDimensions: Vec2) -> impl Iterator<Item = (u32, u32, Rectangle)> + '_ {
		(0..self.rows).flat_map(move |row| {
			(0..self.columns).map(move |column| (row, column, self.cell(imageDimensions, row, column)))
		})
	}
}

/// Shrinks a cell to cut the bleed from its neighbours: `verticalInset` off the top and bottom, and with
/// `squareCells`, half the width/height difference off each side of a cell wider than it is tall.
pub fn trimBleed(cell: Rectangle, verticalInset: u32, squareCells: bool) -> Rectangle {
	let [point, dimensions] = cell;
	let horizontalInset = if squareCells {
		dimensions[WIDTH].saturating_sub(dimensions[HEIGHT]) / 2
	} else {
		0
	};
	let shrink = |extent: u32, inset: u32| {
		let inset = inset.min(extent.saturating_sub(1) / 2);
		(inset, extent - 2 * inset)
	};
	let (dx, width) = shrink(dimensions[WIDTH], horizontalInset);
	let (dy, height) = shrink(dimensions[HEIGHT], verticalInset);
	[[point[X] + dx, point[Y] + dy], [width, height]]
}

/// Largest size with the aspect ratio of `source` that fits inside `target`, never zero on either side.
pub fn fitWithin(source: Vec2, target: Vec2) -> Vec2 {
	let [sw, sh] = source.map(u64::from);
	let [tw, th] = target.map(u64::from);
	let [width, height] = if tw * sh <= th * sw {
		[tw, sh * tw / sw]
	} else {
		[sw * th / sh, th]
	};
	[width.max(1) as u32, height.max(1) as u32]
}

pub fn centeredOffset(content: Vec2, canvas: Vec2) -> Vec2 {
	[(canvas[X] - content[X]) / 2, (canvas[Y] - content[Y]) / 2]
}

#[cfg(test)]
mod tests {
	use {super::*, crate::DIMENSIONS};

	fn area(rectangle: &Rectangle) -> u64 {
		u64::from(rectangle[DIMENSIONS][WIDTH]) * u64::from(rectangle[DIMENSIONS][HEIGHT])
	}

	fn contains(rectangle: &Rectangle, point: Vec2) -> bool {
		let [origin, dimensions] = rectangle;
		(origin[X]..origin[X] + dimensions[WIDTH]).contains(&point[X])
			&& (origin[Y]..origin[Y] + dimensions[HEIGHT]).contains(&point[Y])
	}

	#[test]
	fn cellsTileTheImageExactly() {
		for (width, height) in [(240, 160), (97, 61), (37, 23), (6, 4)] {
			for (rows, columns) in [(4, 4), (4, 6), (3, 4), (1, 1)] {
				let grid = Grid { rows, columns };
				let cells: Vec<_> = grid.cells([width, height]).collect();
				assert_eq!(cells.len(), grid.cellCount());
				assert_eq!(cells.iter().map(|(.., cell)| area(cell)).sum::<u64>(), u64::from(width) * u64::from(height));
				for y in 0..height {
					for x in 0..width {
						let covering = cells.iter().filter(|(.., cell)| contains(cell, [x, y])).count();
						assert_eq!(covering, 1, "pixel ({x}, {y}) of {width}x{height} in {rows}x{columns}");
					}
				}
			}
		}
	}

	#[test]
	fn cellsAreRowMajor() {
		let grid = Grid { rows: 2, columns: 3 };
		let order: Vec<_> = grid.cells([300, 200]).map(|(row, column, _)| (row, column)).collect();
		assert_eq!(order, [(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (1, 2)]);
		assert_eq!(grid.cell([300, 200], 1, 2), [[200, 100], [100, 100]]);
	}

	#[test]
	fn unevenWidthsDifferByAtMostOne() {
		let grid = Grid { rows: 1, columns: 6 };
		let widths: Vec<_> = grid.cells([1000, 10]).map(|(.., cell)| cell[DIMENSIONS][WIDTH]).collect();
		assert_eq!(widths.iter().sum::<u32>(), 1000);
		assert!(widths.iter().all(|&w| w == 166 || w == 167));
	}

	#[test]
	fn trimBleed_squaresWideCells() {
		assert_eq!(trimBleed([[100, 50], [120, 100]], 2, true), [[110, 52], [100, 96]]);
		assert_eq!(trimBleed([[100, 50], [120, 100]], 2, false), [[100, 52], [120, 96]]);
	}

	#[test]
	fn trimBleed_leavesTallCellsWidthAlone() {
		assert_eq!(trimBleed([[0, 0], [80, 100]], 2, true), [[0, 2], [80, 96]]);
	}

	#[test]
	fn trimBleed_neverEmptiesTinyCells() {
		assert_eq!(trimBleed([[5, 5], [1, 3]], 2, true), [[5, 6], [1, 1]]);
		assert_eq!(trimBleed([[0, 0], [4, 2]], 2, true), [[1, 0], [2, 2]]);
	}

	#[test]
	fn fitWithin_preservesAspectRatio() {
		assert_eq!(fitWithin([300, 300], [240, 240]), [240, 240]);
		assert_eq!(fitWithin([340, 380], [240, 240]), [214, 240]);
		assert_eq!(fitWithin([76, 71], [240, 240]), [240, 224]);
		assert_eq!(fitWithin([120, 60], [240, 240]), [240, 120]);
		assert_eq!(fitWithin([1000, 1], [240, 240]), [240, 1]);
	}

	#[test]
	fn centeredOffset_splitsTheSlack() {
		assert_eq!(centeredOffset([214, 240], [240, 240]), [13, 0]);
		assert_eq!(centeredOffset([240, 224], [240, 240]), [0, 8]);
		assert_eq!(centeredOffset([240, 1], [240, 240]), [0, 119]);
	}
}
