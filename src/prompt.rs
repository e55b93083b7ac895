use {
	crate::roster::Roster,
	core::{fmt::Write, str::FromStr},
	std::fmt,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Style {
	/// Plain GBA pixel-art portraits.
	Flash,
	/// Thick outlines and flat colours that stay readable when shrunk to 32x32.
	Pro,
}

impl FromStr for Style {
	type Err = String;
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"flash" | "v1" => Ok(Style::Flash),
			"pro" | "v2" => Ok(Style::Pro),
			_ => Err(format!("unknown prompt style {s:?} (expected `flash` or `pro`)")),
		}
	}
}

impl fmt::Display for Style {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Style::Flash => "flash",
			Style::Pro => "pro",
		})
	}
}

const SERIES_STYLE: &str = "Fire Emblem GBA style";
const NO_OVERLAYS: &str = "NO WATERMARK, NO TEXT, NO UI.";

const FLASH_PORTRAIT_STYLE: &str = "\
All characters must share the EXACT same art style: 16-bit pixel art, anime style, crisp edges, vibrant colors, \
white background.
Each portrait is a head-and-shoulders shot, facing forward, consistent size and lighting.";

const PRO_PORTRAIT_STYLE: &str = "\
STYLE REQUIREMENTS (CRITICAL):
- 16-bit pixel art style, low resolution appearance.
- THICK, BOLD black outlines for all characters (strong silhouette).
- Simple, chunky details. NO fine lines, NO thin details, NO realistic shading.
- Vibrant, flat colors. High contrast.
- White background. Sharp edges.
- Faces should be clear and readable even at small sizes (32x32).
- Consistent art style across all {count} characters.";

/// Prompt asking for every roster character, one per grid cell, in row-major order.
pub fn spritesheetPrompt(roster: &Roster, style: Style) -> String {
	let (count, rows, columns) = (roster.characters.len(), roster.grid.rows, roster.grid.columns);
	let mut prompt = String::with_capacity(4096);
	// `write!` into a String cannot fail.
	let _ = writeln!(
		prompt,
		"{SERIES_STYLE} character sprite sheet containing EXACTLY {count} distinct character portraits arranged in \
		 a {rows}x{columns} grid ({rows} rows, {columns} columns)."
	);
	let _ = writeln!(
		prompt,
		"IMPORTANT: Generate ONLY these {count} portraits. Do NOT add extra characters, duplicates, or decorative \
		 elements. Just the {count} portraits in a clean grid."
	);
	match style {
		Style::Flash => prompt.push_str(FLASH_PORTRAIT_STYLE),
		Style::Pro => {
			prompt.push('\n');
			prompt.push_str(&PRO_PORTRAIT_STYLE.replace("{count}", &count.to_string()));
		}
	}
	prompt.push_str("\n\nCharacters (Row by Row, Left to Right):");
	for (i, (row, column, character)) in roster.cellAssignments().enumerate() {
		if column == 0 {
			if row != 0 {
				prompt.push('\n');
			}
			let _ = write!(prompt, "\nRow {}:", row + 1);
		}
		let _ = write!(prompt, "\n{}. {}: {}", i + 1, character.displayName(), character.description);
	}
	let _ = write!(
		prompt,
		"\n\nLayout: {rows} rows x {columns} columns grid. Equal spacing. No overlapping. NO EXTRA IMAGES.\n\
		 Style: {SERIES_STYLE}, 16-bit pixel art, anime, white background, high contrast, sharp edges.\n"
	);
	if style == Style::Pro {
		prompt.push_str(NO_OVERLAYS);
		prompt.push('\n');
	}
	prompt
}

const PROLOGUE_FLASH: &str = "\
Fire Emblem GBA style background scene, interior of a royal palace hall at night during a siege.
Grand stone pillars on sides, large arched window showing dark night sky with faint stars and distant orange flames/smoke.
Scattered debris, broken furniture on marble floor.
Dim lighting, cool blue moonlight from window, warm orange flickering light from distant fires.
Sense of urgency, chaos, impending doom, glimmer of hope in stars.
Style: 16-bit pixel art, low resolution, distinct chunky pixels, NO anti-aliasing, NO blur, NO smooth gradients.
Limited color palette (32-64 colors), sharp edges, dithering for shadows.
Center area slightly darker or less detailed for text overlay readability.
Aspect ratio 16:9.
NO WATERMARK, NO TEXT, NO UI.
";

const PROLOGUE_PRO: &str = "\
Fire Emblem GBA style background scene, interior of a royal palace hall at night during a siege.
Grand stone pillars on left and right, framing the center.
Large arched window in background showing dark night sky, faint stars, distant orange flames/smoke.
Scattered debris, broken furniture on marble floor.
Lighting: Cool blue moonlight from window, warm orange flickering light from distant fires.
Mood: Urgency, chaos, impending doom, glimmer of hope.
Center area: Slightly darker, less detailed, empty space for text overlay.
Style Constraints (CRITICAL):
- 16-bit pixel art, low resolution aesthetic (simulate 240x160 scaled up).
- Pixel-perfect edges, NO anti-aliasing, NO blur, NO smooth gradients.
- Distinct, chunky pixels. Dithering for shadows.
- Limited color palette (GBA style, 32-64 colors).
- Sharp, crisp lines.
- NO WATERMARK, NO TEXT, NO UI.
- Aspect Ratio: 16:9.
";

pub fn prologuePrompt(style: Style) -> &'static str {
	match style {
		Style::Flash => PROLOGUE_FLASH,
		Style::Pro => PROLOGUE_PRO,
	}
}

/// First `maxChars` characters of a prompt, for log lines.
pub fn preview(prompt: &str, maxChars: usize) -> String {
	let prompt = prompt.trim();
	match prompt.char_indices().nth(maxChars) {
		Some((end, _)) => format!("{}...", &prompt[..end]),
		None => prompt.to_owned(),
	}
}
