use {
	crate::grid::Grid,
	serde::{Deserialize, Serialize},
	std::{collections::HashSet, fs, io, path::Path},
};

pub const BUILTIN_TOML: &str = include_str!("../rosters/default.toml");

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Roster {
	pub grid: Grid,

	#[serde(rename = "character")]
	pub characters: Vec<Character>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Character {
	/// File stem of the cropped portrait.
	pub id: String,
	#[serde(default)]
	pub name: String,
	#[serde(default)]
	pub description: String,
}

#[derive(Debug, thiserror::Error)]
pub enum RosterError {
	#[error("cannot read roster {path}")]
	Read { path: String, source: io::Error },

	#[error("malformed roster")]
	Parse(#[from] toml::de::Error),

	#[error("grid must have at least one row and one column, got {rows}x{columns}")]
	EmptyGrid { rows: u32, columns: u32 },

	#[error("roster has no characters")]
	NoCharacters,

	#[error("{count} characters do not fit a {rows}x{columns} grid ({cells} cells)")]
	TooManyCharacters { count: usize, rows: u32, columns: u32, cells: usize },

	#[error("character #{index} has an unusable id {id:?}")]
	InvalidId { index: usize, id: String },

	#[error("character id {0:?} appears more than once")]
	DuplicateId(String),
}

impl Roster {
	pub fn builtin() -> Result<Roster, RosterError> {
		Roster::fromTOML(BUILTIN_TOML)
	}

	pub fn fromTOML(toml: &str) -> Result<Roster, RosterError> {
		let roster: Roster = toml::from_str(toml)?;
		roster.validate()?;
		Ok(roster)
	}

	/// Reads `path`, or the built-in roster when there is none.
	pub fn load(path: Option<&Path>) -> Result<Roster, RosterError> {
		match path {
			None => Roster::builtin(),
			Some(path) => Roster::fromTOML(
				&fs::read_to_string(path)
					.map_err(|source| RosterError::Read { path: path.display().to_string(), source })?,
			),
		}
	}

	pub fn validate(&self) -> Result<(), RosterError> {
		let Grid { rows, columns } = self.grid;
		if rows == 0 || columns == 0 {
			return Err(RosterError::EmptyGrid { rows, columns });
		}
		if self.characters.is_empty() {
			return Err(RosterError::NoCharacters);
		}
		let cells = self.grid.cellCount();
		if self.characters.len() > cells {
			return Err(RosterError::TooManyCharacters { count: self.characters.len(), rows, columns, cells });
		}
		let mut seen = HashSet::with_capacity(self.characters.len());
		for (index, Character { id, .. }) in self.characters.iter().enumerate() {
			if !isUsableFileStem(id) {
				return Err(RosterError::InvalidId { index, id: id.clone() });
			}
			if !seen.insert(id.as_str()) {
				return Err(RosterError::DuplicateId(id.clone()));
			}
		}
		Ok(())
	}

	/// Row-major `(row, column, character)` for every character; trailing cells stay unassigned.
	pub fn cellAssignments(&self) -> impl Iterator<Item = (u32, u32, &Character)> + '_ {
		let columns = self.grid.columns as usize;
		self.characters.iter().enumerate().map(move |(i, character)| ((i / columns) as u32, (i % columns) as u32, character))
	}
}

impl Character {
	pub fn displayName(&self) -> &str {
		if self.name.is_empty() {
			&self.id
		} else {
			&self.name
		}
	}
}

fn isUsableFileStem(id: &str) -> bool {
	!id.is_empty()
		&& !id.starts_with('.')
		&& !id.chars().any(|c| matches!(c, '/' | '\\' | ':' | '\0') || c.is_control())
}
