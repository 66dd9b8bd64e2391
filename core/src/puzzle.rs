use alloc::string::String;
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::*;

const BUILTIN_PACK: &str = include_str!("../puzzles/builtin.json");

/// Clue record as it appears in a puzzle pack.
///
/// Packs either place each clue on its start cell or list bare clue strings in entry order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClueDef {
    Text(String),
    Placed(PlacedClue),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlacedClue {
    #[serde(default, alias = "no")]
    pub number: Option<u16>,
    pub row: Coord,
    pub col: Coord,
    #[serde(default, alias = "len")]
    pub length: Option<Coord>,
    #[serde(default)]
    pub answer: Option<String>,
    pub clue: String,
}

impl ClueDef {
    pub fn text(&self) -> &str {
        match self {
            Self::Text(text) => text,
            Self::Placed(placed) => &placed.clue,
        }
    }

    pub fn start(&self) -> Option<Coord2> {
        match self {
            Self::Text(_) => None,
            Self::Placed(placed) => Some((placed.row, placed.col)),
        }
    }

    pub fn length(&self) -> Option<Coord> {
        match self {
            Self::Text(_) => None,
            Self::Placed(placed) => placed.length,
        }
    }
}

/// One immutable puzzle: grid rows with `#` blocks and the clue lists.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PuzzleDef {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub size: Option<Coord>,
    #[serde(alias = "grid")]
    pub rows: Vec<String>,
    #[serde(default, alias = "acrossClues")]
    pub across: Vec<ClueDef>,
    #[serde(default, alias = "downClues")]
    pub down: Vec<ClueDef>,
}

impl PuzzleDef {
    pub fn clues(&self, direction: Direction) -> &[ClueDef] {
        match direction {
            Direction::Across => &self.across,
            Direction::Down => &self.down,
        }
    }

    pub fn display_name(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.id)
    }
}

/// Ordered pool of puzzles a run draws its rooms from.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PuzzleSource {
    puzzles: Vec<PuzzleDef>,
}

impl PuzzleSource {
    pub fn new(puzzles: Vec<PuzzleDef>) -> Self {
        Self { puzzles }
    }

    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        let source: Self = serde_json::from_str(text)?;
        log::debug!("Decoded puzzle pack with {} puzzles", source.len());
        Ok(source)
    }

    /// Puzzle pack bundled with the crate.
    pub fn builtin() -> Self {
        Self::from_json(BUILTIN_PACK).expect("bundled puzzle pack should decode")
    }

    pub fn puzzles(&self) -> &[PuzzleDef] {
        &self.puzzles
    }

    pub fn get(&self, id: &str) -> Option<&PuzzleDef> {
        self.puzzles.iter().find(|puzzle| puzzle.id == id)
    }

    pub fn len(&self) -> usize {
        self.puzzles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.puzzles.is_empty()
    }
}
