use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::*;

/// What a single write did to the board.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillOutcome {
    pub correct: bool,
    /// An entry through the written cell is solved after the write.
    pub entry_solved: bool,
    pub all_solved: bool,
    /// Entries that went from unsolved to solved with this write.
    pub newly_solved: SmallVec<[EntryId; 2]>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealedLetter {
    pub letter: char,
    pub fill: FillOutcome,
}

impl Board {
    /// Writes `letter` into a cell, `None` clears it.
    pub fn set_letter(&mut self, coords: Coord2, letter: Option<char>) -> Result<FillOutcome> {
        let coords = self.validate_fillable(coords)?;
        let letter = letter.map(normalize_letter).transpose()?;

        let cell = self.cell_mut(coords);
        if cell.revealed {
            return Err(GameError::CellLocked);
        }
        cell.entered = letter;
        let correct = cell.is_correct();

        Ok(self.settle_cell(coords, correct))
    }

    /// Fills a cell with its solution and locks it.
    pub fn reveal(&mut self, coords: Coord2) -> Result<RevealedLetter> {
        let coords = self.validate_fillable(coords)?;

        let cell = self.cell_mut(coords);
        if cell.revealed {
            return Err(GameError::CellLocked);
        }
        let Some(letter) = cell.solution else {
            return Err(GameError::InvalidTarget);
        };
        cell.entered = Some(letter);
        cell.revealed = true;

        let fill = self.settle_cell(coords, true);
        Ok(RevealedLetter { letter, fill })
    }

    pub fn check_correctness(&self, coords: Coord2) -> Result<Correctness> {
        let coords = self.validate_fillable(coords)?;
        Ok(self.cell_at(coords).correctness())
    }

    fn settle_cell(&mut self, coords: Coord2, correct: bool) -> FillOutcome {
        let mut newly_solved = SmallVec::new();
        let mut entry_solved = false;

        let ids: SmallVec<[EntryId; 2]> = self.cell_at(coords).entries().collect();
        for id in ids {
            let solved = self.entries()[id.index()]
                .cells
                .iter()
                .all(|&pos| self.cell_at(pos).is_correct());

            let entry = self.entry_mut(id);
            if solved && !entry.solved {
                newly_solved.push(id);
            }
            entry.solved = solved;
            entry_solved |= solved;
        }

        FillOutcome {
            correct,
            entry_solved,
            all_solved: self.is_all_solved(),
            newly_solved,
        }
    }
}

fn normalize_letter(letter: char) -> Result<char> {
    if letter.is_ascii_alphabetic() {
        Ok(letter.to_ascii_uppercase())
    } else {
        Err(GameError::InvalidLetter)
    }
}
