use serde::{Deserialize, Serialize};

use crate::*;

/// Index of an entry within its board.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntryId(pub u16);

impl EntryId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// One grid position: the solution, what the player entered, and links to the entries it belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub(crate) solution: Option<char>,
    pub(crate) entered: Option<char>,
    pub(crate) revealed: bool,
    pub(crate) number: Option<u16>,
    pub(crate) across: Option<EntryId>,
    pub(crate) down: Option<EntryId>,
}

impl Cell {
    pub const fn block() -> Self {
        Self {
            solution: None,
            entered: None,
            revealed: false,
            number: None,
            across: None,
            down: None,
        }
    }

    pub const fn letter(solution: char) -> Self {
        Self {
            solution: Some(solution.to_ascii_uppercase()),
            ..Self::block()
        }
    }

    pub const fn is_block(&self) -> bool {
        self.solution.is_none()
    }

    pub const fn solution(&self) -> Option<char> {
        self.solution
    }

    pub const fn entered(&self) -> Option<char> {
        self.entered
    }

    pub const fn is_revealed(&self) -> bool {
        self.revealed
    }

    pub const fn is_empty(&self) -> bool {
        self.entered.is_none()
    }

    pub const fn number(&self) -> Option<u16> {
        self.number
    }

    pub fn is_correct(&self) -> bool {
        match (self.entered, self.solution) {
            (Some(entered), Some(solution)) => entered.eq_ignore_ascii_case(&solution),
            _ => false,
        }
    }

    pub fn correctness(&self) -> Correctness {
        if self.entered.is_none() {
            Correctness::Empty
        } else if self.is_correct() {
            Correctness::Correct
        } else {
            Correctness::Incorrect
        }
    }

    pub const fn entry(&self, direction: Direction) -> Option<EntryId> {
        match direction {
            Direction::Across => self.across,
            Direction::Down => self.down,
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = EntryId> + use<> {
        self.across.into_iter().chain(self.down)
    }

    pub(crate) fn link(&mut self, direction: Direction, id: EntryId) {
        match direction {
            Direction::Across => self.across = Some(id),
            Direction::Down => self.down = Some(id),
        }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::block()
    }
}

/// Result of a read-only correctness query.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Correctness {
    Empty,
    Correct,
    Incorrect,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correctness_ignores_case() {
        let mut cell = Cell::letter('a');
        assert_eq!(cell.solution(), Some('A'));
        assert_eq!(cell.correctness(), Correctness::Empty);

        cell.entered = Some('a');
        assert_eq!(cell.correctness(), Correctness::Correct);

        cell.entered = Some('B');
        assert_eq!(cell.correctness(), Correctness::Incorrect);
    }

    #[test]
    fn block_is_never_correct() {
        let cell = Cell::block();
        assert!(cell.is_block());
        assert!(!cell.is_correct());
        assert_eq!(cell.entries().count(), 0);
    }
}
