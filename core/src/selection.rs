use serde::{Deserialize, Serialize};

use crate::*;

/// Selected cell and the entry it is being read through.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    cell: Option<Coord2>,
    entry: Option<EntryId>,
}

impl Selection {
    /// Starts on the first entry of the board, if there is one.
    pub fn new(board: &Board) -> Self {
        let mut selection = Self::default();
        if let Some(first) = board.entries().first() {
            let _ = selection.select_entry(board, first.id());
        }
        selection
    }

    pub fn cell(&self) -> Option<Coord2> {
        self.cell
    }

    pub fn entry(&self) -> Option<EntryId> {
        self.entry
    }

    fn direction(&self, board: &Board) -> Direction {
        self.entry
            .and_then(|id| board.entry(id).ok())
            .map_or(Direction::Across, Entry::direction)
    }

    pub fn select_cell(&mut self, board: &Board, coords: Coord2) -> Result<()> {
        let coords = board.validate_fillable(coords)?;
        let cell = board.cell_at(coords);

        self.entry = cell
            .entry(self.direction(board))
            .or_else(|| cell.entries().next());
        self.cell = Some(coords);
        Ok(())
    }

    /// Selects the first empty cell of the entry, or its first cell when it is full.
    pub fn select_entry(&mut self, board: &Board, id: EntryId) -> Result<()> {
        let entry = board.entry(id)?;
        let target = entry
            .cells()
            .iter()
            .copied()
            .find(|&coords| board.cell_at(coords).is_empty())
            .unwrap_or(entry.start());

        self.entry = Some(id);
        self.cell = Some(target);
        Ok(())
    }

    /// Steps over blocks in `heading`, returns whether the selection moved.
    pub fn move_by(&mut self, board: &Board, heading: Heading) -> bool {
        let Some(mut coords) = self.cell else {
            return false;
        };

        while let Some(next) = apply_delta(coords, heading.delta(), board.size()) {
            if !board.cell_at(next).is_block() {
                return self.select_cell(board, next).is_ok();
            }
            coords = next;
        }
        false
    }

    pub fn cycle_entry(&mut self, board: &Board, forward: bool) -> Result<()> {
        let count = board.entries().len();
        if count == 0 {
            return Err(GameError::UnknownEntry);
        }

        let next = match self.entry {
            Some(current) if forward => (current.index() + 1) % count,
            Some(current) => (current.index() + count - 1) % count,
            None => 0,
        };
        self.select_entry(board, EntryId(next as u16))
    }

    /// Jumps to the next empty cell of the current entry, wrapping around.
    /// Returns whether one was found.
    pub fn next_empty(&mut self, board: &Board) -> bool {
        let Some(entry) = self.entry.and_then(|id| board.entry(id).ok()) else {
            return false;
        };

        let cells = entry.cells();
        let after = self
            .cell
            .and_then(|current| cells.iter().position(|&pos| pos == current))
            .map_or(0, |index| index + 1);

        match cells[after..]
            .iter()
            .chain(&cells[..after])
            .copied()
            .find(|&coords| board.cell_at(coords).is_empty())
        {
            Some(coords) => {
                self.cell = Some(coords);
                true
            }
            None => false,
        }
    }

    /// Moves on to the cell after `coords` in the current entry, wrapping to its start.
    pub(crate) fn advance_from(&mut self, board: &Board, coords: Coord2) {
        if self.select_cell(board, coords).is_err() {
            return;
        }
        let Some(entry) = self.entry.and_then(|id| board.entry(id).ok()) else {
            return;
        };

        let cells = entry.cells();
        let next = cells
            .iter()
            .position(|&pos| pos == coords)
            .and_then(|index| cells.get(index + 1))
            .copied()
            .unwrap_or(entry.start());
        self.cell = Some(next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::tests::{alert_puzzle, puzzle};

    #[test]
    fn starts_on_first_entry() {
        let board = Board::build(&alert_puzzle(), EntryLayout::Across);
        let selection = Selection::new(&board);

        assert_eq!(selection.cell(), Some((0, 0)));
        assert_eq!(selection.entry(), Some(EntryId(0)));
    }

    #[test]
    fn moving_skips_blocks_and_stops_at_edges() {
        let board = Board::build(&alert_puzzle(), EntryLayout::Across);
        let mut selection = Selection::new(&board);
        selection.select_cell(&board, (1, 1)).unwrap();

        assert!(selection.move_by(&board, Heading::Right));
        assert_eq!(selection.cell(), Some((1, 3)));
        assert_eq!(selection.entry(), Some(EntryId(2)));

        selection.select_cell(&board, (0, 2)).unwrap();
        assert!(selection.move_by(&board, Heading::Down));
        assert_eq!(selection.cell(), Some((2, 2)));

        selection.select_cell(&board, (0, 4)).unwrap();
        assert!(!selection.move_by(&board, Heading::Up));
        assert_eq!(selection.cell(), Some((0, 4)));
    }

    #[test]
    fn selecting_block_is_rejected() {
        let board = Board::build(&alert_puzzle(), EntryLayout::Across);
        let mut selection = Selection::new(&board);

        assert_eq!(selection.select_cell(&board, (1, 2)), Err(GameError::InvalidTarget));
        assert_eq!(selection.cell(), Some((0, 0)));
    }

    #[test]
    fn select_entry_prefers_first_empty_cell() {
        let mut board = Board::build(&alert_puzzle(), EntryLayout::Across);
        board.set_letter((2, 0), Some('T')).unwrap();
        board.set_letter((2, 1), Some('E')).unwrap();
        let mut selection = Selection::new(&board);

        selection.select_entry(&board, EntryId(3)).unwrap();
        assert_eq!(selection.cell(), Some((2, 2)));

        assert_eq!(selection.select_entry(&board, EntryId(99)), Err(GameError::UnknownEntry));
    }

    #[test]
    fn cycling_wraps_both_ways() {
        let board = Board::build(&alert_puzzle(), EntryLayout::Across);
        let mut selection = Selection::new(&board);

        selection.cycle_entry(&board, false).unwrap();
        assert_eq!(selection.entry(), Some(EntryId(6)));
        assert_eq!(selection.cell(), Some((4, 0)));

        selection.cycle_entry(&board, true).unwrap();
        assert_eq!(selection.entry(), Some(EntryId(0)));
    }

    #[test]
    fn advance_wraps_within_entry() {
        let board = Board::build(&alert_puzzle(), EntryLayout::Across);
        let mut selection = Selection::new(&board);

        selection.advance_from(&board, (0, 3));
        assert_eq!(selection.cell(), Some((0, 4)));

        selection.advance_from(&board, (0, 4));
        assert_eq!(selection.cell(), Some((0, 0)));
    }

    #[test]
    fn keeps_reading_direction_across_cells() {
        let board = Board::build(&puzzle(&["AB", "CD"]), EntryLayout::AcrossAndDown);
        let mut selection = Selection::default();

        selection.select_entry(&board, EntryId(1)).unwrap();
        assert_eq!(board.entry(EntryId(1)).unwrap().direction(), Direction::Down);

        selection.select_cell(&board, (1, 1)).unwrap();
        let entry = board.entry(selection.entry().unwrap()).unwrap();
        assert_eq!(entry.direction(), Direction::Down);
        assert_eq!(entry.start(), (0, 1));

        selection.advance_from(&board, (0, 1));
        assert_eq!(selection.cell(), Some((1, 1)));
    }

    #[test]
    fn next_empty_finds_gap() {
        let mut board = Board::build(&alert_puzzle(), EntryLayout::Across);
        board.set_letter((0, 0), Some('A')).unwrap();
        board.set_letter((0, 1), Some('L')).unwrap();
        let mut selection = Selection::new(&board);
        selection.select_cell(&board, (0, 4)).unwrap();

        assert!(selection.next_empty(&board));
        assert_eq!(selection.cell(), Some((0, 2)));
    }
}
