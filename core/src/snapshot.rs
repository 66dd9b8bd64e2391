use alloc::string::{String, ToString};
use alloc::vec::Vec;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// What the presentation may show about one cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellView {
    pub block: bool,
    pub number: Option<u16>,
    pub letter: Option<char>,
    pub correct: bool,
    pub revealed: bool,
    pub penalized: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryView {
    pub id: EntryId,
    pub label: String,
    pub direction: Direction,
    pub cells: Vec<Coord2>,
    /// `None` while the entry is fogged.
    pub clue: Option<String>,
    pub solved: bool,
}

/// Read-only copy of everything a front-end renders, taken after a mutation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub puzzle_id: String,
    pub title: String,
    pub cells: Array2<CellView>,
    pub entries: Vec<EntryView>,
    pub focus: u16,
    pub checks: u8,
    pub reveals: u8,
    pub charm_available: bool,
    pub fog_active: bool,
    pub wrongs: u16,
    pub seconds_left: u32,
    pub room_index: usize,
    pub room_count: usize,
    pub state: RoomState,
    pub run_complete: bool,
    pub selection: Selection,
    pub total_score: u32,
}

impl Snapshot {
    pub fn capture(room: &Room, room_count: usize, total_score: u32, run_complete: bool) -> Self {
        let board = room.board();
        let economy = room.economy();

        let cells = Array2::from_shape_fn(board.size().to_nd_index(), |(row, col)| {
            let coords = (row as Coord, col as Coord);
            let cell = board.cell_at(coords);
            CellView {
                block: cell.is_block(),
                number: cell.number(),
                letter: cell.entered(),
                correct: cell.is_correct(),
                revealed: cell.is_revealed(),
                penalized: economy.is_penalized(coords),
            }
        });

        let entries = board
            .entries()
            .iter()
            .map(|entry| EntryView {
                id: entry.id(),
                label: entry.label(),
                direction: entry.direction(),
                cells: entry.cells().to_vec(),
                clue: (!entry.is_hidden()).then(|| entry.clue().to_string()),
                solved: entry.is_solved(),
            })
            .collect();

        Self {
            puzzle_id: room.puzzle().id.clone(),
            title: room.puzzle().display_name().to_string(),
            cells,
            entries,
            focus: economy.focus(),
            checks: economy.checks(),
            reveals: economy.reveals(),
            charm_available: economy.charm_available(),
            fog_active: economy.fog_active(),
            wrongs: economy.wrongs(),
            seconds_left: room.countdown().seconds_left(),
            room_index: room.index(),
            room_count,
            state: room.state(),
            run_complete,
            selection: *room.selection(),
            total_score,
        }
    }

    /// Board size as `(rows, cols)`.
    pub fn size(&self) -> Coord2 {
        let dim = self.cells.dim();
        (dim.0 as Coord, dim.1 as Coord)
    }

    pub fn cell(&self, coords: Coord2) -> Option<&CellView> {
        self.cells.get(coords.to_nd_index())
    }

    pub fn entry(&self, id: EntryId) -> Option<&EntryView> {
        self.entries.get(id.index())
    }

    pub fn selected_entry(&self) -> Option<&EntryView> {
        self.selection.entry().and_then(|id| self.entry(id))
    }

    /// Finds an entry by its short label such as `7a`.
    pub fn entry_by_label(&self, label: &str) -> Option<&EntryView> {
        self.entries
            .iter()
            .find(|entry| entry.label.eq_ignore_ascii_case(label))
    }
}
