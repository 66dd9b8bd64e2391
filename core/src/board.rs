use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec;
use alloc::vec::Vec;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::*;

/// Clue text used when a puzzle has no clue for an entry.
pub const PLACEHOLDER_CLUE: &str = "(clue missing)";

/// Which entry directions a board is built with.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryLayout {
    #[default]
    Across,
    AcrossAndDown,
}

impl EntryLayout {
    pub const fn directions(self) -> &'static [Direction] {
        match self {
            Self::Across => &[Direction::Across],
            Self::AcrossAndDown => &Direction::ALL,
        }
    }

    pub const fn supports(self, direction: Direction) -> bool {
        matches!(
            (self, direction),
            (_, Direction::Across) | (Self::AcrossAndDown, Direction::Down)
        )
    }
}

/// Problems found in puzzle data. None of them stop a board from being built.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MalformedPuzzleData {
    SizeMismatch {
        declared: Coord,
        size: Coord2,
    },
    RaggedRow {
        row: Coord,
        length: usize,
        width: Coord,
    },
    Truncated {
        rows: usize,
        cols: usize,
    },
    MissingClue {
        direction: Direction,
        number: u16,
    },
    UnusedClue {
        direction: Direction,
        index: usize,
    },
    LengthMismatch {
        direction: Direction,
        number: u16,
        declared: Coord,
        found: usize,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub(crate) id: EntryId,
    pub(crate) number: u16,
    pub(crate) direction: Direction,
    pub(crate) cells: Vec<Coord2>,
    pub(crate) clue: String,
    pub(crate) hidden: bool,
    pub(crate) solved: bool,
}

impl Entry {
    pub fn id(&self) -> EntryId {
        self.id
    }

    pub fn number(&self) -> u16 {
        self.number
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Positions of the cells owned by this entry, in reading order.
    pub fn cells(&self) -> &[Coord2] {
        &self.cells
    }

    pub fn start(&self) -> Coord2 {
        self.cells[0]
    }

    pub fn length(&self) -> usize {
        self.cells.len()
    }

    pub fn contains(&self, coords: Coord2) -> bool {
        self.cells.contains(&coords)
    }

    pub fn clue(&self) -> &str {
        &self.clue
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn is_solved(&self) -> bool {
        self.solved
    }

    /// Short label such as `7a` or `2d`.
    pub fn label(&self) -> String {
        format!("{}{}", self.number, self.direction.suffix())
    }
}

/// Cell matrix of one room plus the entries derived from it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Board {
    puzzle_id: String,
    cells: Array2<Cell>,
    entries: Vec<Entry>,
    issues: Vec<MalformedPuzzleData>,
}

impl Board {
    pub fn build(puzzle: &PuzzleDef, layout: EntryLayout) -> Self {
        let mut issues = Vec::new();
        let rows: Vec<Vec<char>> = puzzle.rows.iter().map(|row| row.chars().collect()).collect();

        let full_width = rows.iter().map(Vec::len).max().unwrap_or(0);
        let height = clamp_len(rows.len());
        let width = clamp_len(full_width);
        if usize::from(height) < rows.len() || usize::from(width) < full_width {
            issues.push(MalformedPuzzleData::Truncated {
                rows: rows.len(),
                cols: full_width,
            });
        }

        for (row, letters) in rows.iter().take(height.into()).enumerate() {
            if letters.len() != usize::from(width) {
                issues.push(MalformedPuzzleData::RaggedRow {
                    row: row as Coord,
                    length: letters.len(),
                    width,
                });
            }
        }

        if let Some(declared) = puzzle.size {
            if declared != height || declared != width {
                issues.push(MalformedPuzzleData::SizeMismatch {
                    declared,
                    size: (height, width),
                });
            }
        }

        let shape = (usize::from(height), usize::from(width));
        let cells = Array2::from_shape_fn(shape, |(row, col)| match rows[row].get(col).copied() {
            None | Some('#') => Cell::block(),
            Some(letter) => Cell::letter(letter),
        });

        let mut board = Self {
            puzzle_id: puzzle.id.clone(),
            cells,
            entries: Vec::new(),
            issues,
        };
        board.scan_entries(layout);

        for &direction in layout.directions() {
            board.assign_clues(puzzle.clues(direction), direction);
        }
        if !layout.supports(Direction::Down) && !puzzle.down.is_empty() {
            log::debug!(
                "Puzzle {} has {} down clues but the layout is across only",
                puzzle.id,
                puzzle.down.len()
            );
        }

        for issue in &board.issues {
            log::warn!("Puzzle {}: {:?}", board.puzzle_id, issue);
        }
        log::debug!(
            "Built board {} ({}x{}) with {} entries",
            board.puzzle_id,
            height,
            width,
            board.entries.len()
        );

        board
    }

    fn scan_entries(&mut self, layout: EntryLayout) {
        let (height, width) = self.size();
        let mut number = 0;

        for row in 0..height {
            for col in 0..width {
                let coords = (row, col);
                let cell = self.cells[coords.to_nd_index()];
                if cell.is_block() {
                    continue;
                }

                let starts: SmallVec<[Direction; 2]> = layout
                    .directions()
                    .iter()
                    .copied()
                    .filter(|&direction| self.starts_entry(coords, direction))
                    .collect();

                // cells reached by no entry still need one, or they could never count towards solving
                let orphan = starts.is_empty() && cell.entries().next().is_none();
                if starts.is_empty() && !orphan {
                    continue;
                }

                number += 1;
                self.cells[coords.to_nd_index()].number = Some(number);

                if orphan {
                    self.push_entry(coords, Direction::Across, number);
                }
                for direction in starts {
                    self.push_entry(coords, direction, number);
                }
            }
        }
    }

    fn starts_entry(&self, coords: Coord2, direction: Direction) -> bool {
        let open = |pos: Option<Coord2>| pos.is_some_and(|pos| !self.cell_at(pos).is_block());
        let size = self.size();

        !self.cell_at(coords).is_block()
            && !open(apply_delta(coords, direction.backwards(), size))
            && open(apply_delta(coords, direction.delta(), size))
    }

    fn push_entry(&mut self, start: Coord2, direction: Direction, number: u16) {
        let id = EntryId(self.entries.len() as u16);
        let size = self.size();

        let mut cells = Vec::new();
        let mut next = Some(start);
        while let Some(coords) = next {
            if self.cell_at(coords).is_block() {
                break;
            }
            self.cells[coords.to_nd_index()].link(direction, id);
            cells.push(coords);
            next = apply_delta(coords, direction.delta(), size);
        }

        self.entries.push(Entry {
            id,
            number,
            direction,
            cells,
            clue: PLACEHOLDER_CLUE.to_string(),
            hidden: false,
            solved: false,
        });
    }

    fn assign_clues(&mut self, clues: &[ClueDef], direction: Direction) {
        let placed = clues.iter().any(|clue| clue.start().is_some());
        let mut used = vec![false; clues.len()];

        let ids: Vec<EntryId> = self
            .entries
            .iter()
            .filter(|entry| entry.direction == direction)
            .map(|entry| entry.id)
            .collect();

        for (order, id) in ids.into_iter().enumerate() {
            let (start, length, number) = {
                let entry = &self.entries[id.index()];
                (entry.start(), entry.length(), entry.number)
            };

            let found = if placed {
                clues.iter().position(|clue| clue.start() == Some(start))
            } else {
                (order < clues.len()).then_some(order)
            };

            let Some(index) = found else {
                self.issues
                    .push(MalformedPuzzleData::MissingClue { direction, number });
                continue;
            };

            used[index] = true;
            let clue = &clues[index];
            if let Some(declared) = clue.length() {
                if usize::from(declared) != length {
                    self.issues.push(MalformedPuzzleData::LengthMismatch {
                        direction,
                        number,
                        declared,
                        found: length,
                    });
                }
            }
            self.entries[id.index()].clue = clue.text().to_string();
        }

        for (index, _) in used.iter().enumerate().filter(|(_, used)| !**used) {
            self.issues
                .push(MalformedPuzzleData::UnusedClue { direction, index });
        }
    }

    pub fn puzzle_id(&self) -> &str {
        &self.puzzle_id
    }

    /// Board size as `(rows, cols)`.
    pub fn size(&self) -> Coord2 {
        let dim = self.cells.dim();
        (dim.0 as Coord, dim.1 as Coord)
    }

    pub fn cell_at(&self, coords: Coord2) -> &Cell {
        &self.cells[coords.to_nd_index()]
    }

    pub fn get(&self, coords: Coord2) -> Option<&Cell> {
        self.cells.get(coords.to_nd_index())
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        let size = self.size();
        if coords.0 < size.0 && coords.1 < size.1 {
            Ok(coords)
        } else {
            Err(GameError::InvalidTarget)
        }
    }

    /// Like [`Board::validate_coords`], but also rejects blocks.
    pub fn validate_fillable(&self, coords: Coord2) -> Result<Coord2> {
        let coords = self.validate_coords(coords)?;
        if self.cell_at(coords).is_block() {
            Err(GameError::InvalidTarget)
        } else {
            Ok(coords)
        }
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn entry(&self, id: EntryId) -> Result<&Entry> {
        self.entries.get(id.index()).ok_or(GameError::UnknownEntry)
    }

    pub fn entry_by_number(&self, number: u16, direction: Direction) -> Option<&Entry> {
        self.entries
            .iter()
            .find(|entry| entry.number == number && entry.direction == direction)
    }

    pub fn entries_at(&self, coords: Coord2) -> impl Iterator<Item = EntryId> + use<> {
        self.get(coords)
            .map(|cell| cell.entries())
            .into_iter()
            .flatten()
    }

    /// Solution letters of an entry, in reading order.
    pub fn solution(&self, id: EntryId) -> Result<String> {
        let entry = self.entry(id)?;
        Ok(entry
            .cells
            .iter()
            .filter_map(|&coords| self.cell_at(coords).solution())
            .collect())
    }

    pub fn issues(&self) -> &[MalformedPuzzleData] {
        &self.issues
    }

    pub fn positions(&self) -> impl Iterator<Item = Coord2> + use<> {
        let (height, width) = self.size();
        (0..height).flat_map(move |row| (0..width).map(move |col| (row, col)))
    }

    pub fn fillable_count(&self) -> CellCount {
        self.cells.iter().filter(|cell| !cell.is_block()).count() as CellCount
    }

    pub fn correct_count(&self) -> CellCount {
        self.cells.iter().filter(|cell| cell.is_correct()).count() as CellCount
    }

    pub fn is_all_solved(&self) -> bool {
        self.entries.iter().all(|entry| entry.solved)
    }

    pub(crate) fn cover_clues(&mut self) {
        for entry in &mut self.entries {
            entry.hidden = true;
        }
    }

    /// Lifts the fog from an entry, returns whether it was hidden.
    pub(crate) fn uncover(&mut self, id: EntryId) -> bool {
        match self.entries.get_mut(id.index()) {
            Some(entry) if entry.hidden => {
                entry.hidden = false;
                true
            }
            _ => false,
        }
    }

    pub(crate) fn cell_mut(&mut self, coords: Coord2) -> &mut Cell {
        &mut self.cells[coords.to_nd_index()]
    }

    pub(crate) fn entry_mut(&mut self, id: EntryId) -> &mut Entry {
        &mut self.entries[id.index()]
    }
}

fn clamp_len(len: usize) -> Coord {
    len.min(usize::from(Coord::MAX)) as Coord
}
