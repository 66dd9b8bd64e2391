use serde::{Deserialize, Serialize};

use crate::*;

/// Every inbound event a front-end can send to a run.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    StartRoom,
    PlaceLetter { coords: Coord2, letter: char },
    /// Places a letter at the selected cell.
    TypeLetter { letter: char },
    ClearCell { coords: Coord2 },
    Check { coords: Coord2 },
    Reveal { coords: Coord2 },
    Peek { entry: EntryId },
    MoveSelection { heading: Heading },
    SelectCell { coords: Coord2 },
    SelectEntry { entry: EntryId },
    CycleEntry { forward: bool },
    NextEmpty,
    AdvanceRoom,
    EndRunEarly,
    Tick,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActionOutcome {
    Done,
    Letter(LetterOutcome),
    Checked(Correctness),
    Revealed(RevealOutcome),
    Peeked(PeekOutcome),
    /// Whether the selection moved.
    Moved(bool),
    Ended(RunSummary),
    /// Seconds left, `None` when no countdown was running.
    Ticked(Option<u32>),
}

impl<S: ScoreStore> Run<S> {
    pub fn dispatch(&mut self, action: Action) -> Result<ActionOutcome> {
        use Action::*;

        log::debug!("Dispatching {:?}", action);
        let outcome = match action {
            StartRoom => self.start_room().map(|()| ActionOutcome::Done)?,
            PlaceLetter { coords, letter } => ActionOutcome::Letter(self.place_letter(coords, letter)?),
            TypeLetter { letter } => ActionOutcome::Letter(self.type_letter(letter)?),
            ClearCell { coords } => ActionOutcome::Letter(self.clear_letter(coords)?),
            Check { coords } => ActionOutcome::Checked(self.check(coords)?),
            Reveal { coords } => ActionOutcome::Revealed(self.reveal(coords)?),
            Peek { entry } => ActionOutcome::Peeked(self.peek(entry)?),
            MoveSelection { heading } => ActionOutcome::Moved(self.move_selection(heading)?),
            SelectCell { coords } => self.select_cell(coords).map(|()| ActionOutcome::Done)?,
            SelectEntry { entry } => self.select_entry(entry).map(|()| ActionOutcome::Done)?,
            CycleEntry { forward } => self.cycle_entry(forward).map(|()| ActionOutcome::Done)?,
            NextEmpty => ActionOutcome::Moved(self.next_empty()?),
            AdvanceRoom => self.advance_room().map(|()| ActionOutcome::Done)?,
            EndRunEarly => ActionOutcome::Ended(self.end_run_early()?.clone()),
            Tick => ActionOutcome::Ticked(self.tick()),
        };
        Ok(outcome)
    }
}
