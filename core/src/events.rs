use alloc::collections::VecDeque;
use alloc::string::String;
use serde::{Deserialize, Serialize};

use crate::*;

/// State changes a presentation layer can react to, in the order they happened.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    RoomStarted {
        room_index: usize,
        puzzle_id: String,
    },
    LetterPlaced {
        coords: Coord2,
        letter: Option<char>,
        correct: bool,
    },
    FocusLost {
        amount: u16,
        focus: u16,
    },
    CharmConsumed {
        coords: Coord2,
    },
    FogLifted {
        entry: EntryId,
    },
    EntrySolved {
        entry: EntryId,
    },
    Checked {
        coords: Coord2,
        result: Correctness,
    },
    CellRevealed {
        coords: Coord2,
        letter: char,
    },
    Peeked {
        entry: EntryId,
        focus: u16,
    },
    Tick {
        seconds_left: u32,
    },
    RoomSolved,
    RoomFailed {
        reason: FailureReason,
    },
    RoomScored {
        score: RoomScore,
    },
    RunComplete {
        total_score: u32,
        is_new_best: bool,
    },
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EventQueue {
    events: VecDeque<GameEvent>,
}

impl EventQueue {
    pub fn push(&mut self, event: GameEvent) {
        log::trace!("{:?}", event);
        self.events.push_back(event);
    }

    pub fn extend(&mut self, events: impl IntoIterator<Item = GameEvent>) {
        for event in events {
            self.push(event);
        }
    }

    pub fn drain(&mut self) -> impl Iterator<Item = GameEvent> + '_ {
        self.events.drain(..)
    }
}
