use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Limited resource an action can run out of.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Checks,
    Reveals,
    Fog,
    Focus,
}

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Target is out of bounds or a block")]
    InvalidTarget,
    #[error("Cell was revealed and can no longer be changed")]
    CellLocked,
    #[error("Only letters A to Z can be entered")]
    InvalidLetter,
    #[error("No such entry")]
    UnknownEntry,
    #[error("No {0:?} available")]
    ResourceExhausted(Resource),
    #[error("Room has not started yet")]
    NotStarted,
    #[error("Room already ended, no new moves are accepted")]
    AlreadyEnded,
    #[error("Room is still in progress")]
    RoomInProgress,
    #[error("Run is over")]
    RunOver,
    #[error("Puzzle pool is empty")]
    NoPuzzles,
}

pub type Result<T> = core::result::Result<T, GameError>;
