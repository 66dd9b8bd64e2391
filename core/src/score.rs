use serde::{Deserialize, Serialize};

use crate::*;

/// Score breakdown of one finished room.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomScore {
    pub correct_letters: CellCount,
    pub total_letters: CellCount,
    pub wrongs: u16,
    /// Seconds left on the clock, only for solved rooms.
    pub time_bonus: u32,
    pub points: u32,
}

impl RoomScore {
    /// `max(0, correct - wrongs + time_bonus / divisor)`, from the board as it is right now.
    pub fn compute(
        board: &Board,
        economy: &Economy,
        seconds_left: u32,
        outcome: RoomOutcome,
        rules: ScoreRules,
    ) -> Self {
        let correct_letters = board.correct_count();
        let wrongs = economy.wrongs();
        let time_bonus = if outcome.is_solved() { seconds_left } else { 0 };

        let earned = u32::from(correct_letters) + time_bonus / rules.time_bonus_divisor.max(1);
        let points = earned.saturating_sub(wrongs.into());

        Self {
            correct_letters,
            total_letters: board.fillable_count(),
            wrongs,
            time_bonus,
            points,
        }
    }
}
