use serde::{Deserialize, Serialize};

use crate::*;

/// Per-room economy rules.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomRules {
    pub start_focus: u16,
    pub start_checks: u8,
    pub start_reveals: u8,
    /// First wrong letter of each room costs no Focus.
    pub charm: bool,
    /// Clues start hidden until a correct letter lands in the entry or it is peeked.
    pub fog: bool,
    pub peek_cost: u16,
    pub reveal_focus_cost: u16,
    pub layout: EntryLayout,
    /// Keep the Focus left at the end of a room instead of refilling it.
    pub focus_carries_over: bool,
}

impl Default for RoomRules {
    fn default() -> Self {
        Self {
            start_focus: 10,
            start_checks: 3,
            start_reveals: 1,
            charm: true,
            fog: true,
            peek_cost: 1,
            reveal_focus_cost: 0,
            layout: EntryLayout::Across,
            focus_carries_over: false,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreRules {
    /// Seconds left on a solved room are divided by this to get bonus points.
    pub time_bonus_divisor: u32,
}

impl Default for ScoreRules {
    fn default() -> Self {
        Self {
            time_bonus_divisor: 5,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub rooms_per_run: u8,
    pub room_seconds: u32,
    pub rules: RoomRules,
    pub scoring: ScoreRules,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            rooms_per_run: 3,
            room_seconds: 120,
            rules: RoomRules::default(),
            scoring: ScoreRules::default(),
        }
    }
}

impl RunConfig {
    /// Returns a copy with every value that would stall a run raised to its minimum.
    pub fn validated(self) -> Self {
        let mut config = self;

        if config.rooms_per_run == 0 {
            log::warn!("rooms_per_run must be at least 1, using 1");
            config.rooms_per_run = 1;
        }
        if config.room_seconds == 0 {
            log::warn!("room_seconds must be at least 1, using 1");
            config.room_seconds = 1;
        }
        if config.rules.start_focus == 0 {
            log::warn!("start_focus must be at least 1, using 1");
            config.rules.start_focus = 1;
        }
        if config.rules.peek_cost == 0 {
            log::warn!("peek_cost must be at least 1, using 1");
            config.rules.peek_cost = 1;
        }
        if config.scoring.time_bonus_divisor == 0 {
            log::warn!("time_bonus_divisor must be at least 1, using 1");
            config.scoring.time_bonus_divisor = 1;
        }

        config
    }
}
