use std::time::Duration;

use web_time::Instant;

/// Turns wall-clock time into whole one-second ticks, carrying the remainder.
#[derive(Copy, Clone, Debug)]
pub(crate) struct TickClock {
    last: Instant,
}

impl TickClock {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(start: Instant) -> Self {
        Self { last: start }
    }

    /// Ticks that elapsed since the previous call.
    pub fn elapsed_ticks(&mut self) -> u64 {
        self.ticks_at(Instant::now())
    }

    /// Time left until the next whole tick is due.
    pub fn until_next_tick(&self) -> Duration {
        self.until_next_tick_at(Instant::now())
    }

    pub fn until_next_tick_at(&self, now: Instant) -> Duration {
        let elapsed = now.saturating_duration_since(self.last);
        Duration::from_secs(1).saturating_sub(elapsed)
    }

    pub fn ticks_at(&mut self, now: Instant) -> u64 {
        let elapsed = now.saturating_duration_since(self.last);
        let ticks = elapsed.as_secs();
        self.last += Duration::from_secs(ticks);
        ticks
    }
}
