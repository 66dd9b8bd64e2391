/// Fixed identifier the best score is stored under.
pub const BEST_SCORE_KEY: &str = "crosscrawl_hi";

/// Persistence for the single best run total.
pub trait ScoreStore {
    fn load_best(&self) -> Option<u32>;
    fn save_best(&mut self, score: u32);
}

/// Store that forgets everything once dropped.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct MemoryScoreStore {
    best: Option<u32>,
}

impl MemoryScoreStore {
    pub const fn new(best: Option<u32>) -> Self {
        Self { best }
    }
}

impl ScoreStore for MemoryScoreStore {
    fn load_best(&self) -> Option<u32> {
        self.best
    }

    fn save_best(&mut self, score: u32) {
        self.best = Some(score);
    }
}

impl<T: ScoreStore + ?Sized> ScoreStore for &mut T {
    fn load_best(&self) -> Option<u32> {
        (**self).load_best()
    }

    fn save_best(&mut self, score: u32) {
        (**self).save_best(score)
    }
}
