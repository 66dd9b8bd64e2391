use alloc::string::String;
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::*;

/// Result of one finished room, kept for the run summary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomRecord {
    pub index: usize,
    pub puzzle_id: String,
    pub outcome: RoomOutcome,
    pub score: RoomScore,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub rooms: Vec<RoomRecord>,
    pub total_score: u32,
    pub previous_best: Option<u32>,
    pub is_new_best: bool,
}

/// Fixed-length sequence of rooms with a running total.
#[derive(Clone, Debug)]
pub struct Run<S> {
    config: RunConfig,
    puzzles: Vec<PuzzleDef>,
    room: Room,
    records: Vec<RoomRecord>,
    total_score: u32,
    summary: Option<RunSummary>,
    store: S,
    events: EventQueue,
}

impl<S: ScoreStore> Run<S> {
    /// Draws `rooms_per_run` puzzles from `source` in an order decided by `seed`.
    pub fn new(config: RunConfig, source: &PuzzleSource, seed: u64, store: S) -> Result<Self> {
        use rand::prelude::*;

        let mut puzzles = source.puzzles().to_vec();
        let mut rng = SmallRng::seed_from_u64(seed);
        puzzles.shuffle(&mut rng);

        Self::with_puzzles(config, puzzles, store)
    }

    /// Plays the first `rooms_per_run` of `puzzles` in the given order.
    pub fn with_puzzles(config: RunConfig, mut puzzles: Vec<PuzzleDef>, store: S) -> Result<Self> {
        let config = config.validated();
        puzzles.truncate(config.rooms_per_run.into());
        let Some(first) = puzzles.first() else {
            return Err(GameError::NoPuzzles);
        };

        let room = Room::new(0, first.clone(), config, config.rules.start_focus);
        log::info!(
            "New run of {} rooms: {:?}",
            puzzles.len(),
            puzzles.iter().map(|puzzle| puzzle.id.as_str()).collect::<Vec<_>>()
        );

        Ok(Self {
            config,
            puzzles,
            room,
            records: Vec::new(),
            total_score: 0,
            summary: None,
            store,
            events: EventQueue::default(),
        })
    }

    pub fn room(&self) -> &Room {
        &self.room
    }

    pub fn room_count(&self) -> usize {
        self.puzzles.len()
    }

    pub fn puzzles(&self) -> &[PuzzleDef] {
        &self.puzzles
    }

    pub fn records(&self) -> &[RoomRecord] {
        &self.records
    }

    pub fn total_score(&self) -> u32 {
        self.total_score
    }

    pub fn summary(&self) -> Option<&RunSummary> {
        self.summary.as_ref()
    }

    pub fn is_complete(&self) -> bool {
        self.summary.is_some()
    }

    /// Whether the current room is scored and the run goes on to another one.
    pub fn has_next_room(&self) -> bool {
        !self.is_complete()
            && self.room.state().is_scored()
            && self.room.index() + 1 < self.puzzles.len()
    }

    pub fn drain_events(&mut self) -> impl Iterator<Item = GameEvent> + '_ {
        self.events.drain()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.room, self.room_count(), self.total_score, self.is_complete())
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_complete() {
            Err(GameError::RunOver)
        } else {
            Ok(())
        }
    }

    fn with_room<T>(&mut self, action: impl FnOnce(&mut Room) -> Result<T>) -> Result<T> {
        self.ensure_open()?;
        let result = action(&mut self.room);
        self.pump();
        result
    }

    pub fn start_room(&mut self) -> Result<()> {
        self.with_room(Room::start)
    }

    /// Moves on to the next room and starts it.
    pub fn advance_room(&mut self) -> Result<()> {
        self.ensure_open()?;
        match self.room.state() {
            RoomState::Idle => return Err(GameError::NotStarted),
            RoomState::InProgress => return Err(GameError::RoomInProgress),
            RoomState::Scored { .. } => {}
        }

        let index = self.room.index() + 1;
        let Some(puzzle) = self.puzzles.get(index) else {
            return Err(GameError::RunOver);
        };

        let focus = if self.config.rules.focus_carries_over {
            self.room.economy().focus()
        } else {
            self.config.rules.start_focus
        };
        log::debug!("Advancing to room {} with focus {}", index + 1, focus);

        self.room = Room::new(index, puzzle.clone(), self.config, focus);
        self.start_room()
    }

    /// Completes the run now, abandoning the room if it is still being played.
    pub fn end_run_early(&mut self) -> Result<&RunSummary> {
        self.ensure_open()?;
        if self.room.state().is_in_progress() {
            self.room.abandon()?;
        }
        self.pump();
        self.finalize();

        self.summary.as_ref().ok_or(GameError::RunOver)
    }

    pub fn tick(&mut self) -> Option<u32> {
        if self.is_complete() {
            return None;
        }
        let seconds_left = self.room.tick();
        self.pump();
        seconds_left
    }

    pub fn place_letter(&mut self, coords: Coord2, letter: char) -> Result<LetterOutcome> {
        self.with_room(|room| room.place_letter(coords, letter))
    }

    pub fn type_letter(&mut self, letter: char) -> Result<LetterOutcome> {
        self.with_room(|room| room.type_letter(letter))
    }

    pub fn clear_letter(&mut self, coords: Coord2) -> Result<LetterOutcome> {
        self.with_room(|room| room.clear_letter(coords))
    }

    pub fn check(&mut self, coords: Coord2) -> Result<Correctness> {
        self.with_room(|room| room.check(coords))
    }

    pub fn reveal(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        self.with_room(|room| room.reveal(coords))
    }

    pub fn peek(&mut self, id: EntryId) -> Result<PeekOutcome> {
        self.with_room(|room| room.peek(id))
    }

    pub fn select_cell(&mut self, coords: Coord2) -> Result<()> {
        self.with_room(|room| room.select_cell(coords))
    }

    pub fn select_entry(&mut self, id: EntryId) -> Result<()> {
        self.with_room(|room| room.select_entry(id))
    }

    pub fn move_selection(&mut self, heading: Heading) -> Result<bool> {
        self.with_room(|room| room.move_selection(heading))
    }

    pub fn cycle_entry(&mut self, forward: bool) -> Result<()> {
        self.with_room(|room| room.cycle_entry(forward))
    }

    pub fn next_empty(&mut self) -> Result<bool> {
        self.with_room(Room::next_empty)
    }

    /// Forwards room events, records a freshly scored room and completes the run when it is over.
    fn pump(&mut self) {
        let drained: Vec<GameEvent> = self.room.drain_events().collect();
        self.events.extend(drained);

        let (Some(outcome), Some(score)) = (self.room.outcome(), self.room.score()) else {
            return;
        };
        if self.records.iter().any(|record| record.index == self.room.index()) {
            return;
        }

        self.total_score = self.total_score.saturating_add(score.points);
        self.records.push(RoomRecord {
            index: self.room.index(),
            puzzle_id: self.room.puzzle().id.clone(),
            outcome,
            score,
        });

        let last_room = self.room.index() + 1 >= self.puzzles.len();
        if outcome.failure() == Some(FailureReason::Focus) || last_room {
            self.finalize();
        }
    }

    fn finalize(&mut self) {
        if self.summary.is_some() {
            return;
        }

        let previous_best = self.store.load_best();
        let is_new_best = self.total_score > previous_best.unwrap_or(0);
        if is_new_best {
            self.store.save_best(self.total_score);
        }

        log::info!(
            "Run complete with {} points over {} rooms (best {:?}, new best: {})",
            self.total_score,
            self.records.len(),
            previous_best,
            is_new_best
        );
        self.events.push(GameEvent::RunComplete {
            total_score: self.total_score,
            is_new_best,
        });
        self.summary = Some(RunSummary {
            rooms: self.records.clone(),
            total_score: self.total_score,
            previous_best,
            is_new_best,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::tests::puzzle;
    use alloc::string::ToString;
    use alloc::vec;

    fn named(id: &str, rows: &[&str]) -> PuzzleDef {
        PuzzleDef {
            id: id.to_string(),
            ..puzzle(rows)
        }
    }

    fn pair() -> Vec<PuzzleDef> {
        vec![named("first", &["AB"]), named("second", &["CD"])]
    }

    fn solve(run: &mut Run<impl ScoreStore>) {
        let cells: Vec<(Coord2, char)> = run
            .room()
            .board()
            .positions()
            .filter_map(|coords| Some((coords, run.room().board().cell_at(coords).solution()?)))
            .collect();
        for (coords, letter) in cells {
            run.place_letter(coords, letter).unwrap();
        }
    }

    #[test]
    fn empty_pool_is_rejected() {
        let result = Run::new(
            RunConfig::default(),
            &PuzzleSource::default(),
            1,
            MemoryScoreStore::default(),
        );

        assert_eq!(result.err(), Some(GameError::NoPuzzles));
    }

    #[test]
    fn seeded_draw_is_repeatable() {
        let source = PuzzleSource::builtin();
        let ids = |seed| {
            let run = Run::new(RunConfig::default(), &source, seed, MemoryScoreStore::default()).unwrap();
            run.puzzles()
                .iter()
                .map(|puzzle| puzzle.id.clone())
                .collect::<Vec<_>>()
        };

        let first = ids(7);
        assert_eq!(first, ids(7));
        assert_eq!(first.len(), 3);
        assert!(first.iter().all(|id| source.get(id).is_some()));
        assert_ne!(first[0], first[1]);
        assert_ne!(first[1], first[2]);
    }

    #[test]
    fn short_pool_limits_room_count() {
        let config = RunConfig {
            rooms_per_run: 9,
            ..RunConfig::default()
        };
        let run = Run::new(config, &PuzzleSource::new(pair()), 3, MemoryScoreStore::default()).unwrap();

        assert_eq!(run.room_count(), 2);
    }

    #[test]
    fn solving_every_room_completes_run() {
        let mut store = MemoryScoreStore::default();
        let mut run = Run::with_puzzles(RunConfig::default(), pair(), &mut store).unwrap();

        run.start_room().unwrap();
        assert_eq!(run.advance_room(), Err(GameError::RoomInProgress));
        solve(&mut run);
        assert!(run.has_next_room());
        assert!(!run.is_complete());

        run.advance_room().unwrap();
        assert_eq!(run.room().puzzle().id, "second");
        assert!(run.room().state().is_in_progress());
        solve(&mut run);

        let summary = run.summary().unwrap().clone();
        assert_eq!(summary.rooms.len(), 2);
        assert_eq!(summary.total_score, 2 * (2 + 120 / 5));
        assert!(summary.is_new_best);
        assert_eq!(summary.previous_best, None);

        let events: Vec<GameEvent> = run.drain_events().collect();
        assert_eq!(
            events.last(),
            Some(&GameEvent::RunComplete {
                total_score: 52,
                is_new_best: true
            })
        );
        assert_eq!(run.place_letter((0, 0), 'C'), Err(GameError::RunOver));
        drop(run);
        assert_eq!(store.load_best(), Some(52));
    }

    #[test]
    fn focus_failure_ends_run_early() {
        let mut config = RunConfig::default();
        config.rules.start_focus = 1;
        config.rules.charm = false;
        let mut run = Run::with_puzzles(config, pair(), MemoryScoreStore::default()).unwrap();

        run.start_room().unwrap();
        run.place_letter((0, 0), 'Z').unwrap();

        assert!(run.is_complete());
        assert!(!run.has_next_room());
        assert_eq!(run.advance_room(), Err(GameError::RunOver));
        let summary = run.summary().unwrap();
        assert_eq!(
            summary.rooms[0].outcome,
            RoomOutcome::Failed(FailureReason::Focus)
        );
        assert!(!summary.is_new_best);
    }

    #[test]
    fn reveal_that_drains_focus_ends_run() {
        let mut config = RunConfig::default();
        config.rules.start_focus = 1;
        config.rules.reveal_focus_cost = 1;
        let mut run = Run::with_puzzles(config, pair(), MemoryScoreStore::default()).unwrap();

        run.start_room().unwrap();
        run.reveal((0, 0)).unwrap();

        assert_eq!(run.room().economy().focus(), 0);
        assert_eq!(
            run.room().outcome(),
            Some(RoomOutcome::Failed(FailureReason::Focus))
        );
        assert!(run.is_complete());
        assert_eq!(run.summary().unwrap().rooms.len(), 1);
    }

    #[test]
    fn given_puzzles_are_cut_to_room_count() {
        let config = RunConfig {
            rooms_per_run: 1,
            ..RunConfig::default()
        };
        let run = Run::with_puzzles(config, pair(), MemoryScoreStore::default()).unwrap();

        assert_eq!(run.room_count(), 1);
        assert_eq!(run.puzzles()[0].id, "first");
    }

    #[test]
    fn timeout_moves_on_to_next_room() {
        let config = RunConfig {
            room_seconds: 2,
            ..RunConfig::default()
        };
        let mut run = Run::with_puzzles(config, pair(), MemoryScoreStore::default()).unwrap();

        run.start_room().unwrap();
        run.place_letter((0, 0), 'A').unwrap();
        run.tick();
        run.tick();

        assert_eq!(
            run.room().outcome(),
            Some(RoomOutcome::Failed(FailureReason::Timeout))
        );
        assert_eq!(run.total_score(), 1);
        assert!(run.has_next_room());
        assert_eq!(run.tick(), None);
    }

    #[test]
    fn lower_total_keeps_stored_best() {
        let mut store = MemoryScoreStore::new(Some(1000));
        let mut run = Run::with_puzzles(RunConfig::default(), pair(), &mut store).unwrap();

        run.start_room().unwrap();
        solve(&mut run);
        let summary = run.end_run_early().unwrap().clone();

        assert_eq!(summary.previous_best, Some(1000));
        assert!(!summary.is_new_best);
        drop(run);
        assert_eq!(store.load_best(), Some(1000));
    }

    #[test]
    fn ending_mid_room_abandons_it() {
        let mut run = Run::with_puzzles(RunConfig::default(), pair(), MemoryScoreStore::default()).unwrap();

        run.start_room().unwrap();
        run.place_letter((0, 0), 'A').unwrap();
        let summary = run.end_run_early().unwrap().clone();

        assert_eq!(summary.rooms.len(), 1);
        assert_eq!(
            summary.rooms[0].outcome,
            RoomOutcome::Failed(FailureReason::Abandoned)
        );
        assert_eq!(summary.total_score, 1);
        assert_eq!(run.end_run_early().err(), Some(GameError::RunOver));

        let events: Vec<GameEvent> = run.drain_events().collect();
        let failed = events
            .iter()
            .position(|event| matches!(event, GameEvent::RoomFailed { .. }))
            .unwrap();
        let complete = events
            .iter()
            .position(|event| matches!(event, GameEvent::RunComplete { .. }))
            .unwrap();
        assert!(failed < complete);
    }

    #[test]
    fn focus_can_carry_over() {
        let mut config = RunConfig::default();
        config.rules.charm = false;
        config.rules.focus_carries_over = true;
        let mut run = Run::with_puzzles(config, pair(), MemoryScoreStore::default()).unwrap();

        run.start_room().unwrap();
        run.place_letter((0, 0), 'X').unwrap();
        solve(&mut run);
        run.advance_room().unwrap();

        assert_eq!(run.room().economy().focus(), 9);
        assert_eq!(run.records()[0].score.points, 2 + 24 - 1);
    }

    #[test]
    fn focus_refills_by_default() {
        let mut config = RunConfig::default();
        config.rules.charm = false;
        let mut run = Run::with_puzzles(config, pair(), MemoryScoreStore::default()).unwrap();

        run.start_room().unwrap();
        run.place_letter((0, 0), 'X').unwrap();
        solve(&mut run);
        run.advance_room().unwrap();

        assert_eq!(run.room().economy().focus(), 10);
    }
}
