use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    Focus,
    Timeout,
    /// The player ended the run while the room was still being played.
    Abandoned,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomOutcome {
    Solved,
    Failed(FailureReason),
}

impl RoomOutcome {
    pub const fn is_solved(self) -> bool {
        matches!(self, Self::Solved)
    }

    pub const fn failure(self) -> Option<FailureReason> {
        match self {
            Self::Solved => None,
            Self::Failed(reason) => Some(reason),
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomState {
    #[default]
    Idle,
    InProgress,
    Scored {
        outcome: RoomOutcome,
        score: RoomScore,
    },
}

impl RoomState {
    pub const fn is_in_progress(self) -> bool {
        matches!(self, Self::InProgress)
    }

    pub const fn is_scored(self) -> bool {
        matches!(self, Self::Scored { .. })
    }
}

/// Whole-second countdown advanced by external ticks.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Countdown {
    seconds_left: u32,
    running: bool,
}

impl Countdown {
    pub const fn new(seconds: u32) -> Self {
        Self {
            seconds_left: seconds,
            running: false,
        }
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Counts one second down, returns whether the countdown was running.
    pub fn tick(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.seconds_left = self.seconds_left.saturating_sub(1);
        true
    }

    pub const fn seconds_left(&self) -> u32 {
        self.seconds_left
    }

    pub const fn is_running(&self) -> bool {
        self.running
    }

    pub const fn is_expired(&self) -> bool {
        self.seconds_left == 0
    }
}

/// One timed play session against a single puzzle.
#[derive(Clone, Debug, PartialEq)]
pub struct Room {
    index: usize,
    puzzle: PuzzleDef,
    config: RunConfig,
    start_focus: u16,
    board: Board,
    economy: Economy,
    countdown: Countdown,
    selection: Selection,
    state: RoomState,
    events: EventQueue,
}

impl Room {
    pub fn new(index: usize, puzzle: PuzzleDef, config: RunConfig, start_focus: u16) -> Self {
        let mut board = Board::build(&puzzle, config.rules.layout);
        let economy = Economy::new(config.rules, start_focus, &mut board);
        let selection = Selection::new(&board);

        Self {
            index,
            puzzle,
            config,
            start_focus,
            board,
            economy,
            countdown: Countdown::new(config.room_seconds),
            selection,
            state: RoomState::Idle,
            events: EventQueue::default(),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn puzzle(&self) -> &PuzzleDef {
        &self.puzzle
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn economy(&self) -> &Economy {
        &self.economy
    }

    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn state(&self) -> RoomState {
        self.state
    }

    pub fn outcome(&self) -> Option<RoomOutcome> {
        match self.state {
            RoomState::Scored { outcome, .. } => Some(outcome),
            _ => None,
        }
    }

    pub fn score(&self) -> Option<RoomScore> {
        match self.state {
            RoomState::Scored { score, .. } => Some(score),
            _ => None,
        }
    }

    pub fn drain_events(&mut self) -> impl Iterator<Item = GameEvent> + '_ {
        self.events.drain()
    }

    /// Rebuilds the board and economy from the puzzle and starts the countdown.
    pub fn start(&mut self) -> Result<()> {
        match self.state {
            RoomState::Idle => {}
            RoomState::InProgress => return Err(GameError::RoomInProgress),
            RoomState::Scored { .. } => return Err(GameError::AlreadyEnded),
        }

        let mut board = Board::build(&self.puzzle, self.config.rules.layout);
        self.economy = Economy::new(self.config.rules, self.start_focus, &mut board);
        self.selection = Selection::new(&board);
        self.board = board;
        self.countdown = Countdown::new(self.config.room_seconds);
        self.countdown.start();
        self.state = RoomState::InProgress;

        log::info!(
            "Room {} started with puzzle {} ({} s, focus {})",
            self.index + 1,
            self.puzzle.id,
            self.countdown.seconds_left(),
            self.economy.focus()
        );
        self.events.push(GameEvent::RoomStarted {
            room_index: self.index,
            puzzle_id: self.puzzle.id.clone(),
        });

        self.settle();
        Ok(())
    }

    fn check_in_progress(&self) -> Result<()> {
        match self.state {
            RoomState::Idle => Err(GameError::NotStarted),
            RoomState::InProgress => Ok(()),
            RoomState::Scored { .. } => Err(GameError::AlreadyEnded),
        }
    }

    pub fn place_letter(&mut self, coords: Coord2, letter: char) -> Result<LetterOutcome> {
        self.check_in_progress()?;

        let outcome = self
            .economy
            .apply_letter(&mut self.board, coords, Some(letter))?;
        self.report_letter(coords, &outcome);
        self.selection.advance_from(&self.board, coords);

        self.settle();
        Ok(outcome)
    }

    /// Places a letter at the selected cell.
    pub fn type_letter(&mut self, letter: char) -> Result<LetterOutcome> {
        let coords = self.selection.cell().ok_or(GameError::InvalidTarget)?;
        self.place_letter(coords, letter)
    }

    pub fn clear_letter(&mut self, coords: Coord2) -> Result<LetterOutcome> {
        self.check_in_progress()?;

        let outcome = self.economy.apply_letter(&mut self.board, coords, None)?;
        self.report_letter(coords, &outcome);

        self.settle();
        Ok(outcome)
    }

    fn report_letter(&mut self, coords: Coord2, outcome: &LetterOutcome) {
        self.events.push(GameEvent::LetterPlaced {
            coords,
            letter: self.board.cell_at(coords).entered(),
            correct: outcome.fill.correct,
        });

        match outcome.damage {
            Damage::Absorbed => self.events.push(GameEvent::CharmConsumed { coords }),
            Damage::Focus(amount) => self.events.push(GameEvent::FocusLost {
                amount,
                focus: outcome.focus,
            }),
            Damage::None | Damage::AlreadyPenalized => {}
        }

        self.report_progress(&outcome.fog_lifted, &outcome.fill.newly_solved);
    }

    fn report_progress(&mut self, fog_lifted: &[EntryId], newly_solved: &[EntryId]) {
        self.events.extend(
            fog_lifted
                .iter()
                .map(|&entry| GameEvent::FogLifted { entry }),
        );
        self.events.extend(
            newly_solved
                .iter()
                .map(|&entry| GameEvent::EntrySolved { entry }),
        );
    }

    pub fn check(&mut self, coords: Coord2) -> Result<Correctness> {
        self.check_in_progress()?;

        let result = self.economy.check(&self.board, coords)?;
        self.events.push(GameEvent::Checked { coords, result });
        Ok(result)
    }

    pub fn reveal(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        self.check_in_progress()?;

        let outcome = self.economy.reveal_cell(&mut self.board, coords)?;
        self.events.push(GameEvent::CellRevealed {
            coords,
            letter: outcome.revealed.letter,
        });
        if outcome.focus_cost > 0 {
            self.events.push(GameEvent::FocusLost {
                amount: outcome.focus_cost,
                focus: outcome.focus,
            });
        }
        self.report_progress(&outcome.fog_lifted, &outcome.revealed.fill.newly_solved);

        self.settle();
        Ok(outcome)
    }

    pub fn peek(&mut self, id: EntryId) -> Result<PeekOutcome> {
        self.check_in_progress()?;

        let outcome = self.economy.peek(&mut self.board, id)?;
        self.events.push(GameEvent::Peeked {
            entry: id,
            focus: outcome.focus,
        });
        self.events.push(GameEvent::FogLifted { entry: id });
        Ok(outcome)
    }

    pub fn select_cell(&mut self, coords: Coord2) -> Result<()> {
        self.check_in_progress()?;
        self.selection.select_cell(&self.board, coords)
    }

    pub fn select_entry(&mut self, id: EntryId) -> Result<()> {
        self.check_in_progress()?;
        self.selection.select_entry(&self.board, id)
    }

    pub fn move_selection(&mut self, heading: Heading) -> Result<bool> {
        self.check_in_progress()?;
        Ok(self.selection.move_by(&self.board, heading))
    }

    pub fn cycle_entry(&mut self, forward: bool) -> Result<()> {
        self.check_in_progress()?;
        self.selection.cycle_entry(&self.board, forward)
    }

    pub fn next_empty(&mut self) -> Result<bool> {
        self.check_in_progress()?;
        Ok(self.selection.next_empty(&self.board))
    }

    /// Advances the countdown by one second. Returns the seconds left, or `None` when
    /// the room is not running.
    pub fn tick(&mut self) -> Option<u32> {
        if !self.state.is_in_progress() || !self.countdown.tick() {
            return None;
        }

        let seconds_left = self.countdown.seconds_left();
        self.events.push(GameEvent::Tick { seconds_left });
        self.settle();
        Some(seconds_left)
    }

    /// Ends a room that is still being played.
    pub fn abandon(&mut self) -> Result<()> {
        self.check_in_progress()?;
        self.finish(RoomOutcome::Failed(FailureReason::Abandoned));
        Ok(())
    }

    /// Post-condition check run after every mutation and every tick.
    fn settle(&mut self) {
        if !self.state.is_in_progress() {
            return;
        }

        if self.economy.is_depleted() {
            self.finish(RoomOutcome::Failed(FailureReason::Focus));
        } else if self.board.is_all_solved() {
            self.finish(RoomOutcome::Solved);
        } else if self.countdown.is_expired() {
            self.finish(RoomOutcome::Failed(FailureReason::Timeout));
        }
    }

    fn finish(&mut self, outcome: RoomOutcome) {
        self.countdown.stop();
        let score = RoomScore::compute(
            &self.board,
            &self.economy,
            self.countdown.seconds_left(),
            outcome,
            self.config.scoring,
        );

        match outcome {
            RoomOutcome::Solved => self.events.push(GameEvent::RoomSolved),
            RoomOutcome::Failed(reason) => self.events.push(GameEvent::RoomFailed { reason }),
        }
        self.events.push(GameEvent::RoomScored { score });
        self.state = RoomState::Scored { outcome, score };

        log::info!(
            "Room {} ended {:?} with {} points",
            self.index + 1,
            outcome,
            score.points
        );
    }
}
