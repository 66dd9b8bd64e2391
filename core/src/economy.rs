use ndarray::Array2;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::*;

/// Cost of a placed letter.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Damage {
    None,
    /// The charm took the hit.
    Absorbed,
    /// The cell already cost Focus since it was last correct.
    AlreadyPenalized,
    Focus(u16),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LetterOutcome {
    pub fill: FillOutcome,
    pub damage: Damage,
    pub fog_lifted: SmallVec<[EntryId; 2]>,
    pub focus: u16,
}

impl LetterOutcome {
    pub fn focus_depleted(&self) -> bool {
        self.focus == 0
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealOutcome {
    pub revealed: RevealedLetter,
    pub focus_cost: u16,
    pub fog_lifted: SmallVec<[EntryId; 2]>,
    pub focus: u16,
}

impl RevealOutcome {
    pub fn focus_depleted(&self) -> bool {
        self.focus == 0
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeekOutcome {
    pub entry: EntryId,
    pub focus: u16,
}

/// Focus, Check and Reveal counters, the charm, fog and penalty markers of one room.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Economy {
    rules: RoomRules,
    focus: u16,
    checks: u8,
    reveals: u8,
    charm_ready: bool,
    fog: bool,
    wrongs: u16,
    penalized: Array2<bool>,
}

impl Economy {
    /// Sets up room defaults, covering the board's clues when fog is on.
    pub fn new(rules: RoomRules, focus: u16, board: &mut Board) -> Self {
        if rules.fog {
            board.cover_clues();
        }

        Self {
            rules,
            focus,
            checks: rules.start_checks,
            reveals: rules.start_reveals,
            charm_ready: rules.charm,
            fog: rules.fog,
            wrongs: 0,
            penalized: Array2::default(board.size().to_nd_index()),
        }
    }

    pub fn focus(&self) -> u16 {
        self.focus
    }

    pub fn checks(&self) -> u8 {
        self.checks
    }

    pub fn reveals(&self) -> u8 {
        self.reveals
    }

    pub fn charm_available(&self) -> bool {
        self.charm_ready
    }

    pub fn fog_active(&self) -> bool {
        self.fog
    }

    /// Wrong letters that cost Focus.
    pub fn wrongs(&self) -> u16 {
        self.wrongs
    }

    pub fn is_depleted(&self) -> bool {
        self.focus == 0
    }

    pub fn is_penalized(&self, coords: Coord2) -> bool {
        self.penalized
            .get(coords.to_nd_index())
            .copied()
            .unwrap_or(false)
    }

    pub fn apply_letter(
        &mut self,
        board: &mut Board,
        coords: Coord2,
        letter: Option<char>,
    ) -> Result<LetterOutcome> {
        let fill = board.set_letter(coords, letter)?;
        let mut fog_lifted = SmallVec::new();
        let mut damage = Damage::None;

        if fill.correct {
            self.penalized[coords.to_nd_index()] = false;
            for id in board.entries_at(coords) {
                if board.uncover(id) {
                    fog_lifted.push(id);
                }
            }
        } else if letter.is_some() {
            damage = self.penalize(coords);
        }
        lift_solved(board, &fill, &mut fog_lifted);

        Ok(LetterOutcome {
            fill,
            damage,
            fog_lifted,
            focus: self.focus,
        })
    }

    fn penalize(&mut self, coords: Coord2) -> Damage {
        let marker = &mut self.penalized[coords.to_nd_index()];
        if *marker {
            return Damage::AlreadyPenalized;
        }

        if self.charm_ready {
            self.charm_ready = false;
            log::debug!("Charm absorbed wrong letter at {:?}", coords);
            return Damage::Absorbed;
        }

        *marker = true;
        self.wrongs += 1;
        self.focus = self.focus.saturating_sub(1);
        log::debug!("Wrong letter at {:?}, focus now {}", coords, self.focus);
        Damage::Focus(1)
    }

    pub fn check(&mut self, board: &Board, coords: Coord2) -> Result<Correctness> {
        if self.checks == 0 {
            return Err(GameError::ResourceExhausted(Resource::Checks));
        }

        let result = board.check_correctness(coords)?;
        self.checks -= 1;
        Ok(result)
    }

    pub fn reveal_cell(&mut self, board: &mut Board, coords: Coord2) -> Result<RevealOutcome> {
        if self.reveals == 0 {
            return Err(GameError::ResourceExhausted(Resource::Reveals));
        }

        let revealed = board.reveal(coords)?;
        self.reveals -= 1;
        self.penalized[coords.to_nd_index()] = false;

        let focus_cost = self.rules.reveal_focus_cost.min(self.focus);
        self.focus -= focus_cost;

        let mut fog_lifted = SmallVec::new();
        lift_solved(board, &revealed.fill, &mut fog_lifted);

        Ok(RevealOutcome {
            revealed,
            focus_cost,
            fog_lifted,
            focus: self.focus,
        })
    }

    pub fn peek(&mut self, board: &mut Board, id: EntryId) -> Result<PeekOutcome> {
        let entry = board.entry(id)?;
        if !self.fog || !entry.is_hidden() {
            return Err(GameError::ResourceExhausted(Resource::Fog));
        }
        // peeking is never the lethal move
        if self.focus <= self.rules.peek_cost {
            return Err(GameError::ResourceExhausted(Resource::Focus));
        }

        self.focus -= self.rules.peek_cost;
        board.uncover(id);

        Ok(PeekOutcome {
            entry: id,
            focus: self.focus,
        })
    }
}

fn lift_solved(board: &mut Board, fill: &FillOutcome, fog_lifted: &mut SmallVec<[EntryId; 2]>) {
    for &id in &fill.newly_solved {
        if board.uncover(id) {
            fog_lifted.push(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::tests::{alert_puzzle, puzzle};

    fn setup(rules: RoomRules) -> (Board, Economy) {
        let mut board = Board::build(&alert_puzzle(), rules.layout);
        let economy = Economy::new(rules, rules.start_focus, &mut board);
        (board, economy)
    }

    #[test]
    fn charm_absorbs_only_first_wrong_letter() {
        let (mut board, mut economy) = setup(RoomRules::default());

        let first = economy.apply_letter(&mut board, (0, 0), Some('Z')).unwrap();
        assert_eq!(first.damage, Damage::Absorbed);
        assert_eq!(economy.focus(), 10);
        assert!(!economy.charm_available());

        let second = economy.apply_letter(&mut board, (2, 2), Some('Z')).unwrap();
        assert_eq!(second.damage, Damage::Focus(1));
        assert_eq!(economy.focus(), 9);
        assert_eq!(economy.wrongs(), 1);
    }

    #[test]
    fn absorbed_cell_can_still_be_penalized() {
        let (mut board, mut economy) = setup(RoomRules::default());

        economy.apply_letter(&mut board, (0, 0), Some('Z')).unwrap();
        let outcome = economy.apply_letter(&mut board, (0, 0), Some('Y')).unwrap();

        assert_eq!(outcome.damage, Damage::Focus(1));
        assert_eq!(economy.focus(), 9);
    }

    #[test]
    fn penalty_marker_clears_on_correction() {
        let rules = RoomRules {
            charm: false,
            ..RoomRules::default()
        };
        let (mut board, mut economy) = setup(rules);

        economy.apply_letter(&mut board, (0, 0), Some('Z')).unwrap();
        let repeat = economy.apply_letter(&mut board, (0, 0), Some('Y')).unwrap();
        assert_eq!(repeat.damage, Damage::AlreadyPenalized);
        assert_eq!(economy.focus(), 9);
        assert!(economy.is_penalized((0, 0)));

        economy.apply_letter(&mut board, (0, 0), Some('A')).unwrap();
        assert!(!economy.is_penalized((0, 0)));

        let again = economy.apply_letter(&mut board, (0, 0), Some('Q')).unwrap();
        assert_eq!(again.damage, Damage::Focus(1));
        assert_eq!(economy.focus(), 8);
        assert_eq!(economy.wrongs(), 2);
    }

    #[test]
    fn clearing_a_cell_costs_nothing() {
        let (mut board, mut economy) = setup(RoomRules::default());

        let outcome = economy.apply_letter(&mut board, (0, 0), None).unwrap();

        assert_eq!(outcome.damage, Damage::None);
        assert!(economy.charm_available());
    }

    #[test]
    fn focus_stops_at_zero() {
        let rules = RoomRules {
            start_focus: 2,
            charm: false,
            ..RoomRules::default()
        };
        let (mut board, mut economy) = setup(rules);

        economy.apply_letter(&mut board, (0, 0), Some('Z')).unwrap();
        let outcome = economy.apply_letter(&mut board, (0, 1), Some('Z')).unwrap();
        assert!(outcome.focus_depleted());
        assert!(economy.is_depleted());

        economy.apply_letter(&mut board, (0, 2), Some('Z')).unwrap();
        assert_eq!(economy.focus(), 0);
    }

    #[test]
    fn correct_letter_lifts_fog_of_its_entry() {
        let (mut board, mut economy) = setup(RoomRules::default());
        assert!(board.entries().iter().all(Entry::is_hidden));

        let outcome = economy.apply_letter(&mut board, (0, 2), Some('E')).unwrap();

        assert_eq!(outcome.fog_lifted.as_slice(), [EntryId(0)]);
        assert!(!board.entry(EntryId(0)).unwrap().is_hidden());
        assert!(board.entry(EntryId(1)).unwrap().is_hidden());

        let wrong = economy.apply_letter(&mut board, (1, 0), Some('Z')).unwrap();
        assert!(wrong.fog_lifted.is_empty());
        assert!(board.entry(EntryId(1)).unwrap().is_hidden());
    }

    #[test]
    fn check_spends_only_a_check() {
        let (mut board, mut economy) = setup(RoomRules::default());
        economy.apply_letter(&mut board, (0, 0), Some('Z')).unwrap();
        let board_before = board.clone();
        let focus_before = economy.focus();

        assert_eq!(economy.check(&board, (0, 0)), Ok(Correctness::Incorrect));
        assert_eq!(economy.check(&board, (0, 1)), Ok(Correctness::Empty));
        assert_eq!(economy.check(&board, (1, 2)), Err(GameError::InvalidTarget));
        assert_eq!(economy.checks(), 1);
        assert_eq!(economy.check(&board, (0, 0)), Ok(Correctness::Incorrect));
        assert_eq!(
            economy.check(&board, (0, 0)),
            Err(GameError::ResourceExhausted(Resource::Checks))
        );

        assert_eq!(economy.checks(), 0);
        assert_eq!(economy.focus(), focus_before);
        assert_eq!(board, board_before);
    }

    #[test]
    fn second_reveal_is_exhausted() {
        let (mut board, mut economy) = setup(RoomRules::default());

        let outcome = economy.reveal_cell(&mut board, (2, 1)).unwrap();
        assert_eq!(outcome.revealed.letter, 'E');
        assert!(board.cell_at((2, 1)).is_revealed());
        assert!(board.cell_at((2, 1)).is_correct());
        assert_eq!(economy.reveals(), 0);

        let before = board.clone();
        assert_eq!(
            economy.reveal_cell(&mut board, (2, 2)),
            Err(GameError::ResourceExhausted(Resource::Reveals))
        );
        assert_eq!(board, before);
    }

    #[test]
    fn reveal_can_cost_focus() {
        let rules = RoomRules {
            start_focus: 1,
            reveal_focus_cost: 2,
            ..RoomRules::default()
        };
        let (mut board, mut economy) = setup(rules);

        let outcome = economy.reveal_cell(&mut board, (0, 0)).unwrap();

        assert_eq!(outcome.focus_cost, 1);
        assert!(outcome.focus_depleted());
    }

    #[test]
    fn invalid_reveal_keeps_counter() {
        let (mut board, mut economy) = setup(RoomRules::default());

        assert_eq!(economy.reveal_cell(&mut board, (1, 2)), Err(GameError::InvalidTarget));
        assert_eq!(economy.reveals(), 1);
    }

    #[test]
    fn peek_costs_focus_and_never_kills() {
        let rules = RoomRules {
            start_focus: 2,
            ..RoomRules::default()
        };
        let (mut board, mut economy) = setup(rules);

        let outcome = economy.peek(&mut board, EntryId(3)).unwrap();
        assert_eq!(outcome.focus, 1);
        assert!(!board.entry(EntryId(3)).unwrap().is_hidden());

        assert_eq!(
            economy.peek(&mut board, EntryId(3)),
            Err(GameError::ResourceExhausted(Resource::Fog))
        );
        assert_eq!(
            economy.peek(&mut board, EntryId(4)),
            Err(GameError::ResourceExhausted(Resource::Focus))
        );
        assert_eq!(economy.peek(&mut board, EntryId(40)), Err(GameError::UnknownEntry));
        assert_eq!(economy.focus(), 1);
    }

    #[test]
    fn peek_needs_fog() {
        let rules = RoomRules {
            fog: false,
            ..RoomRules::default()
        };
        let mut board = Board::build(&puzzle(&["AB"]), rules.layout);
        let mut economy = Economy::new(rules, 10, &mut board);

        assert!(!board.entry(EntryId(0)).unwrap().is_hidden());
        assert_eq!(
            economy.peek(&mut board, EntryId(0)),
            Err(GameError::ResourceExhausted(Resource::Fog))
        );
    }
}
