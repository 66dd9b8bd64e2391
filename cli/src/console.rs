use std::fmt::Write;
use std::str::FromStr;

use crosscrawl_core as game;
use game::{Action, Coord, Coord2, GameEvent, Heading, RoomOutcome, RoomState, Snapshot};
use thiserror::Error;

pub(crate) const HELP: &str = "\
Commands (rows and columns count from 1):
  start                     start the first room
  place <row> <col> <A-Z>   write a letter
  type <A-Z>                write at the selected cell
  clear [<row> <col>]       empty a cell
  check [<row> <col>]       spend a Check on a cell
  reveal [<row> <col>]      spend a Reveal on a cell
  peek [<label>]            spend Focus to lift the fog of an entry, e.g. `peek 4a`
  move <up|down|left|right> move the selection
  select <label>            select an entry, e.g. `select 1a`
  tab | back                next or previous entry
  next                      next empty cell of the entry
  continue                  go on to the next room
  end                       end the run now
  show | help | quit";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub(crate) enum CommandError {
    #[error("Unknown command `{0}`, try `help`")]
    Unknown(String),
    #[error("Missing {0}")]
    Missing(&'static str),
    #[error("`{0}` is not a row or column number")]
    BadNumber(String),
    #[error("`{0}` is not a single letter")]
    BadLetter(String),
    #[error("`{0}` is not one of up, down, left, right")]
    BadHeading(String),
    #[error("No entry labelled `{0}`")]
    BadLabel(String),
    #[error("Nothing is selected")]
    NoSelection,
}

/// One line typed by the player.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Command {
    Start,
    Place(Coord2, char),
    Type(char),
    Clear(Option<Coord2>),
    Check(Option<Coord2>),
    Reveal(Option<Coord2>),
    Peek(Option<String>),
    Move(Heading),
    Select(String),
    Cycle { forward: bool },
    Next,
    Continue,
    End,
    Show,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            return Ok(Self::Show);
        };
        let args: Vec<&str> = words.collect();

        let command = match name.to_ascii_lowercase().as_str() {
            "start" => Self::Start,
            "place" | "p" => {
                let coords = parse_coords(&args)?.ok_or(CommandError::Missing("row and column"))?;
                let letter = args.get(2).ok_or(CommandError::Missing("letter"))?;
                Self::Place(coords, parse_letter(letter)?)
            }
            "type" | "t" => Self::Type(parse_letter(args.first().ok_or(CommandError::Missing("letter"))?)?),
            "clear" => Self::Clear(parse_coords(&args)?),
            "check" => Self::Check(parse_coords(&args)?),
            "reveal" => Self::Reveal(parse_coords(&args)?),
            "peek" => Self::Peek(args.first().map(|label| label.to_string())),
            "move" | "m" => Self::Move(parse_heading(args.first().ok_or(CommandError::Missing("heading"))?)?),
            "up" | "down" | "left" | "right" => Self::Move(parse_heading(name)?),
            "select" | "s" => Self::Select(args.first().ok_or(CommandError::Missing("entry label"))?.to_string()),
            "tab" => Self::Cycle { forward: true },
            "back" => Self::Cycle { forward: false },
            "next" => Self::Next,
            "continue" | "c" => Self::Continue,
            "end" => Self::End,
            "show" => Self::Show,
            "help" | "?" => Self::Help,
            "quit" | "q" | "exit" => Self::Quit,
            _ => return Err(CommandError::Unknown(name.to_string())),
        };
        Ok(command)
    }
}

impl Command {
    /// Turns the command into a game action, filling in the selection where no target was typed.
    ///
    /// Returns `None` for commands handled by the console itself.
    pub fn to_action(&self, snapshot: &Snapshot) -> Result<Option<Action>, CommandError> {
        let at = |coords: &Option<Coord2>| coords.or(snapshot.selection.cell()).ok_or(CommandError::NoSelection);

        let action = match self {
            Self::Start => Action::StartRoom,
            Self::Place(coords, letter) => Action::PlaceLetter {
                coords: *coords,
                letter: *letter,
            },
            Self::Type(letter) => Action::TypeLetter { letter: *letter },
            Self::Clear(coords) => Action::ClearCell { coords: at(coords)? },
            Self::Check(coords) => Action::Check { coords: at(coords)? },
            Self::Reveal(coords) => Action::Reveal { coords: at(coords)? },
            Self::Peek(Some(label)) => Action::Peek {
                entry: find_entry(snapshot, label)?,
            },
            Self::Peek(None) => Action::Peek {
                entry: snapshot.selection.entry().ok_or(CommandError::NoSelection)?,
            },
            Self::Move(heading) => Action::MoveSelection { heading: *heading },
            Self::Select(label) => Action::SelectEntry {
                entry: find_entry(snapshot, label)?,
            },
            Self::Cycle { forward } => Action::CycleEntry { forward: *forward },
            Self::Next => Action::NextEmpty,
            Self::Continue => Action::AdvanceRoom,
            Self::End => Action::EndRunEarly,
            Self::Show | Self::Help | Self::Quit => return Ok(None),
        };
        Ok(Some(action))
    }
}

fn find_entry(snapshot: &Snapshot, label: &str) -> Result<game::EntryId, CommandError> {
    snapshot
        .entry_by_label(label)
        .map(|entry| entry.id)
        .ok_or_else(|| CommandError::BadLabel(label.to_string()))
}

fn parse_coords(args: &[&str]) -> Result<Option<Coord2>, CommandError> {
    let (Some(row), Some(col)) = (args.first(), args.get(1)) else {
        return Ok(None);
    };
    Ok(Some((parse_index(row)?, parse_index(col)?)))
}

fn parse_index(text: &str) -> Result<Coord, CommandError> {
    text.parse::<Coord>()
        .ok()
        .and_then(|index| index.checked_sub(1))
        .ok_or_else(|| CommandError::BadNumber(text.to_string()))
}

fn parse_letter(text: &str) -> Result<char, CommandError> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(letter), None) if letter.is_ascii_alphabetic() => Ok(letter.to_ascii_uppercase()),
        _ => Err(CommandError::BadLetter(text.to_string())),
    }
}

fn parse_heading(text: &str) -> Result<Heading, CommandError> {
    match text.to_ascii_lowercase().as_str() {
        "up" | "u" => Ok(Heading::Up),
        "down" | "d" => Ok(Heading::Down),
        "left" | "l" => Ok(Heading::Left),
        "right" | "r" => Ok(Heading::Right),
        _ => Err(CommandError::BadHeading(text.to_string())),
    }
}

/// Grid, counters and clue list as plain text.
pub(crate) fn render(snapshot: &Snapshot) -> String {
    let mut out = String::new();
    let (rows, cols) = snapshot.size();
    let selected = snapshot.selection.cell();

    let _ = writeln!(
        out,
        "{}  (room {}/{})",
        snapshot.title,
        snapshot.room_index + 1,
        snapshot.room_count
    );

    out.push_str("    ");
    for col in 0..cols {
        let _ = write!(out, "{:^3}", col + 1);
    }
    out.push('\n');

    for row in 0..rows {
        let _ = write!(out, "{:>3} ", row + 1);
        for col in 0..cols {
            let coords = (row, col);
            let Some(cell) = snapshot.cell(coords) else {
                continue;
            };
            let glyph = match (cell.block, cell.letter) {
                (true, _) => '#',
                (false, Some(letter)) if cell.penalized => letter.to_ascii_lowercase(),
                (false, Some(letter)) => letter,
                (false, None) => '.',
            };
            if selected == Some(coords) {
                let _ = write!(out, "[{}]", glyph);
            } else {
                let _ = write!(out, " {} ", glyph);
            }
        }
        out.push('\n');
    }

    let _ = writeln!(
        out,
        "Focus {}  Checks {}  Reveals {}  Charm {}  Time {}s  Score {}",
        snapshot.focus,
        snapshot.checks,
        snapshot.reveals,
        if snapshot.charm_available { "ready" } else { "spent" },
        snapshot.seconds_left,
        snapshot.total_score
    );

    let current = snapshot.selected_entry().map(|entry| entry.id);
    for entry in &snapshot.entries {
        let marker = if Some(entry.id) == current { '>' } else { ' ' };
        let status = if entry.solved { " (solved)" } else { "" };
        let clue = entry.clue.as_deref().unwrap_or("???");
        let _ = writeln!(out, "{} {:>4}  {}{}", marker, entry.label, clue, status);
    }

    match snapshot.state {
        RoomState::Idle => out.push_str("Type `start` to begin.\n"),
        RoomState::Scored { .. } if !snapshot.run_complete => {
            out.push_str("Type `continue` for the next room or `end` to stop.\n")
        }
        _ => {}
    }

    out
}

fn position((row, col): Coord2) -> String {
    format!("r{}c{}", row + 1, col + 1)
}

/// One line per event worth telling the player about.
pub(crate) fn describe(event: &GameEvent, snapshot: &Snapshot) -> Option<String> {
    let label = |entry: game::EntryId| {
        snapshot
            .entry(entry)
            .map_or_else(|| format!("#{}", entry.0), |view| view.label.clone())
    };

    let line = match event {
        GameEvent::RoomStarted { room_index, puzzle_id } => {
            format!("Room {} begins: {}", room_index + 1, puzzle_id)
        }
        GameEvent::LetterPlaced { .. } | GameEvent::Tick { .. } => return None,
        GameEvent::FocusLost { amount, focus } => format!("Focus -{} ({} left)", amount, focus),
        GameEvent::CharmConsumed { coords } => {
            format!("The charm absorbed the wrong letter at {}", position(*coords))
        }
        GameEvent::FogLifted { entry } => format!("Clue {} is now visible", label(*entry)),
        GameEvent::EntrySolved { entry } => format!("{} solved", label(*entry)),
        GameEvent::Checked { coords, result } => {
            format!("Check {}: {:?}", position(*coords), result)
        }
        GameEvent::CellRevealed { coords, letter } => {
            format!("Revealed {} at {}", letter, position(*coords))
        }
        GameEvent::Peeked { entry, focus } => {
            format!("Peeked at {} ({} focus left)", label(*entry), focus)
        }
        GameEvent::RoomSolved => "Room solved!".to_string(),
        GameEvent::RoomFailed { reason } => format!("Room failed: {:?}", reason),
        GameEvent::RoomScored { score } => format!(
            "Room score {}: {}/{} letters, {} wrong, {}s left",
            score.points, score.correct_letters, score.total_letters, score.wrongs, score.time_bonus
        ),
        GameEvent::RunComplete {
            total_score,
            is_new_best,
        } => {
            if *is_new_best {
                format!("Run complete with {} points, a new best!", total_score)
            } else {
                format!("Run complete with {} points", total_score)
            }
        }
    };
    Some(line)
}

/// Final table of room results.
pub(crate) fn render_summary(summary: &game::RunSummary) -> String {
    let mut out = String::new();
    for record in &summary.rooms {
        let outcome = match record.outcome {
            RoomOutcome::Solved => "solved".to_string(),
            RoomOutcome::Failed(reason) => format!("failed ({:?})", reason),
        };
        let _ = writeln!(
            out,
            "Room {}  {:<10} {:<18} {:>4} pts",
            record.index + 1,
            record.puzzle_id,
            outcome,
            record.score.points
        );
    }
    let _ = writeln!(out, "Total {}", summary.total_score);
    if let Some(best) = summary.previous_best {
        let _ = writeln!(out, "Previous best {}", best);
    }
    out
}
