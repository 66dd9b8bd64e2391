use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crosscrawl_core as game;
use game::ScoreStore;

mod clock;
mod console;
mod settings;
mod store;

use clock::TickClock;
use console::Command as Input;
use settings::Settings;
use store::FileScoreStore;

#[derive(Parser, Debug)]
#[command(version, about = "Timed crossword rooms played against a Focus budget", long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,

    /// TOML settings file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// JSON puzzle pack to use instead of the built-in one
    #[arg(short, long, global = true)]
    puzzles: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Play a run (default)
    Play {
        /// Force a seed instead of random
        #[arg(short, long)]
        seed: Option<u64>,
    },
    /// List the puzzles in the pack
    Puzzles,
    /// Print the stored best score
    Best,
}

fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .parse_default_env()
        .init();

    let settings = Settings::load(args.config.as_deref())?;
    let source = load_puzzles(args.puzzles.as_deref())?;

    match args.command.unwrap_or(Command::Play { seed: None }) {
        Command::Play { seed } => play(&settings, &source, seed.unwrap_or_else(random_seed)),
        Command::Puzzles => {
            list_puzzles(&settings, &source);
            Ok(())
        }
        Command::Best => {
            match FileScoreStore::open(&settings.storage.scores).load_best() {
                Some(best) => println!("Best score: {}", best),
                None => println!("No best score yet"),
            }
            Ok(())
        }
    }
}

fn load_puzzles(path: Option<&std::path::Path>) -> Result<game::PuzzleSource> {
    let Some(path) = path else {
        return Ok(game::PuzzleSource::builtin());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading puzzle pack {}", path.display()))?;
    game::PuzzleSource::from_json(&text)
        .with_context(|| format!("decoding puzzle pack {}", path.display()))
}

fn random_seed() -> u64 {
    use web_time::{SystemTime, UNIX_EPOCH};

    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or_default()
}

fn list_puzzles(settings: &Settings, source: &game::PuzzleSource) {
    for puzzle in source.puzzles() {
        let board = game::Board::build(puzzle, settings.run.rules.layout);
        let (rows, cols) = board.size();
        println!(
            "{:<10} {:<24} {}x{}  {} entries{}",
            puzzle.id,
            puzzle.display_name(),
            rows,
            cols,
            board.entries().len(),
            if board.issues().is_empty() {
                String::new()
            } else {
                format!("  ({} data issues)", board.issues().len())
            }
        );
    }
}

fn play(settings: &Settings, source: &game::PuzzleSource, seed: u64) -> Result<()> {
    log::debug!("seed: {}", seed);
    let store = FileScoreStore::open(&settings.storage.scores);
    let mut run = game::Run::new(settings.run, source, seed, store).context("setting up the run")?;
    let mut clock = TickClock::new();
    let lines = read_lines();

    println!("{}\n", console::HELP);
    print!("{}", console::render(&run.snapshot()));
    prompt()?;

    loop {
        let line = match lines.recv_timeout(clock.until_next_tick()) {
            Ok(line) => line.context("reading a command")?,
            Err(RecvTimeoutError::Timeout) => {
                catch_up(&mut run, &mut clock);
                if report(&mut run) {
                    if let Some(summary) = run.summary() {
                        print!("{}", console::render_summary(summary));
                        return Ok(());
                    }
                    print!("{}", console::render(&run.snapshot()));
                    prompt()?;
                }
                continue;
            }
            Err(RecvTimeoutError::Disconnected) => break,
        };

        catch_up(&mut run, &mut clock);
        match line.parse::<Input>() {
            Ok(Input::Quit) => break,
            Ok(Input::Help) => println!("{}", console::HELP),
            Ok(input) => match input.to_action(&run.snapshot()) {
                Ok(Some(action)) => {
                    if let Err(err) = run.dispatch(action) {
                        println!("{}", err);
                    }
                }
                Ok(None) => {}
                Err(err) => println!("{}", err),
            },
            Err(err) => println!("{}", err),
        }
        report(&mut run);

        if let Some(summary) = run.summary() {
            print!("{}", console::render_summary(summary));
            return Ok(());
        }
        print!("{}", console::render(&run.snapshot()));
        prompt()?;
    }

    log::info!("Left the run with {} points", run.total_score());
    Ok(())
}

/// Feeds stdin lines through a channel so the countdown keeps running between commands.
fn read_lines() -> Receiver<io::Result<String>> {
    let (sender, receiver) = mpsc::channel();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            if sender.send(line).is_err() {
                break;
            }
        }
    });
    receiver
}

fn catch_up(run: &mut game::Run<FileScoreStore>, clock: &mut TickClock) {
    for _ in 0..clock.elapsed_ticks() {
        if run.tick().is_none() {
            break;
        }
    }
}

/// Prints pending events, returns whether any of them was worth a line.
fn report(run: &mut game::Run<FileScoreStore>) -> bool {
    let snapshot = run.snapshot();
    let mut printed = false;
    for event in run.drain_events() {
        if let Some(text) = console::describe(&event, &snapshot) {
            println!("{}", text);
            printed = true;
        }
    }
    printed
}

fn prompt() -> Result<()> {
    print!("> ");
    io::stdout().flush().context("flushing stdout")
}
