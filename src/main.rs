//! Pigs and Farmers command-line front end
//!
//! Analyze a position, let the engine play itself, or run perft.

use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};

use pigs::board::{format_line, perft};
use pigs::{BoardState, SearchConfig, SearchEngine};

/// Per-move budget for `play` when no depth, time or config file is given
const PLAY_DEFAULT_TIME_MS: u64 = 1000;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search a position and print progress and the best lines
    Analyze {
        #[command(flatten)]
        position: PositionArgs,
        #[command(flatten)]
        search: SearchArgs,
    },
    /// Let the engine play both sides until the game ends
    ///
    /// Without --depth, --time-ms or --config each move gets one second.
    Play {
        #[command(flatten)]
        position: PositionArgs,
        #[command(flatten)]
        search: SearchArgs,
        /// Stop after this many plies
        #[arg(long, default_value_t = 200)]
        max_plies: u32,
    },
    /// Count leaf positions for each depth up to the given one
    Perft {
        #[command(flatten)]
        position: PositionArgs,
        /// Deepest perft depth
        #[arg(short = 'n', long, default_value_t = 4)]
        depth: u32,
    },
}

#[derive(Args, Debug)]
struct PositionArgs {
    /// Start from this position instead of the initial one
    #[arg(long)]
    fen: Option<String>,

    /// Moves to play first, comma separated (e.g. e2e4,d8d5)
    #[arg(long, value_delimiter = ',')]
    moves: Vec<String>,
}

impl PositionArgs {
    fn board(&self) -> Result<BoardState> {
        let mut board = match &self.fen {
            Some(fen) => BoardState::from_fen(fen).context("invalid --fen")?,
            None => BoardState::new(),
        };
        for text in &self.moves {
            let mv = board.parse_move(text)?;
            board
                .make_move(mv)
                .with_context(|| format!("cannot play {text} in {}", board.to_fen()))?;
        }
        Ok(board)
    }
}

#[derive(Args, Debug)]
struct SearchArgs {
    /// Search settings file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Maximum search depth
    #[arg(long)]
    depth: Option<u32>,

    /// Time budget per move in milliseconds (0 = unbounded)
    #[arg(long)]
    time_ms: Option<u64>,

    /// Number of lines to report
    #[arg(long)]
    lines: Option<usize>,
}

impl SearchArgs {
    fn config(&self) -> Result<SearchConfig> {
        let mut config = match &self.config {
            Some(path) => SearchConfig::load(path)
                .with_context(|| format!("failed to load {}", path.display()))?,
            None => SearchConfig::default(),
        };
        if let Some(depth) = self.depth {
            config.max_depth = depth;
        }
        if let Some(ms) = self.time_ms {
            config.time_limit_ms = ms;
        }
        if let Some(lines) = self.lines {
            config.multi_pv = lines;
        }
        config.validate()?;
        Ok(config)
    }

    /// Like [`config`](Self::config), but bounded by `time_ms` per move when
    /// nothing limits the search.
    fn bounded_config(&self, time_ms: u64) -> Result<SearchConfig> {
        let mut config = self.config()?;
        if self.config.is_none() && self.depth.is_none() && self.time_ms.is_none() {
            config.time_limit_ms = time_ms;
        }
        Ok(config)
    }
}

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.debug { "debug" } else { "info" };
    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, log_level),
    );
    builder
        .format(|buf, record| {
            writeln!(buf, "[{}] {}: {}", record.level(), record.target(), record.args())
        })
        .target(env_logger::Target::Stderr)
        .init();

    if let Err(e) = run(cli.command) {
        log::error!("{e:#}");
        std::process::exit(1);
    }
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Analyze { position, search } => analyze(&position.board()?, search.config()?),
        Command::Play {
            position,
            search,
            max_plies,
        } => play(position.board()?, search.bounded_config(PLAY_DEFAULT_TIME_MS)?, max_plies),
        Command::Perft { position, depth } => run_perft(position.board()?, depth),
    }
}

fn analyze(board: &BoardState, config: SearchConfig) -> Result<()> {
    println!("{board}");
    println!("fen {}", board.to_fen());

    let mut engine = SearchEngine::with_config(config)?;
    engine.set_callback(|info| println!("info {info}"));

    let result = engine.search(board);
    let Some(best) = result.best_move else {
        bail!("no legal moves: {}", board.result());
    };

    for (i, line) in result.lines.iter().enumerate() {
        println!("line {} score {} {}", i + 1, line.score, format_line(&line.moves));
    }
    println!("bestmove {best}");
    log::info!(
        "depth {} nodes {} nps {} time {}ms tt hits {}",
        result.depth,
        result.nodes,
        result.nps,
        result.time_ms,
        result.tt_hits
    );
    Ok(())
}

fn play(mut board: BoardState, config: SearchConfig, max_plies: u32) -> Result<()> {
    let mut engine = SearchEngine::with_config(config)?;

    for _ in 0..max_plies {
        if board.is_game_over() {
            break;
        }
        let result = engine.search(&board);
        let Some(mv) = result.best_move else {
            break;
        };
        println!(
            "{:>3}. {} score {} depth {} nodes {}",
            board.ply() + 1,
            mv,
            result.score,
            result.depth,
            result.nodes
        );
        board.make_move(mv)?;
    }

    println!("{board}");
    println!("result: {}", board.result());
    Ok(())
}

fn run_perft(mut board: BoardState, depth: u32) -> Result<()> {
    for d in 1..=depth {
        let start = Instant::now();
        let nodes = perft(&mut board, d);
        println!("perft {d}: {nodes} ({} ms)", start.elapsed().as_millis());
    }
    Ok(())
}
