//! Command-line front-end for the Block Blast engine.
//!
//! Two modes: `interactive` reads a board and three pieces from stdin and
//! prints the engine's best sequence, `auto` plays full games with random
//! bags and reports the results.

use block_blast_ai::{
    BagGenerator, Board, Bot, MoveSequence, Piece, Position, ScoringWeights, Shape, SolverConfig,
    PIECES_PER_TURN,
};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::error::Error;
use std::fs;
use std::io::{self, BufRead, Write};

#[derive(Parser)]
#[command(name = "block-blast-ai", about = "Block Blast solver", version)]
struct Args {
    /// Number of frontier nodes kept per search depth.
    #[arg(long, default_value_t = 50)]
    beam_width: usize,

    /// Maximum number of placements searched ahead (1-3).
    #[arg(long, default_value_t = 3)]
    max_depth: usize,

    /// Relative pruning cutoff in [0, 1].
    #[arg(long, default_value_t = 0.3)]
    pruning_threshold: f32,

    /// Disable parallel node expansion.
    #[arg(long)]
    serial: bool,

    /// Worker threads for parallel expansion (0 = automatic).
    #[arg(long, default_value_t = 0)]
    threads: usize,

    /// Path to a JSON file with evaluator weights.
    #[arg(long)]
    weights: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Read a board and three pieces, print the best move sequence.
    Interactive,
    /// Play automatic games with random bags and report scores.
    Auto {
        /// Number of games to play.
        #[arg(long, default_value_t = 1)]
        games: usize,
        /// Seed for the bag stream; omitted means non-reproducible.
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let mut config = SolverConfig::default();
    config.beam_width = args.beam_width;
    config.max_depth = args.max_depth;
    config.pruning_threshold = args.pruning_threshold;
    config.use_parallel = !args.serial;
    config.num_threads = args.threads;
    if let Some(path) = &args.weights {
        let contents = fs::read_to_string(path)?;
        let weights: ScoringWeights = serde_json::from_str(&contents)?;
        config.weights = weights;
    }

    let bot = Bot::new(config)?;
    match args.command {
        Command::Interactive => run_interactive(bot),
        Command::Auto { games, seed } => run_auto(bot, games, seed),
    }
}

/// Prompts for a board and three pieces, then prints the engine's answer.
fn run_interactive(mut bot: Bot) -> Result<(), Box<dyn Error>> {
    println!("=== Block Blast Bot ===");
    println!("Enter the board as 8 rows of 8 characters ('.' empty, '#' filled),");
    println!("or a single blank line for an empty board.");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    let board = read_board(&mut lines)?;
    bot.set_board(board);

    println!("Pieces are a catalogue number (1-13) or cells like '0,0;1,0;1,1':");
    print_catalogue();
    let mut pieces = Vec::with_capacity(PIECES_PER_TURN);
    for index in 0..PIECES_PER_TURN {
        pieces.push(read_piece(&mut lines, index)?);
    }
    let pieces: [Piece; PIECES_PER_TURN] = pieces
        .try_into()
        .map_err(|_| "expected exactly three pieces")?;
    bot.set_pieces(pieces);

    println!("\nCurrent board:\n{}", bot.board_as_string());
    println!("Computing best moves...");

    let sequence = bot.find_best_sequence();
    print_sequence(&sequence);

    let stats = bot.stats();
    println!("\n=== Statistics ===");
    println!("Nodes evaluated: {}", stats.nodes_evaluated);
    println!("Nodes generated: {}", stats.nodes_generated);
    println!("Time: {} ms", stats.time_ms);
    println!("Best score: {:.2}", stats.best_score);

    if sequence.is_empty() {
        println!("\nNo piece fits anywhere: game over.");
        return Ok(());
    }

    bot.apply_sequence(&sequence);
    println!("\nBoard after the sequence:\n{}", bot.board_as_string());
    println!("{}", bot.state());
    Ok(())
}

/// Plays full games with random bags until no piece fits.
fn run_auto(mut bot: Bot, games: usize, seed: Option<u64>) -> Result<(), Box<dyn Error>> {
    println!("Running {games} automatic games...");

    let mut bags = match seed {
        Some(seed) => BagGenerator::seeded(seed),
        None => BagGenerator::new(),
    };

    let progress_bar = create_progress_bar(games as u64);
    let mut total_score = 0u64;

    for game in 0..games {
        bot.new_game();
        let mut turns = 0;

        loop {
            bot.set_pieces(bags.next_bag());
            let sequence = bot.find_best_sequence();
            if sequence.is_empty() {
                break;
            }
            bot.apply_sequence(&sequence);
            turns += 1;
        }

        total_score += bot.state().score() as u64;
        progress_bar.println(format!(
            "Game {} completed: score = {}, turns = {}",
            game + 1,
            bot.state().score(),
            turns
        ));
        progress_bar.inc(1);
    }
    progress_bar.finish();

    println!("\nAverage score: {:.1}", total_score as f64 / games as f64);
    Ok(())
}

/// Reads a board: 8 rows of `./#`, or one empty line for an empty board.
fn read_board(
    lines: &mut impl Iterator<Item = io::Result<String>>,
) -> Result<Board, Box<dyn Error>> {
    prompt("Board row 1 (or blank): ")?;
    let first = next_line(lines)?;
    if first.trim().is_empty() {
        return Ok(Board::new());
    }

    let mut cells = [false; Board::CELLS];
    parse_board_row(&first, 0, &mut cells)?;
    for row in 1..Board::SIZE {
        prompt(&format!("Board row {}: ", row + 1))?;
        let line = next_line(lines)?;
        parse_board_row(&line, row, &mut cells)?;
    }
    Ok(Board::from_cells(&cells))
}

fn parse_board_row(
    line: &str,
    row: usize,
    cells: &mut [bool; Board::CELLS],
) -> Result<(), Box<dyn Error>> {
    let symbols: Vec<char> = line.trim().chars().filter(|c| !c.is_whitespace()).collect();
    if symbols.len() != Board::SIZE {
        return Err(format!("board row {} must have 8 cells", row + 1).into());
    }
    for (col, &symbol) in symbols.iter().enumerate() {
        cells[row * Board::SIZE + col] = match symbol {
            '.' | '0' => false,
            '#' | '1' | 'x' | 'X' => true,
            other => return Err(format!("unknown cell character '{other}'").into()),
        };
    }
    Ok(())
}

/// Reads one piece: a catalogue number or a semicolon-separated cell list.
fn read_piece(
    lines: &mut impl Iterator<Item = io::Result<String>>,
    index: usize,
) -> Result<Piece, Box<dyn Error>> {
    prompt(&format!("Piece {}: ", index + 1))?;
    let line = next_line(lines)?;
    let trimmed = line.trim();

    if let Ok(number) = trimmed.parse::<usize>() {
        let shape = Shape::ALL
            .get(number.wrapping_sub(1))
            .ok_or_else(|| format!("catalogue number {number} is out of range"))?;
        return Ok(shape.piece());
    }

    let mut cells = Vec::new();
    for pair in trimmed.split(';') {
        let (x, y) = pair
            .split_once(',')
            .ok_or_else(|| format!("cell '{pair}' is not 'x,y'"))?;
        cells.push(Position::new(x.trim().parse()?, y.trim().parse()?));
    }
    Ok(Piece::new(cells)?)
}

fn print_catalogue() {
    for (number, shape) in Shape::ALL.iter().enumerate() {
        println!("{:>2}. {:?}", number + 1, shape);
    }
}

fn print_sequence(sequence: &MoveSequence) {
    println!("\nBest sequence ({} moves):", sequence.pieces_placed());
    for (step, mv) in sequence.moves.iter().enumerate() {
        println!(
            "{}. piece {} at {} rotation {} (score {:.2})",
            step + 1,
            mv.piece_index + 1,
            mv.anchor,
            mv.rotation,
            mv.score
        );
    }
}

fn prompt(text: &str) -> io::Result<()> {
    print!("{text}");
    io::stdout().flush()
}

fn next_line(
    lines: &mut impl Iterator<Item = io::Result<String>>,
) -> Result<String, Box<dyn Error>> {
    Ok(lines.next().ok_or("unexpected end of input")??)
}

/// Helper function to create a styled progress bar.
fn create_progress_bar(len: u64) -> ProgressBar {
    let style = ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {human_pos}/{human_len} ({eta})"
        )
        .unwrap()
        .progress_chars("#>-");
    ProgressBar::new(len).with_style(style)
}
