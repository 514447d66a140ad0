//! A script to analyse how beam width affects full-game strength.
//!
//! For each beam width preset the script plays complete games (random bags
//! until no piece fits) and reports score and turn statistics. Games are
//! seeded per index, so every preset sees the same stream of bags. Run with
//! an optional game count and base seed:
//!
//! ```comment
//! cargo run --release --bin simulate -- [games] [seed]
//! ```

use block_blast_ai::{BagGenerator, Bot, SolverConfig};
use indicatif::{ProgressBar, ProgressStyle};
use std::env;
use std::error::Error;

const DEFAULT_GAMES: usize = 20;
const DEFAULT_SEED: u64 = 1;
const BEAM_WIDTHS: [usize; 4] = [1, 10, 25, 50];

/// Caps runaway games; a turn is three placements at most.
const MAX_TURNS: usize = 500;

fn main() -> Result<(), Box<dyn Error>> {
    let games = match env::args().nth(1) {
        Some(arg) => arg.parse::<usize>()?,
        None => DEFAULT_GAMES,
    };
    let seed = match env::args().nth(2) {
        Some(arg) => arg.parse::<u64>()?,
        None => DEFAULT_SEED,
    };

    println!("Simulating {games} games per beam width, base seed {seed}...");

    for beam_width in BEAM_WIDTHS {
        let mut config = SolverConfig::default();
        config.beam_width = beam_width;
        let mut bot = Bot::new(config)?;

        let mut scores = Vec::with_capacity(games);
        let mut turn_counts = Vec::with_capacity(games);

        let progress_bar = create_progress_bar(games as u64);
        for game in 0..games {
            progress_bar.inc(1);
            let (score, turns) = play_game(&mut bot, seed.wrapping_add(game as u64));
            scores.push(score);
            turn_counts.push(turns);
        }
        progress_bar.finish_and_clear();

        let mean_score = scores.iter().sum::<u32>() as f64 / games as f64;
        let best_score = scores.iter().max().copied().unwrap_or(0);
        let mean_turns = turn_counts.iter().sum::<usize>() as f64 / games as f64;

        println!("\n--- Beam width: {beam_width} ---");
        println!("Mean score: {mean_score:.1}");
        println!("Best score: {best_score}");
        println!("Mean turns survived: {mean_turns:.1}");
    }

    Ok(())
}

/// Plays one full game and returns its final score and turn count.
fn play_game(bot: &mut Bot, seed: u64) -> (u32, usize) {
    let mut bags = BagGenerator::seeded(seed);
    bot.new_game();

    let mut turns = 0;
    while turns < MAX_TURNS {
        bot.set_pieces(bags.next_bag());

        let sequence = bot.find_best_sequence();
        if sequence.is_empty() {
            break;
        }
        bot.apply_sequence(&sequence);
        turns += 1;
    }

    (bot.state().score(), turns)
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
