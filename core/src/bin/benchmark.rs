//! Script to benchmark the beam-search solver against the greedy baseline.
//!
//! The script plays a rolling game with randomly drawn bags: each turn both
//! solvers are asked for a sequence from the same state, their timings and
//! node counts are recorded, and the beam solver's sequence is applied to
//! carry the game forward. Run with an optional turn count and seed:
//!
//! ```comment
//! cargo run --release --bin benchmark -- [turns] [seed]
//! ```

use block_blast_ai::{BagGenerator, Evaluator, GameState, GreedySolver, Solver, SolverConfig};
use indicatif::{ProgressBar, ProgressStyle};
use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::time::{Duration, Instant};
use std::env;

const DEFAULT_TURNS: usize = 200;
const DEFAULT_SEED: u64 = 1;

/// Stores the aggregated results from a benchmark run.
#[derive(Default)]
struct BenchmarkResults {
    turns: usize,
    dead_turns: usize,
    beam_duration: Duration,
    greedy_duration: Duration,
    nodes_evaluated: usize,
    nodes_generated: usize,
    beam_wins: usize,
    greedy_wins: usize,
    draws: usize,
}

impl BenchmarkResults {
    /// Updates the results with data from a single turn.
    fn update(&mut self, beam_score: f32, greedy_score: f32, stats_time: Duration,
              greedy_time: Duration, evaluated: usize, generated: usize) {
        self.turns += 1;
        self.beam_duration += stats_time;
        self.greedy_duration += greedy_time;
        self.nodes_evaluated += evaluated;
        self.nodes_generated += generated;

        if beam_score > greedy_score {
            self.beam_wins += 1;
        } else if greedy_score > beam_score {
            self.greedy_wins += 1;
        } else {
            self.draws += 1;
        }
    }
}

/// Implements a clean, readable display format for the results.
impl Display for BenchmarkResults {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "\n--- Benchmark Results ---")?;
        writeln!(f, "Turns solved: {} ({} dead)", self.turns, self.dead_turns)?;

        if self.turns > 0 {
            let mean_beam = self.beam_duration / self.turns as u32;
            let mean_greedy = self.greedy_duration / self.turns as u32;
            let mean_evaluated = self.nodes_evaluated as f64 / self.turns as f64;
            let k_nodes_per_sec =
                self.nodes_evaluated as f64 / self.beam_duration.as_secs_f64() / 1000.0;

            writeln!(f, "Mean beam time per turn: {mean_beam:?}")?;
            writeln!(f, "Mean greedy time per turn: {mean_greedy:?}")?;
            writeln!(f, "Mean nodes evaluated: {mean_evaluated:.0}")?;
            writeln!(f, "Beam speed: {k_nodes_per_sec:.2} knodes/s")?;
        }

        writeln!(
            f,
            "Positions where beam beat greedy: {} / {} ({} draws)",
            self.beam_wins, self.turns, self.draws
        )
    }
}

/// Main entrypoint for the benchmark binary.
fn main() -> Result<(), Box<dyn Error>> {
    let turns = match env::args().nth(1) {
        Some(arg) => arg.parse::<usize>()?,
        None => DEFAULT_TURNS,
    };
    let seed = match env::args().nth(2) {
        Some(arg) => arg.parse::<u64>()?,
        None => DEFAULT_SEED,
    };

    println!("Benchmarking {turns} turns with seed {seed}...");
    let results = run_benchmark(turns, seed)?;
    println!("{results}");

    Ok(())
}

/// Plays `turns` rolling turns, solving each with both solvers.
fn run_benchmark(turns: usize, seed: u64) -> Result<BenchmarkResults, Box<dyn Error>> {
    let mut results = BenchmarkResults::default();

    let config = SolverConfig::default();
    let mut beam = Solver::new(config)?;
    let greedy = GreedySolver::new(config.weights);
    let evaluator = Evaluator::new(config.weights);

    let mut bags = BagGenerator::seeded(seed);
    let mut state = GameState::new();

    let progress_bar = create_progress_bar(turns as u64);

    for _ in 0..turns {
        progress_bar.inc(1);
        state.set_pieces(bags.next_bag());

        let start = Instant::now();
        let sequence = beam.find_best_sequence(&state);
        let beam_time = start.elapsed();

        if sequence.is_empty() {
            // Dead board: nothing in the bag fits anywhere. Start over.
            results.dead_turns += 1;
            state.reset();
            continue;
        }

        let mut greedy_state = state.clone();
        let start = Instant::now();
        greedy.solve(&mut greedy_state);
        let greedy_time = start.elapsed();

        // Compare the states each solver would leave behind.
        let mut beam_state = state.clone();
        for mv in &sequence.moves {
            beam_state.apply(mv)?;
        }
        let beam_score = evaluator.evaluate(&beam_state);
        let greedy_score = evaluator.evaluate(&greedy_state);

        let stats = beam.stats();
        results.update(
            beam_score,
            greedy_score,
            beam_time,
            greedy_time,
            stats.nodes_evaluated,
            stats.nodes_generated,
        );

        state = beam_state;
    }
    progress_bar.finish();

    Ok(results)
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
