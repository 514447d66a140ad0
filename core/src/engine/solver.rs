//! Beam search over ordered move sequences.

use std::cmp::Ordering;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
    Evaluator, GameError, GameState, Move, MoveGenerator, MoveSequence, ScoringWeights,
    PIECES_PER_TURN,
};

/// Configuration for the beam-search solver.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Number of frontier nodes retained after each depth expansion.
    pub beam_width: usize,
    /// Maximum sequence length searched; at most the pieces per turn, since
    /// deeper search has nothing left to place.
    pub max_depth: usize,
    /// Relative pruning cutoff in [0, 1]: after each expansion, children
    /// scoring below `max - pruning_threshold * |max|` are dropped before
    /// the beam cut.
    pub pruning_threshold: f32,
    /// Whether to expand frontier nodes and score candidate moves in
    /// parallel.
    pub use_parallel: bool,
    /// Worker threads for parallel expansion; 0 uses the global pool.
    pub num_threads: usize,
    /// Evaluator weights.
    pub weights: ScoringWeights,
}

impl Default for SolverConfig {
    fn default() -> SolverConfig {
        SolverConfig {
            beam_width: 50,
            max_depth: PIECES_PER_TURN,
            pruning_threshold: 0.3,
            use_parallel: true,
            num_threads: 0,
            weights: ScoringWeights::default(),
        }
    }
}

impl SolverConfig {
    /// Validates every field's range.
    ///
    /// # Errors
    ///
    /// Returns `GameError::InvalidConfig` when the beam width is zero, the
    /// depth is zero or exceeds the pieces per turn, or the pruning
    /// threshold lies outside [0, 1].
    pub fn validate(&self) -> Result<(), GameError> {
        if self.beam_width == 0 {
            return Err(GameError::InvalidConfig {
                reason: "beam width must be positive".into(),
            });
        }
        if self.max_depth == 0 || self.max_depth > PIECES_PER_TURN {
            return Err(GameError::InvalidConfig {
                reason: format!("max depth must be between 1 and {PIECES_PER_TURN}"),
            });
        }
        if !(0.0..=1.0).contains(&self.pruning_threshold) {
            return Err(GameError::InvalidConfig {
                reason: "pruning threshold must lie in [0, 1]".into(),
            });
        }
        Ok(())
    }
}

/// Counters describing a single solver call.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct SearchStats {
    /// Number of states scored by the evaluator.
    pub nodes_evaluated: usize,
    /// Number of child nodes emitted during expansion.
    pub nodes_generated: usize,
    /// Wall-clock duration of the call in milliseconds.
    pub time_ms: u64,
    /// The evaluator score of the returned sequence's final state.
    pub best_score: f32,
}

/// A frontier entry: a reached state and the sequence that produced it.
#[derive(Debug, Clone)]
struct SearchNode {
    state: GameState,
    sequence: MoveSequence,
    score: f32,
    depth: usize,
}

/// Picks move sequences by breadth-limited best-first search.
///
/// Each depth expands every frontier node with every legal move of every
/// unused piece, scores the children with the evaluator, prunes the weakest
/// relative to the depth's best, and keeps the top `beam_width`. The final
/// result is deterministic for a fixed configuration regardless of
/// parallelism: children are generated in a total order (frontier order,
/// then piece index, rotation index, anchor index) and ties in the stable
/// sort resolve to the first-encountered node.
pub struct Solver {
    config: SolverConfig,
    evaluator: Evaluator,
    move_generator: MoveGenerator,
    stats: SearchStats,
    thread_pool: Option<rayon::ThreadPool>,
}

impl Solver {
    /// Frontier sizes above this expand in parallel.
    const PARALLEL_FRONTIER: usize = 5;
    /// Candidate-move counts above this score in parallel.
    const PARALLEL_MOVES: usize = 10;

    /// Creates a solver from a configuration.
    ///
    /// # Errors
    ///
    /// Returns `GameError::InvalidConfig` when the configuration fails
    /// validation or a dedicated thread pool cannot be built.
    pub fn new(config: SolverConfig) -> Result<Solver, GameError> {
        config.validate()?;

        let thread_pool = if config.use_parallel && config.num_threads > 0 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(config.num_threads)
                .build()
                .map_err(|e| GameError::InvalidConfig {
                    reason: e.to_string(),
                })?;
            Some(pool)
        } else {
            None
        };

        Ok(Solver {
            config,
            evaluator: Evaluator::new(config.weights),
            move_generator: MoveGenerator::new(),
            stats: SearchStats::default(),
            thread_pool,
        })
    }

    /// The active configuration.
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Replaces the configuration, revalidating it.
    ///
    /// # Errors
    ///
    /// Returns `GameError::InvalidConfig` exactly as `Solver::new` does.
    pub fn set_config(&mut self, config: SolverConfig) -> Result<(), GameError> {
        *self = Solver::new(config)?;
        Ok(())
    }

    /// Replaces the evaluator weights without touching the rest of the
    /// configuration.
    pub fn set_weights(&mut self, weights: ScoringWeights) {
        self.config.weights = weights;
        self.evaluator.set_weights(weights);
    }

    /// Counters for the most recent `find_best_sequence` call.
    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// Finds the best ordered sequence of up to three moves for the state.
    ///
    /// Returns an empty sequence when no piece can be placed at all; a turn
    /// with no legal move is game over, not an error. Statistics are reset
    /// at the start of every call.
    pub fn find_best_sequence(&mut self, state: &GameState) -> MoveSequence {
        let start = Instant::now();
        self.stats = SearchStats::default();

        let beam = self.beam_search(state);

        self.stats.time_ms = start.elapsed().as_millis() as u64;
        match beam.into_iter().next() {
            Some(best) => {
                self.stats.best_score = best.score;
                best.sequence
            }
            None => MoveSequence::new(),
        }
    }

    /// Finds the best single move for one piece slot by scoring every legal
    /// placement of that piece, or `None` when the slot cannot be played.
    /// Ties resolve to the earliest generated move regardless of worker
    /// completion order.
    pub fn find_best_move(&self, state: &GameState, piece_index: usize) -> Option<Move> {
        if piece_index >= PIECES_PER_TURN || state.is_piece_used(piece_index) {
            return None;
        }
        let piece = state.piece(piece_index)?;
        let moves = self
            .move_generator
            .generate_moves(state.board(), piece, piece_index);
        if moves.is_empty() {
            return None;
        }

        let score_move = |mv: &Move| -> Option<f32> {
            let mut candidate = state.clone();
            candidate.apply(mv).ok()?;
            Some(self.evaluator.evaluate(&candidate))
        };

        let scores: Vec<Option<f32>> =
            if self.config.use_parallel && moves.len() > Self::PARALLEL_MOVES {
                self.install(|| moves.par_iter().map(score_move).collect())
            } else {
                moves.iter().map(score_move).collect()
            };

        let mut best: Option<(usize, f32)> = None;
        for (index, score) in scores.into_iter().enumerate() {
            let Some(score) = score else { continue };
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((index, score));
            }
        }

        best.map(|(index, score)| {
            let mut mv = moves[index];
            mv.score = score;
            mv
        })
    }

    /// Runs the search at increasing depths within a wall-clock budget and
    /// returns the best sequence found. The budget is polled between
    /// depths; a depth that has started is allowed to finish.
    ///
    /// Sequences of different lengths are not score-comparable (shallow
    /// states still carry unplaced pieces in their survival term), so a
    /// deeper result supersedes a shallower one and scores only break ties
    /// between equal lengths.
    pub fn solve_iterative_deepening(
        &mut self,
        state: &GameState,
        budget: Duration,
    ) -> MoveSequence {
        let start = Instant::now();
        let target_depth = self.config.max_depth;

        let mut best = MoveSequence::new();
        let mut best_score = f32::NEG_INFINITY;

        for depth in 1..=target_depth {
            if start.elapsed() >= budget {
                break;
            }
            self.config.max_depth = depth;
            let sequence = self.find_best_sequence(state);
            if sequence.pieces_placed() > best.pieces_placed()
                || (sequence.pieces_placed() == best.pieces_placed()
                    && sequence.total_score > best_score)
            {
                best_score = sequence.total_score;
                best = sequence;
            }
        }

        self.config.max_depth = target_depth;
        best
    }

    /// Runs the beam to the configured depth and returns the final frontier
    /// sorted best-first.
    fn beam_search(&mut self, initial_state: &GameState) -> Vec<SearchNode> {
        let root = SearchNode {
            state: initial_state.clone(),
            sequence: MoveSequence::new(),
            score: self.evaluator.evaluate(initial_state),
            depth: 0,
        };
        self.stats.nodes_evaluated += 1;
        let mut beam = vec![root];

        for _ in 0..self.config.max_depth {
            let expansions: Vec<Vec<SearchNode>> =
                if self.config.use_parallel && beam.len() > Self::PARALLEL_FRONTIER {
                    self.install(|| {
                        beam.par_iter()
                            .map(|node| self.expand_or_carry(node))
                            .collect()
                    })
                } else {
                    beam.iter().map(|node| self.expand_or_carry(node)).collect()
                };

            // Counters are reduced here, at the join point, so their totals
            // stay deterministic under parallel expansion.
            let mut next_beam = Vec::new();
            for (node, children) in beam.iter().zip(expansions) {
                if node.state.remaining_pieces() > 0 {
                    self.stats.nodes_generated += children.len();
                    self.stats.nodes_evaluated += children.len();
                }
                next_beam.extend(children);
            }

            Self::prune(&mut next_beam, self.config.pruning_threshold);

            // Stable sort: equal scores keep generation order, so the
            // outcome is independent of worker scheduling.
            next_beam.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
            next_beam.truncate(self.config.beam_width);

            beam = next_beam;
            if beam.is_empty() {
                break;
            }
        }

        beam
    }

    /// Expands a node into scored children, or carries it forward unchanged
    /// when its bag is exhausted.
    fn expand_or_carry(&self, node: &SearchNode) -> Vec<SearchNode> {
        if node.state.remaining_pieces() == 0 {
            return vec![node.clone()];
        }

        let mut children = Vec::new();
        for index in 0..PIECES_PER_TURN {
            if node.state.is_piece_used(index) {
                continue;
            }
            let Some(piece) = node.state.piece(index) else {
                continue;
            };
            for mut mv in self
                .move_generator
                .generate_moves(node.state.board(), piece, index)
            {
                let mut state = node.state.clone();
                if state.apply(&mv).is_err() {
                    continue;
                }

                let score = self.evaluator.evaluate(&state);
                mv.score = score;

                let mut sequence = node.sequence.clone();
                sequence.push(mv);
                sequence.total_score = score;

                children.push(SearchNode {
                    state,
                    sequence,
                    score,
                    depth: node.depth + 1,
                });
            }
        }
        children
    }

    /// Drops nodes scoring below `max - threshold * |max|`. Anchoring the
    /// cutoff on the signed distance from the maximum keeps the rule
    /// monotone when every score is negative.
    fn prune(nodes: &mut Vec<SearchNode>, threshold: f32) {
        let Some(max) = nodes.iter().map(|node| node.score).reduce(f32::max) else {
            return;
        };
        let cutoff = max - threshold * max.abs();
        nodes.retain(|node| node.score >= cutoff);
    }

    /// Runs an operation on the dedicated thread pool when one was built,
    /// or inline on the global pool otherwise.
    fn install<R: Send>(&self, op: impl FnOnce() -> R + Send) -> R {
        match &self.thread_pool {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }
}

impl Default for Solver {
    fn default() -> Solver {
        Solver {
            config: SolverConfig::default(),
            evaluator: Evaluator::default(),
            move_generator: MoveGenerator::new(),
            stats: SearchStats::default(),
            thread_pool: None,
        }
    }
}
