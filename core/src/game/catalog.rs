//! The catalogue of concrete Block Blast piece shapes.
//!
//! The engine itself treats pieces opaquely through their cell-sets; this
//! module is the free-standing factory that front-ends and simulations use
//! to build the well-known shapes and draw random bags.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::{Piece, Position, PIECES_PER_TURN};

/// Identifies the predefined piece shapes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Shape {
    /// 1x1.
    Single,
    /// 2x1 bar.
    Bar2,
    /// 3x1 bar.
    Bar3,
    /// 4x1 bar.
    Bar4,
    /// 5x1 bar.
    Bar5,
    /// 2x2 square.
    Square2,
    /// 3x3 square.
    Square3,
    /// Small 3-cell L.
    SmallL,
    /// Large 4-cell L.
    LargeL,
    /// T tetromino.
    Tee,
    /// Z tetromino.
    Zig,
    /// Plus pentomino.
    Plus,
    /// 3-cell corner.
    Corner,
}

impl Shape {
    /// Every catalogued shape.
    pub const ALL: [Shape; 13] = [
        Shape::Single,
        Shape::Bar2,
        Shape::Bar3,
        Shape::Bar4,
        Shape::Bar5,
        Shape::Square2,
        Shape::Square3,
        Shape::SmallL,
        Shape::LargeL,
        Shape::Tee,
        Shape::Zig,
        Shape::Plus,
        Shape::Corner,
    ];

    /// The shape's cells in its base orientation.
    pub fn cells(&self) -> Vec<Position> {
        let coords: &[(i32, i32)] = match self {
            Shape::Single => &[(0, 0)],
            Shape::Bar2 => &[(0, 0), (1, 0)],
            Shape::Bar3 => &[(0, 0), (1, 0), (2, 0)],
            Shape::Bar4 => &[(0, 0), (1, 0), (2, 0), (3, 0)],
            Shape::Bar5 => &[(0, 0), (1, 0), (2, 0), (3, 0), (4, 0)],
            Shape::Square2 => &[(0, 0), (1, 0), (0, 1), (1, 1)],
            Shape::Square3 => &[
                (0, 0),
                (1, 0),
                (2, 0),
                (0, 1),
                (1, 1),
                (2, 1),
                (0, 2),
                (1, 2),
                (2, 2),
            ],
            Shape::SmallL => &[(0, 0), (0, 1), (1, 1)],
            Shape::LargeL => &[(0, 0), (0, 1), (0, 2), (1, 2)],
            Shape::Tee => &[(0, 0), (1, 0), (2, 0), (1, 1)],
            Shape::Zig => &[(0, 0), (1, 0), (1, 1), (2, 1)],
            Shape::Plus => &[(1, 0), (0, 1), (1, 1), (2, 1), (1, 2)],
            Shape::Corner => &[(0, 0), (1, 0), (0, 1)],
        };
        coords.iter().map(|&(x, y)| Position::new(x, y)).collect()
    }

    /// Constructs the piece for this shape.
    pub fn piece(&self) -> Piece {
        Piece::new(self.cells()).expect("catalogued shapes are valid pieces")
    }
}

/// A seedable source of random catalogued pieces and three-piece bags.
///
/// Randomness is owned by the generator instance; there is no process-wide
/// RNG state, so simulations with a fixed seed replay exactly.
#[derive(Debug, Clone)]
pub struct BagGenerator {
    rng: StdRng,
}

impl BagGenerator {
    /// Creates a generator seeded from the operating system.
    pub fn new() -> BagGenerator {
        BagGenerator {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Creates a generator with a fixed seed for reproducible runs.
    pub fn seeded(seed: u64) -> BagGenerator {
        BagGenerator {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Draws one random catalogued piece.
    pub fn next_piece(&mut self) -> Piece {
        Shape::ALL[self.rng.random_range(0..Shape::ALL.len())].piece()
    }

    /// Draws a bag of three random pieces.
    pub fn next_bag(&mut self) -> [Piece; PIECES_PER_TURN] {
        std::array::from_fn(|_| self.next_piece())
    }
}

impl Default for BagGenerator {
    fn default() -> BagGenerator {
        BagGenerator::new()
    }
}
