//! Polyomino pieces and their cached rotation variants.

use std::fmt::{self, Display, Formatter};

use crate::{Board, GameError, Position};

/// A single orientation of a piece, with everything a placement check needs
/// precomputed: the normalised cells, the bounding box, and the cells as a
/// bitmask anchored at the board origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PieceVariant {
    cells: Vec<Position>,
    width: usize,
    height: usize,
    mask: u64,
}

impl PieceVariant {
    /// Builds a variant from raw cells by translating them so the minimum x
    /// and y are zero and sorting them into row-major order.
    fn from_cells(mut cells: Vec<Position>) -> PieceVariant {
        let min_x = cells.iter().map(|cell| cell.x).min().unwrap_or(0);
        let min_y = cells.iter().map(|cell| cell.y).min().unwrap_or(0);
        for cell in &mut cells {
            cell.x -= min_x;
            cell.y -= min_y;
        }
        cells.sort_by_key(|cell| (cell.y, cell.x));

        let width = cells.iter().map(|cell| cell.x).max().unwrap_or(0) as usize + 1;
        let height = cells.iter().map(|cell| cell.y).max().unwrap_or(0) as usize + 1;

        // The origin mask is only meaningful for shapes that fit the board;
        // `Board::can_place` rejects anything larger on bounds before the
        // mask is ever read.
        let mask = if width <= Board::SIZE && height <= Board::SIZE {
            cells.iter().fold(0u64, |mask, cell| mask | 1 << cell.index())
        } else {
            0
        };

        PieceVariant {
            cells,
            width,
            height,
            mask,
        }
    }

    /// Returns this variant rotated 90 degrees clockwise and renormalised.
    fn rotated(&self) -> PieceVariant {
        PieceVariant::from_cells(
            self.cells
                .iter()
                .map(|cell| Position::new(cell.y, -cell.x))
                .collect(),
        )
    }

    /// The variant's normalised cells in row-major order.
    pub fn cells(&self) -> &[Position] {
        &self.cells
    }

    /// The bounding-box width in cells.
    #[inline(always)]
    pub fn width(&self) -> usize {
        self.width
    }

    /// The bounding-box height in cells.
    #[inline(always)]
    pub fn height(&self) -> usize {
        self.height
    }

    /// The number of cells in the variant.
    #[inline(always)]
    pub fn size(&self) -> usize {
        self.cells.len()
    }

    /// The variant's cells as a bitmask anchored at the board origin.
    #[inline(always)]
    pub fn mask(&self) -> u64 {
        self.mask
    }
}

/// An immutable polyomino: a validated, normalised cell-set with its
/// deduplicated rotation variants cached in the order 0, 90, 180, 270 degrees.
///
/// Two pieces are equal when their sorted cell-sets are equal, regardless of
/// the order the cells were supplied in.
///
/// # Example
///
/// ```rust
/// use block_blast_ai::{Piece, Position};
///
/// // The 3-cell corner has four distinct rotations.
/// let corner = Piece::new(vec![
///     Position::new(0, 0),
///     Position::new(0, 1),
///     Position::new(1, 1),
/// ]).unwrap();
/// assert_eq!(corner.size(), 3);
/// assert_eq!(corner.rotations().len(), 4);
///
/// // A 2x2 square is rotation-invariant.
/// let square = Piece::new(vec![
///     Position::new(0, 0),
///     Position::new(1, 0),
///     Position::new(0, 1),
///     Position::new(1, 1),
/// ]).unwrap();
/// assert_eq!(square.rotations().len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Piece {
    variants: Vec<PieceVariant>,
}

impl Piece {
    /// Creates a piece from a raw cell list. The cells are normalised so the
    /// minimum x and y are both zero; the input's own offset is irrelevant.
    ///
    /// # Errors
    ///
    /// Returns `GameError::InvalidPiece` when the list is empty or contains
    /// duplicate cells.
    pub fn new(cells: Vec<Position>) -> Result<Piece, GameError> {
        if cells.is_empty() {
            return Err(GameError::InvalidPiece {
                reason: "piece has no cells".into(),
            });
        }

        let base = PieceVariant::from_cells(cells);
        if base.cells.windows(2).any(|pair| pair[0] == pair[1]) {
            return Err(GameError::InvalidPiece {
                reason: "piece has duplicate cells".into(),
            });
        }

        let rot90 = base.rotated();
        let rot180 = rot90.rotated();
        let rot270 = rot180.rotated();

        let mut variants = vec![base];
        for rotation in [rot90, rot180, rot270] {
            if !variants.contains(&rotation) {
                variants.push(rotation);
            }
        }

        Ok(Piece { variants })
    }

    /// The piece in its base, unrotated orientation.
    #[inline(always)]
    pub fn base(&self) -> &PieceVariant {
        &self.variants[0]
    }

    /// The distinct rotation variants in ascending rotation order, with any
    /// rotation equal to an earlier one omitted.
    #[inline(always)]
    pub fn rotations(&self) -> &[PieceVariant] {
        &self.variants
    }

    /// The piece's normalised cells in its base orientation.
    pub fn cells(&self) -> &[Position] {
        self.base().cells()
    }

    /// The bounding-box width of the base orientation.
    pub fn width(&self) -> usize {
        self.base().width()
    }

    /// The bounding-box height of the base orientation.
    pub fn height(&self) -> usize {
        self.base().height()
    }

    /// The number of cells in the piece.
    pub fn size(&self) -> usize {
        self.base().size()
    }
}

impl PartialEq for Piece {
    fn eq(&self, other: &Self) -> bool {
        self.variants[0] == other.variants[0]
    }
}

impl Eq for Piece {}

impl Display for Piece {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let base = self.base();
        for y in 0..base.height() as i32 {
            for x in 0..base.width() as i32 {
                let cell = if base.cells().contains(&Position::new(x, y)) {
                    '#'
                } else {
                    '.'
                };
                write!(f, "{cell}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(coords: &[(i32, i32)]) -> Vec<Position> {
        coords.iter().map(|&(x, y)| Position::new(x, y)).collect()
    }

    #[test]
    fn construction_rejects_empty_and_duplicates() {
        assert!(matches!(
            Piece::new(vec![]),
            Err(GameError::InvalidPiece { .. })
        ));
        assert!(matches!(
            Piece::new(cells(&[(0, 0), (1, 0), (0, 0)])),
            Err(GameError::InvalidPiece { .. })
        ));
    }

    #[test]
    fn construction_normalises_offsets() {
        let piece = Piece::new(cells(&[(2, 3), (3, 3)])).unwrap();
        assert_eq!(piece.cells(), cells(&[(0, 0), (1, 0)]).as_slice());
        assert_eq!(piece.width(), 2);
        assert_eq!(piece.height(), 1);
        assert_eq!(piece.base().mask(), 0b11);
    }

    #[test]
    fn negative_input_coordinates_normalise() {
        let piece = Piece::new(cells(&[(-1, -1), (0, -1)])).unwrap();
        assert_eq!(piece.cells(), cells(&[(0, 0), (1, 0)]).as_slice());
    }

    #[test]
    fn rotation_counts_per_symmetry() {
        // Corner tromino: all four rotations distinct.
        assert_eq!(
            Piece::new(cells(&[(0, 0), (0, 1), (1, 1)]))
                .unwrap()
                .rotations()
                .len(),
            4
        );
        // 2x2 square: fully symmetric.
        assert_eq!(
            Piece::new(cells(&[(0, 0), (1, 0), (0, 1), (1, 1)]))
                .unwrap()
                .rotations()
                .len(),
            1
        );
        // Bars and zigzags: 180-degree symmetric.
        assert_eq!(
            Piece::new(cells(&[(0, 0), (1, 0)])).unwrap().rotations().len(),
            2
        );
        assert_eq!(
            Piece::new(cells(&[(0, 0), (1, 0), (1, 1), (2, 1)]))
                .unwrap()
                .rotations()
                .len(),
            2
        );
        // T tetromino: four distinct rotations.
        assert_eq!(
            Piece::new(cells(&[(0, 0), (1, 0), (2, 0), (1, 1)]))
                .unwrap()
                .rotations()
                .len(),
            4
        );
        // Plus pentomino: fully symmetric.
        assert_eq!(
            Piece::new(cells(&[(1, 0), (0, 1), (1, 1), (2, 1), (1, 2)]))
                .unwrap()
                .rotations()
                .len(),
            1
        );
    }

    #[test]
    fn rotations_preserve_cell_count() {
        for coords in [
            vec![(0, 0)],
            vec![(0, 0), (1, 0), (2, 0), (3, 0), (4, 0)],
            vec![(0, 0), (0, 1), (0, 2), (1, 2)],
            vec![(1, 0), (0, 1), (1, 1), (2, 1), (1, 2)],
        ] {
            let piece = Piece::new(cells(&coords)).unwrap();
            for variant in piece.rotations() {
                assert_eq!(variant.size(), piece.size());
            }
        }
    }

    #[test]
    fn four_quarter_turns_are_identity() {
        let original = Piece::new(cells(&[(0, 0), (0, 1), (0, 2), (1, 2)])).unwrap();

        let mut coords: Vec<Position> = original.cells().to_vec();
        for _ in 0..4 {
            coords = coords
                .iter()
                .map(|cell| Position::new(cell.y, -cell.x))
                .collect();
        }
        let rotated = Piece::new(coords).unwrap();

        assert_eq!(rotated, original);
    }

    #[test]
    fn equality_ignores_cell_order() {
        let a = Piece::new(cells(&[(0, 0), (1, 0), (1, 1)])).unwrap();
        let b = Piece::new(cells(&[(1, 1), (0, 0), (1, 0)])).unwrap();
        assert_eq!(a, b);

        let c = Piece::new(cells(&[(0, 0), (1, 0), (0, 1)])).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn oversized_pieces_are_constructible_but_unplaceable() {
        let coords: Vec<(i32, i32)> = (0..9).map(|x| (x, 0)).collect();
        let bar9 = Piece::new(cells(&coords)).unwrap();
        assert_eq!(bar9.width(), 9);
        assert!(crate::Board::new().valid_positions(bar9.base()).is_empty());
    }
}
