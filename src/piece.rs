//! Active falling piece logic

use crate::grid::{GRID_HEIGHT, GRID_WIDTH, Grid};
use crate::tetromino::TetrominoType;
use ratatui::style::Color;

/// A rectangular occupancy matrix, stored row-major, row 0 on top
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape {
    width: usize,
    height: usize,
    cells: Vec<bool>,
}

impl Shape {
    /// Build a shape from rows of occupancy flags.
    ///
    /// Panics if there are no rows, no columns, or the rows differ in length.
    pub fn new(rows: Vec<Vec<bool>>) -> Self {
        assert!(!rows.is_empty(), "shape must have at least one row");
        let width = rows[0].len();
        assert!(width > 0, "shape must have at least one column");
        assert!(
            rows.iter().all(|row| row.len() == width),
            "shape rows must all have the same length"
        );

        Self {
            width,
            height: rows.len(),
            cells: rows.into_iter().flatten().collect(),
        }
    }

    /// Build a shape from a `0`/`1` matrix
    pub fn from_matrix(matrix: &[&[u8]]) -> Self {
        Self::new(
            matrix
                .iter()
                .map(|row| row.iter().map(|&c| c != 0).collect())
                .collect(),
        )
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Whether the cell at (col, row) is occupied
    pub fn is_filled(&self, col: usize, row: usize) -> bool {
        col < self.width && row < self.height && self.cells[row * self.width + col]
    }

    /// Occupied cells as (col, row) offsets from the top-left corner
    pub fn blocks(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let width = self.width;
        self.cells
            .iter()
            .enumerate()
            .filter(|&(_, &filled)| filled)
            .map(move |(i, _)| (i % width, i / width))
    }

    /// Quarter turn: reverse the row order, then transpose.
    ///
    /// `new[i][j] = old[height - 1 - j][i]`; the result is `height` wide and
    /// `width` tall.
    pub fn rotated(&self) -> Shape {
        let (old_w, old_h) = (self.width, self.height);
        let mut cells = Vec::with_capacity(self.cells.len());
        for i in 0..old_w {
            for j in 0..old_h {
                cells.push(self.cells[(old_h - 1 - j) * old_w + i]);
            }
        }
        Shape {
            width: old_h,
            height: old_w,
            cells,
        }
    }
}

/// An active (or preview) piece
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    /// Archetype this piece was spawned from
    pub kind: TetrominoType,
    shape: Shape,
    color: Color,
    /// Top-left anchor, column
    pub x: i32,
    /// Top-left anchor, row (0 is the top of the grid)
    pub y: i32,
}

impl Piece {
    /// Create a new piece at its spawn position
    pub fn new(kind: TetrominoType) -> Self {
        Self::with_shape(kind, Shape::from_matrix(kind.matrix()), kind.color())
    }

    /// Create a piece with an explicit shape and colour at the spawn position
    pub fn with_shape(kind: TetrominoType, shape: Shape, color: Color) -> Self {
        let x = (GRID_WIDTH / 2) as i32 - (shape.width() / 2) as i32;
        Self {
            kind,
            shape,
            color,
            x,
            y: 0,
        }
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn color(&self) -> Color {
        self.color
    }

    /// Absolute grid positions (x, y) of every occupied cell
    pub fn block_positions(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        let (x, y) = (self.x, self.y);
        self.shape
            .blocks()
            .map(move |(col, row)| (x + col as i32, y + row as i32))
    }

    /// Check whether the piece would fit if translated by (dx, dy).
    ///
    /// Cells above the top edge only need to be inside the side walls.
    pub fn is_valid_at(&self, grid: &Grid, dx: i32, dy: i32) -> bool {
        fits(&self.shape, grid, self.x + dx, self.y + dy)
    }

    /// Translate by (dx, dy) if the target position is valid
    pub fn try_move(&mut self, grid: &Grid, dx: i32, dy: i32) -> bool {
        if self.is_valid_at(grid, dx, dy) {
            self.x += dx;
            self.y += dy;
            true
        } else {
            false
        }
    }

    /// Try a quarter turn in place, with no wall kicks.
    ///
    /// Returns whether the rotation was applied.
    pub fn rotate(&mut self, grid: &Grid) -> bool {
        let candidate = self.shape.rotated();
        if fits(&candidate, grid, self.x, self.y) {
            self.shape = candidate;
            true
        } else {
            false
        }
    }

    /// Write this piece into the grid at its current position
    pub fn lock_into(&self, grid: &mut Grid) {
        grid.fill(self.block_positions(), self.color);
    }
}

fn fits(shape: &Shape, grid: &Grid, x: i32, y: i32) -> bool {
    shape.blocks().all(|(col, row)| {
        let gx = x + col as i32;
        let gy = y + row as i32;
        if gx < 0 || gx >= GRID_WIDTH as i32 || gy >= GRID_HEIGHT as i32 {
            return false;
        }
        !(gy >= 0 && grid.is_occupied(gx, gy))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Cell;

    #[test]
    fn test_spawn_position() {
        // x = 10/2 - width/2
        assert_eq!(Piece::new(TetrominoType::I).x, 3);
        assert_eq!(Piece::new(TetrominoType::T).x, 4);
        assert_eq!(Piece::new(TetrominoType::O).x, 4);
        assert_eq!(Piece::new(TetrominoType::O).y, 0);
    }

    #[test]
    #[should_panic]
    fn test_empty_shape_panics() {
        Shape::new(Vec::new());
    }

    #[test]
    #[should_panic]
    fn test_ragged_shape_panics() {
        Shape::new(vec![vec![true, true], vec![true]]);
    }

    #[test]
    fn test_rotated_matrix() {
        // LLL      .L
        // ..L  ->  .L
        //          LL
        let shape = Shape::from_matrix(TetrominoType::L.matrix());
        let rotated = shape.rotated();
        assert_eq!(rotated, Shape::from_matrix(&[&[0, 1], &[0, 1], &[1, 1]]));
    }

    #[test]
    fn test_four_rotations_restore_shape() {
        let grid = Grid::new();
        for kind in TetrominoType::all() {
            let mut piece = Piece::new(kind);
            piece.y = 5;
            let original = piece.shape().clone();
            for _ in 0..4 {
                assert!(piece.rotate(&grid), "{} should rotate freely", kind.name());
            }
            assert_eq!(piece.shape(), &original);
        }
    }

    #[test]
    fn test_rotation_blocked_by_wall() {
        let grid = Grid::new();
        let mut piece = Piece::new(TetrominoType::I);
        piece.y = 5;
        assert!(piece.rotate(&grid));
        // Vertical bar pushed against the right wall cannot turn flat
        while piece.try_move(&grid, 1, 0) {}
        let before = piece.clone();
        assert!(!piece.rotate(&grid));
        assert_eq!(piece, before);
    }

    #[test]
    fn test_rotation_blocked_by_settled_block() {
        let mut grid = Grid::new();
        let mut piece = Piece::new(TetrominoType::T);
        piece.y = 10;
        // T at (4,10) turns into .T / TT / .T, whose tail lands on (5,12)
        grid.set(5, 12, Cell::Filled(Color::Red));
        let before = piece.shape().clone();
        assert!(!piece.rotate(&grid));
        assert_eq!(piece.shape(), &before);
    }

    #[test]
    fn test_move_left_right_walls() {
        let grid = Grid::new();
        let mut piece = Piece::new(TetrominoType::O);
        let mut steps = 0;
        while piece.try_move(&grid, -1, 0) {
            steps += 1;
        }
        assert_eq!(steps, 4);
        assert_eq!(piece.x, 0);
        while piece.try_move(&grid, 1, 0) {}
        assert_eq!(piece.x, (GRID_WIDTH - 2) as i32);
    }

    #[test]
    fn test_valid_after_successful_move() {
        let mut grid = Grid::new();
        grid.set(2, 10, Cell::Filled(Color::Red));
        grid.set(7, 15, Cell::Filled(Color::Red));
        for kind in TetrominoType::all() {
            let mut piece = Piece::new(kind);
            for (dx, dy) in [(-1, 0), (0, 1), (1, 0), (0, 1), (-1, 1), (1, 1)]
                .into_iter()
                .cycle()
                .take(60)
            {
                if piece.try_move(&grid, dx, dy) {
                    assert!(piece.is_valid_at(&grid, 0, 0));
                }
            }
        }
    }

    #[test]
    fn test_above_top_only_checks_walls() {
        let mut grid = Grid::new();
        for x in 0..GRID_WIDTH as i32 {
            grid.set(x, 0, Cell::Filled(Color::Red));
        }
        let piece = Piece::new(TetrominoType::O);
        // Fully above the grid: fine despite a full top row
        assert!(piece.is_valid_at(&grid, 0, -2));
        // Overlapping row 0 collides
        assert!(!piece.is_valid_at(&grid, 0, -1));
        // Side walls still apply above the top
        assert!(!piece.is_valid_at(&grid, -5, -2));
    }

    #[test]
    fn test_o_piece_drop_and_lock() {
        let mut grid = Grid::new();
        let mut piece = Piece::new(TetrominoType::O);
        assert_eq!((piece.x, piece.y), (4, 0));

        for _ in 0..18 {
            assert!(piece.try_move(&grid, 0, 1));
        }
        assert_eq!(piece.y, 18);
        assert!(!piece.try_move(&grid, 0, 1));
        assert_eq!(piece.y, 18);

        piece.lock_into(&mut grid);
        let color = TetrominoType::O.color();
        for (x, y) in [(4, 18), (5, 18), (4, 19), (5, 19)] {
            assert_eq!(grid.get(x, y), Some(Cell::Filled(color)));
        }
        assert_eq!(grid.rows().flatten().filter(|c| c.is_filled()).count(), 4);
    }
}
