//! Playfield grid holding settled blocks

use ratatui::style::Color;

/// Playfield dimensions
pub const GRID_WIDTH: usize = 10;
pub const GRID_HEIGHT: usize = 20;

/// A cell on the grid - either empty or a settled block of some colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Filled(Color),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn is_filled(&self) -> bool {
        matches!(self, Cell::Filled(_))
    }
}

type Row = [Cell; GRID_WIDTH];

const EMPTY_ROW: Row = [Cell::Empty; GRID_WIDTH];

/// The settled-block grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    /// Stored as [row][col], row 0 is the top, row increases downward
    cells: [Row; GRID_HEIGHT],
}

impl Default for Grid {
    fn default() -> Self {
        Self::new()
    }
}

impl Grid {
    /// Create a new empty grid
    pub fn new() -> Self {
        Self {
            cells: [EMPTY_ROW; GRID_HEIGHT],
        }
    }

    fn in_bounds(x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < GRID_WIDTH && (y as usize) < GRID_HEIGHT
    }

    /// Get the cell at column `x`, row `y`
    /// Returns None if out of bounds
    pub fn get(&self, x: i32, y: i32) -> Option<Cell> {
        if !Self::in_bounds(x, y) {
            return None;
        }
        Some(self.cells[y as usize][x as usize])
    }

    /// Set the cell at column `x`, row `y`
    /// Returns false if out of bounds
    pub fn set(&mut self, x: i32, y: i32, cell: Cell) -> bool {
        if !Self::in_bounds(x, y) {
            return false;
        }
        self.cells[y as usize][x as usize] = cell;
        true
    }

    /// True iff (x, y) is in bounds and holds a settled block.
    ///
    /// Rows above the top edge (y < 0) are never occupied.
    pub fn is_occupied(&self, x: i32, y: i32) -> bool {
        self.get(x, y).is_some_and(|cell| cell.is_filled())
    }

    /// Write a colour into every listed (x, y) position
    pub fn fill(&mut self, positions: impl IntoIterator<Item = (i32, i32)>, color: Color) {
        for (x, y) in positions {
            let written = self.set(x, y, Cell::Filled(color));
            debug_assert!(written, "locked block at ({x}, {y}) lies outside the grid");
        }
    }

    /// Remove every full row, compact the rest downward and return how many
    /// rows were removed. Non-full rows keep their relative order.
    pub fn clear_full_rows(&mut self) -> usize {
        let mut write_row = GRID_HEIGHT;

        // Walk bottom-up so surviving rows only ever move down
        for read_row in (0..GRID_HEIGHT).rev() {
            if !Self::row_is_full(&self.cells[read_row]) {
                write_row -= 1;
                if write_row != read_row {
                    self.cells[write_row] = self.cells[read_row];
                }
            }
        }

        for row in &mut self.cells[..write_row] {
            *row = EMPTY_ROW;
        }

        write_row
    }

    /// Drop the bottom `n` rows regardless of their contents, shifting all
    /// rows above them down by `n` and opening `n` empty rows at the top.
    pub fn clear_bottom_rows(&mut self, n: usize) {
        let n = n.min(GRID_HEIGHT);
        if n == 0 {
            return;
        }
        self.cells.copy_within(0..GRID_HEIGHT - n, n);
        for row in &mut self.cells[..n] {
            *row = EMPTY_ROW;
        }
    }

    /// True if any of the bottom `n` rows holds a settled block
    pub fn bottom_rows_occupied(&self, n: usize) -> bool {
        let n = n.min(GRID_HEIGHT);
        self.cells[GRID_HEIGHT - n..]
            .iter()
            .any(|row| row.iter().any(|cell| cell.is_filled()))
    }

    fn row_is_full(row: &Row) -> bool {
        row.iter().all(|cell| cell.is_filled())
    }

    /// Check if the grid is completely empty
    pub fn is_empty(&self) -> bool {
        self.cells
            .iter()
            .all(|row| row.iter().all(|cell| cell.is_empty()))
    }

    /// Rows from top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[Cell; GRID_WIDTH]> {
        self.cells.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill_row(grid: &mut Grid, y: i32, color: Color) {
        for x in 0..GRID_WIDTH as i32 {
            grid.set(x, y, Cell::Filled(color));
        }
    }

    #[test]
    fn test_new_grid_is_empty() {
        let grid = Grid::new();
        assert!(grid.is_empty());
        assert_eq!(grid.rows().count(), GRID_HEIGHT);
    }

    #[test]
    fn test_set_and_get() {
        let mut grid = Grid::new();
        assert!(grid.set(3, 7, Cell::Filled(Color::Red)));
        assert_eq!(grid.get(3, 7), Some(Cell::Filled(Color::Red)));
        assert!(grid.is_occupied(3, 7));
        assert!(!grid.is_occupied(7, 3));
    }

    #[test]
    fn test_out_of_bounds() {
        let mut grid = Grid::new();
        assert_eq!(grid.get(-1, 0), None);
        assert_eq!(grid.get(0, -1), None);
        assert_eq!(grid.get(GRID_WIDTH as i32, 0), None);
        assert_eq!(grid.get(0, GRID_HEIGHT as i32), None);
        assert!(!grid.set(0, GRID_HEIGHT as i32, Cell::Filled(Color::Red)));
    }

    #[test]
    fn test_above_top_is_unoccupied() {
        let mut grid = Grid::new();
        fill_row(&mut grid, 0, Color::Cyan);
        assert!(grid.is_occupied(4, 0));
        assert!(!grid.is_occupied(4, -1));
        assert!(!grid.is_occupied(4, -5));
    }

    #[test]
    fn test_clear_single_row() {
        let mut grid = Grid::new();
        fill_row(&mut grid, 19, Color::Cyan);
        grid.set(0, 18, Cell::Filled(Color::Red));

        assert_eq!(grid.clear_full_rows(), 1);
        // The block from row 18 drops onto row 19
        assert_eq!(grid.get(0, 19), Some(Cell::Filled(Color::Red)));
        assert!(grid.get(0, 18).unwrap().is_empty());
        assert_eq!(grid.rows().count(), GRID_HEIGHT);
    }

    #[test]
    fn test_clear_keeps_order_of_surviving_rows() {
        let mut grid = Grid::new();
        grid.set(0, 14, Cell::Filled(Color::Red));
        fill_row(&mut grid, 15, Color::Cyan);
        grid.set(1, 16, Cell::Filled(Color::Green));
        fill_row(&mut grid, 17, Color::Cyan);
        grid.set(2, 18, Cell::Filled(Color::Blue));
        fill_row(&mut grid, 19, Color::Cyan);

        assert_eq!(grid.clear_full_rows(), 3);
        assert_eq!(grid.get(2, 19), Some(Cell::Filled(Color::Blue)));
        assert_eq!(grid.get(1, 18), Some(Cell::Filled(Color::Green)));
        assert_eq!(grid.get(0, 17), Some(Cell::Filled(Color::Red)));
        assert!(grid.rows().take(17).all(|row| row.iter().all(Cell::is_empty)));
    }

    #[test]
    fn test_clear_nothing() {
        let mut grid = Grid::new();
        grid.set(5, 19, Cell::Filled(Color::Red));
        let before = grid.clone();
        assert_eq!(grid.clear_full_rows(), 0);
        assert_eq!(grid, before);
    }

    #[test]
    fn test_clear_bottom_rows_ignores_fullness() {
        let mut grid = Grid::new();
        grid.set(0, 16, Cell::Filled(Color::Red));
        grid.set(1, 17, Cell::Filled(Color::Green));
        grid.set(2, 19, Cell::Filled(Color::Blue));

        assert!(grid.bottom_rows_occupied(3));
        grid.clear_bottom_rows(3);

        // Row 16 moves down to row 19; rows 17..19 are gone
        assert_eq!(grid.get(0, 19), Some(Cell::Filled(Color::Red)));
        assert!(!grid.is_occupied(1, 19));
        assert!(!grid.is_occupied(2, 19));
        assert_eq!(grid.rows().flatten().filter(|c| c.is_filled()).count(), 1);
        assert!(!grid.bottom_rows_occupied(0));
    }

    #[test]
    fn test_clear_bottom_rows_shifts_whole_stack() {
        let mut grid = Grid::new();
        for y in 10..GRID_HEIGHT as i32 {
            grid.set(y % GRID_WIDTH as i32, y, Cell::Filled(Color::Yellow));
        }
        grid.clear_bottom_rows(3);
        for y in 10..(GRID_HEIGHT as i32 - 3) {
            assert!(grid.is_occupied(y % GRID_WIDTH as i32, y + 3));
        }
        assert!(grid.rows().take(13).all(|row| row.iter().all(Cell::is_empty)));
    }

    #[test]
    fn test_bottom_rows_occupied() {
        let mut grid = Grid::new();
        grid.set(4, 16, Cell::Filled(Color::Red));
        assert!(!grid.bottom_rows_occupied(3));
        grid.set(4, 17, Cell::Filled(Color::Red));
        assert!(grid.bottom_rows_occupied(3));
    }
}
