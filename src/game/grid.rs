//! Grid Model and Match Detector
//!
//! The board is a fixed-size, row-major array of tile colors.
//! Row 0 is the top row; tiles fall toward higher row indices.

use std::fmt;
use serde::{Serialize, Deserialize};
use thiserror::Error;
use tracing::warn;

use crate::core::rng::DeterministicRng;
use crate::core::vec2::Vec2;

// =============================================================================
// TILE COLOR
// =============================================================================

/// Color of a single cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
#[derive(Default)]
pub enum TileColor {
    /// Result of an invalid or out-of-range query
    #[default]
    NoColor = 0,
    Red = 1,
    Green = 2,
    Blue = 3,
    Purple = 4,
    Yellow = 5,
    /// Cell removed by a match, waiting for its column to collapse
    Destroyed = 6,
}

impl TileColor {
    /// The five colors a live tile can have.
    pub const PLAYABLE: [TileColor; 5] = [
        TileColor::Red,
        TileColor::Green,
        TileColor::Blue,
        TileColor::Purple,
        TileColor::Yellow,
    ];

    /// True for the five live tile colors.
    #[inline]
    pub fn is_playable(self) -> bool {
        !matches!(self, TileColor::NoColor | TileColor::Destroyed)
    }

    /// Single-character glyph used by `Grid`'s text layout.
    pub fn glyph(self) -> char {
        match self {
            TileColor::NoColor => '?',
            TileColor::Red => 'R',
            TileColor::Green => 'G',
            TileColor::Blue => 'B',
            TileColor::Purple => 'P',
            TileColor::Yellow => 'Y',
            TileColor::Destroyed => '.',
        }
    }

    /// Inverse of [`TileColor::glyph`].
    pub fn from_glyph(glyph: char) -> Option<TileColor> {
        match glyph {
            '?' => Some(TileColor::NoColor),
            'R' => Some(TileColor::Red),
            'G' => Some(TileColor::Green),
            'B' => Some(TileColor::Blue),
            'P' => Some(TileColor::Purple),
            'Y' => Some(TileColor::Yellow),
            '.' => Some(TileColor::Destroyed),
            _ => None,
        }
    }
}

// =============================================================================
// TILE POSITION
// =============================================================================

/// Zero-indexed cell coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TilePos {
    /// Row, top to bottom
    pub row: usize,
    /// Column, left to right
    pub column: usize,
}

impl TilePos {
    /// Create a new position.
    #[inline]
    pub const fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }

    /// True when `other` is exactly one step away along a single axis.
    #[inline]
    pub fn is_adjacent(self, other: TilePos) -> bool {
        let dr = self.row.abs_diff(other.row);
        let dc = self.column.abs_diff(other.column);
        dr + dc == 1
    }
}

impl fmt::Display for TilePos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.column)
    }
}

// =============================================================================
// ERRORS
// =============================================================================

/// Errors raised while building a grid from explicit data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    /// Cell count does not match the dimensions
    #[error("expected {expected} cells for a {rows}x{columns} grid, got {actual}")]
    SizeMismatch {
        /// Requested rows
        rows: usize,
        /// Requested columns
        columns: usize,
        /// `rows * columns`
        expected: usize,
        /// Cells supplied
        actual: usize,
    },

    /// Text layout rows have different widths
    #[error("layout row {row} has {actual} cells, expected {expected}")]
    RaggedLayout {
        /// Offending row
        row: usize,
        /// Width of the first row
        expected: usize,
        /// Width of this row
        actual: usize,
    },

    /// Unknown glyph in a text layout
    #[error("unknown tile glyph {0:?}")]
    UnknownGlyph(char),
}

// =============================================================================
// COLLAPSE PLAN
// =============================================================================

/// Hole to close in a single column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnCollapse {
    /// Bottom-most destroyed row of the hole
    pub lowest_hole_row: usize,
    /// Number of contiguous destroyed cells ending at `lowest_hole_row`
    pub hole_count: usize,
}

/// Per-column collapse instructions. `None` means the column stays put.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollapsePlan {
    columns: Vec<Option<ColumnCollapse>>,
}

impl CollapsePlan {
    /// Build a plan from explicit per-column entries.
    pub fn new(columns: Vec<Option<ColumnCollapse>>) -> Self {
        Self { columns }
    }

    /// Plan that collapses nothing.
    pub fn empty(columns: usize) -> Self {
        Self { columns: vec![None; columns] }
    }

    /// Scan each column from the bottom up for its lowest run of destroyed cells.
    ///
    /// The first non-destroyed cell above a started hole ends that column's
    /// scan, so a column with two separate holes closes the lower one first.
    pub fn from_grid(grid: &Grid) -> Self {
        let mut columns = Vec::with_capacity(grid.columns());

        for column in 0..grid.columns() {
            let mut entry: Option<ColumnCollapse> = None;

            for row in (0..grid.rows()).rev() {
                let destroyed = grid.cells[grid.index_of(row, column)] == TileColor::Destroyed;
                if destroyed {
                    if let Some(hole) = entry.as_mut() {
                        hole.hole_count += 1;
                    } else {
                        entry = Some(ColumnCollapse { lowest_hole_row: row, hole_count: 1 });
                    }
                } else if entry.is_some() {
                    break;
                }
            }

            columns.push(entry);
        }

        Self { columns }
    }

    /// Number of columns covered.
    #[inline]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// True if the plan covers no columns.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Entry for one column.
    #[inline]
    pub fn get(&self, column: usize) -> Option<ColumnCollapse> {
        self.columns.get(column).copied().flatten()
    }

    /// Iterate over per-column entries.
    pub fn iter(&self) -> impl Iterator<Item = &Option<ColumnCollapse>> {
        self.columns.iter()
    }

    /// Total number of cells removed by this plan.
    pub fn removed_count(&self) -> u32 {
        self.columns
            .iter()
            .flatten()
            .map(|c| c.hole_count as u32)
            .sum()
    }

    /// True if at least one column collapses.
    pub fn has_work(&self) -> bool {
        self.columns.iter().any(Option::is_some)
    }

    /// Check the plan against grid dimensions.
    pub fn fits(&self, rows: usize, columns: usize) -> bool {
        self.columns.len() == columns
            && self.columns.iter().flatten().all(|c| {
                c.lowest_hole_row < rows
                    && c.hole_count >= 1
                    && c.hole_count <= c.lowest_hole_row + 1
            })
    }
}

// =============================================================================
// GRID
// =============================================================================

/// Row-major board of tile colors.
///
/// Dimensions are fixed at construction. Deliberately not `Clone`.
#[derive(Debug, PartialEq, Eq)]
pub struct Grid {
    rows: usize,
    columns: usize,
    cells: Vec<TileColor>,
}

impl Grid {
    /// Build a grid from explicit row-major cells.
    pub fn from_cells(rows: usize, columns: usize, cells: Vec<TileColor>) -> Result<Self, GridError> {
        let expected = rows * columns;
        if cells.len() != expected {
            return Err(GridError::SizeMismatch {
                rows,
                columns,
                expected,
                actual: cells.len(),
            });
        }
        Ok(Self { rows, columns, cells })
    }

    /// Parse a whitespace-separated text layout, one token per row.
    ///
    /// ```
    /// use tile_swap::game::grid::{Grid, TileColor};
    ///
    /// let grid = Grid::parse("RGB GBR").unwrap();
    /// assert_eq!(grid.rows(), 2);
    /// assert_eq!(grid.color_at(1, 0), TileColor::Green);
    /// ```
    pub fn parse(layout: &str) -> Result<Self, GridError> {
        let mut cells = Vec::new();
        let mut rows = 0;
        let mut columns = 0;

        for (row, line) in layout.split_whitespace().enumerate() {
            let width = line.chars().count();
            if row == 0 {
                columns = width;
            } else if width != columns {
                return Err(GridError::RaggedLayout { row, expected: columns, actual: width });
            }
            for glyph in line.chars() {
                cells.push(TileColor::from_glyph(glyph).ok_or(GridError::UnknownGlyph(glyph))?);
            }
            rows += 1;
        }

        Self::from_cells(rows, columns, cells)
    }

    /// Uniformly random board over the playable colors.
    pub fn random(rows: usize, columns: usize, rng: &mut DeterministicRng) -> Self {
        let cells = (0..rows * columns).map(|_| rng.random_color()).collect();
        Self { rows, columns, cells }
    }

    /// Random board with no run of `n` or more equal colors.
    ///
    /// Re-samples every matched cell until the board is clean.
    ///
    /// # Panics
    ///
    /// Panics if `n <= 1`: every board would match and the loop could not end.
    pub fn random_without_matches(
        rows: usize,
        columns: usize,
        n: usize,
        rng: &mut DeterministicRng,
    ) -> Self {
        assert!(n > 1, "no-match board requires a match length above 1, got {}", n);

        let mut grid = Self::random(rows, columns, rng);
        loop {
            let mask = grid.matches_of_n(n);
            if !mask.iter().any(|m| *m) {
                return grid;
            }
            for (cell, matched) in grid.cells.iter_mut().zip(mask) {
                if matched {
                    *cell = rng.random_color();
                }
            }
        }
    }

    /// Number of rows.
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    #[inline]
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Total cell count.
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// True for a zero-sized board.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Row-major view of the cells.
    #[inline]
    pub fn cells(&self) -> &[TileColor] {
        &self.cells
    }

    #[inline]
    fn index_of(&self, row: usize, column: usize) -> usize {
        row * self.columns + column
    }

    /// Check whether a position lies on the board.
    #[inline]
    pub fn contains(&self, pos: TilePos) -> bool {
        pos.row < self.rows && pos.column < self.columns
    }

    /// Color at (row, column). Out-of-range reads log and return `NoColor`.
    pub fn color_at(&self, row: usize, column: usize) -> TileColor {
        if row >= self.rows || column >= self.columns {
            warn!(row, column, rows = self.rows, columns = self.columns, "color_at out of range");
            return TileColor::NoColor;
        }
        self.cells[self.index_of(row, column)]
    }

    /// Color at a flat row-major index. Out-of-range reads log and return `NoColor`.
    pub fn color_at_index(&self, index: usize) -> TileColor {
        match self.cells.get(index) {
            Some(color) => *color,
            None => {
                warn!(index, len = self.cells.len(), "color_at_index out of range");
                TileColor::NoColor
            }
        }
    }

    /// Color at (row, column), or a fresh random color when off the board.
    ///
    /// Signed so the collapse pass can read above the top row.
    pub fn color_at_or_random(&self, row: isize, column: isize, rng: &mut DeterministicRng) -> TileColor {
        if row < 0 || column < 0 || row as usize >= self.rows || column as usize >= self.columns {
            return rng.random_color();
        }
        self.cells[self.index_of(row as usize, column as usize)]
    }

    /// Tile under a normalized grid coordinate.
    ///
    /// A coordinate of exactly 1.0 folds back into the last row or column.
    pub fn tile_at(&self, point: Vec2) -> Option<TilePos> {
        if !point.is_normalized() || self.is_empty() {
            return None;
        }
        let row = ((point.y * self.rows as f32) as usize).min(self.rows - 1);
        let column = ((point.x * self.columns as f32) as usize).min(self.columns - 1);
        Some(TilePos::new(row, column))
    }

    /// Mask of every cell that belongs to a run of at least `n` equal colors.
    ///
    /// Rows are scanned first, then columns, both marking the same mask.
    /// `Destroyed` markers form runs like any color; `NoColor` never does.
    pub fn matches_of_n(&self, n: usize) -> Vec<bool> {
        let mut mask = vec![false; self.cells.len()];
        let n = n.max(1);

        // Rows
        for row in 0..self.rows {
            let mut start = 0;
            while start < self.columns {
                let color = self.cells[self.index_of(row, start)];
                let mut len = 1;
                while start + len < self.columns && self.cells[self.index_of(row, start + len)] == color {
                    len += 1;
                }
                if color != TileColor::NoColor && len >= n {
                    for column in start..start + len {
                        mask[self.index_of(row, column)] = true;
                    }
                }
                start += len;
            }
        }

        // Columns
        for column in 0..self.columns {
            let mut start = 0;
            while start < self.rows {
                let color = self.cells[self.index_of(start, column)];
                let mut len = 1;
                while start + len < self.rows && self.cells[self.index_of(start + len, column)] == color {
                    len += 1;
                }
                if color != TileColor::NoColor && len >= n {
                    for row in start..start + len {
                        mask[self.index_of(row, column)] = true;
                    }
                }
                start += len;
            }
        }

        mask
    }

    /// True if any cell is `Destroyed`.
    pub fn has_destroyed(&self) -> bool {
        self.cells.contains(&TileColor::Destroyed)
    }

    /// Exchange the colors of two on-board cells.
    pub(crate) fn swap(&mut self, a: TilePos, b: TilePos) {
        let ia = self.index_of(a.row, a.column);
        let ib = self.index_of(b.row, b.column);
        self.cells.swap(ia, ib);
    }

    /// Mark every masked cell as `Destroyed`. Returns the number marked.
    pub(crate) fn mark_destroyed(&mut self, mask: &[bool]) -> usize {
        let mut marked = 0;
        for (cell, hit) in self.cells.iter_mut().zip(mask) {
            if *hit {
                *cell = TileColor::Destroyed;
                marked += 1;
            }
        }
        marked
    }

    /// Close the holes described by `plan`, backfilling from above the top row.
    pub(crate) fn apply_collapse(&mut self, plan: &CollapsePlan, rng: &mut DeterministicRng) {
        for (column, entry) in plan.iter().enumerate() {
            let Some(hole) = entry else { continue };
            for row in (0..=hole.lowest_hole_row).rev() {
                let source = row as isize - hole.hole_count as isize;
                let color = self.color_at_or_random(source, column as isize, rng);
                let index = self.index_of(row, column);
                self.cells[index] = color;
            }
        }
    }

    /// Replace every cell with a fresh no-match layout of the same size.
    pub(crate) fn reroll_without_matches(&mut self, n: usize, rng: &mut DeterministicRng) {
        *self = Self::random_without_matches(self.rows, self.columns, n, rng);
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.rows {
            if row > 0 {
                writeln!(f)?;
            }
            for column in 0..self.columns {
                write!(f, "{}", self.cells[self.index_of(row, column)].glyph())?;
            }
        }
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Reference oracle: a cell matches if the maximal horizontal or vertical
    /// run through it is at least `n` long.
    fn oracle_matches(grid: &Grid, n: usize) -> Vec<bool> {
        let mut mask = vec![false; grid.len()];
        for row in 0..grid.rows() {
            for column in 0..grid.columns() {
                let color = grid.color_at(row, column);
                if color == TileColor::NoColor {
                    continue;
                }

                let mut left = column;
                while left > 0 && grid.color_at(row, left - 1) == color {
                    left -= 1;
                }
                let mut right = column;
                while right + 1 < grid.columns() && grid.color_at(row, right + 1) == color {
                    right += 1;
                }

                let mut up = row;
                while up > 0 && grid.color_at(up - 1, column) == color {
                    up -= 1;
                }
                let mut down = row;
                while down + 1 < grid.rows() && grid.color_at(down + 1, column) == color {
                    down += 1;
                }

                mask[row * grid.columns() + column] =
                    right - left + 1 >= n || down - up + 1 >= n;
            }
        }
        mask
    }

    #[test]
    fn test_parse_and_display() {
        let grid = Grid::parse("RGB\nGB.\nYPR").unwrap();
        assert_eq!(grid.rows(), 3);
        assert_eq!(grid.columns(), 3);
        assert_eq!(grid.color_at(1, 2), TileColor::Destroyed);
        assert_eq!(grid.to_string(), "RGB\nGB.\nYPR");
    }

    #[test]
    fn test_parse_rejects_bad_layouts() {
        assert_eq!(
            Grid::parse("RGB GB"),
            Err(GridError::RaggedLayout { row: 1, expected: 3, actual: 2 })
        );
        assert_eq!(Grid::parse("RGX"), Err(GridError::UnknownGlyph('X')));
    }

    #[test]
    fn test_from_cells_size_mismatch() {
        let result = Grid::from_cells(2, 2, vec![TileColor::Red; 3]);
        assert!(matches!(result, Err(GridError::SizeMismatch { expected: 4, actual: 3, .. })));
    }

    #[test]
    fn test_out_of_range_reads_return_no_color() {
        let grid = Grid::parse("RG GR").unwrap();
        assert_eq!(grid.color_at(2, 0), TileColor::NoColor);
        assert_eq!(grid.color_at(0, 5), TileColor::NoColor);
        assert_eq!(grid.color_at_index(4), TileColor::NoColor);
        assert_eq!(grid.color_at_index(3), TileColor::Red);
    }

    #[test]
    fn test_color_at_or_random() {
        let grid = Grid::parse("RG GR").unwrap();
        let mut rng = DeterministicRng::new(3);

        assert_eq!(grid.color_at_or_random(1, 0, &mut rng), TileColor::Green);
        for _ in 0..20 {
            assert!(grid.color_at_or_random(-1, 0, &mut rng).is_playable());
            assert!(grid.color_at_or_random(0, 7, &mut rng).is_playable());
        }
    }

    #[test]
    fn test_three_by_three_mask() {
        // R R R
        // G B G
        // B G B
        let grid = Grid::parse("RRR GBG BGB").unwrap();
        let mask = grid.matches_of_n(3);
        assert_eq!(
            mask,
            vec![true, true, true, false, false, false, false, false, false]
        );
    }

    #[test]
    fn test_vertical_and_cross_runs() {
        let grid = Grid::parse("GRB GRB YRR").unwrap();
        let mask = grid.matches_of_n(3);
        // Column 1 is all red; row 2 has only two reds in a row
        assert_eq!(
            mask,
            vec![false, true, false, false, true, false, false, true, false]
        );

        let mask = grid.matches_of_n(2);
        assert!(mask[0] && mask[3]); // green pair in column 0
        assert!(mask[8]); // red pair at the end of row 2
        assert!(!mask[6]);
    }

    #[test]
    fn test_destroyed_runs_match() {
        let grid = Grid::parse("... RGB").unwrap();
        assert_eq!(grid.matches_of_n(3), vec![true, true, true, false, false, false]);

        let grid = Grid::parse(".R .G RB").unwrap();
        assert!(grid.matches_of_n(3).iter().all(|m| !m));
        assert_eq!(grid.matches_of_n(2), vec![true, false, true, false, false, false]);
    }

    #[test]
    fn test_tile_at() {
        let grid = Grid::from_cells(4, 8, vec![TileColor::Red; 32]).unwrap();
        assert_eq!(grid.tile_at(Vec2::new(0.0, 0.0)), Some(TilePos::new(0, 0)));
        assert_eq!(grid.tile_at(Vec2::new(1.0, 1.0)), Some(TilePos::new(3, 7)));
        assert_eq!(grid.tile_at(Vec2::new(0.3, 0.6)), Some(TilePos::new(2, 2)));
        assert_eq!(grid.tile_at(Vec2::new(1.2, 0.5)), None);
        assert_eq!(grid.tile_at(Vec2::new(0.5, -0.1)), None);
    }

    #[test]
    fn test_tile_adjacency() {
        let a = TilePos::new(2, 2);
        assert!(a.is_adjacent(TilePos::new(1, 2)));
        assert!(a.is_adjacent(TilePos::new(2, 3)));
        assert!(!a.is_adjacent(TilePos::new(3, 3)));
        assert!(!a.is_adjacent(TilePos::new(2, 4)));
        assert!(!a.is_adjacent(a));
    }

    #[test]
    fn test_collapse_plan_from_grid() {
        // Column 0: hole at rows 2..=3
        // Column 1: two separate holes, only the lower one (row 2) is planned
        // Column 2: untouched
        let grid = Grid::parse("R.B GRB ..B .BG").unwrap();
        let plan = CollapsePlan::from_grid(&grid);

        assert_eq!(plan.len(), 3);
        assert_eq!(plan.get(0), Some(ColumnCollapse { lowest_hole_row: 3, hole_count: 2 }));
        assert_eq!(plan.get(1), Some(ColumnCollapse { lowest_hole_row: 2, hole_count: 1 }));
        assert_eq!(plan.get(2), None);
        assert_eq!(plan.removed_count(), 3);

        let grid = Grid::parse("R.B G.B RGB RBG").unwrap();
        let plan = CollapsePlan::from_grid(&grid);
        assert_eq!(plan.get(1), Some(ColumnCollapse { lowest_hole_row: 1, hole_count: 2 }));
        assert_eq!(plan.removed_count(), 2);
    }

    #[test]
    fn test_collapse_plan_fits() {
        let plan = CollapsePlan::new(vec![
            None,
            Some(ColumnCollapse { lowest_hole_row: 2, hole_count: 3 }),
        ]);
        assert!(plan.fits(3, 2));
        assert!(!plan.fits(2, 2));
        assert!(!plan.fits(3, 3));

        let too_deep = CollapsePlan::new(vec![Some(ColumnCollapse { lowest_hole_row: 1, hole_count: 3 })]);
        assert!(!too_deep.fits(5, 1));
        assert!(!CollapsePlan::empty(2).has_work());
    }

    #[test]
    fn test_apply_collapse_shifts_column_down() {
        // Five rows, hole at rows 2..=3 of column 0
        let mut grid = Grid::parse("RG BG .Y .P GB").unwrap();
        let plan = CollapsePlan::from_grid(&grid);
        assert_eq!(plan.get(0), Some(ColumnCollapse { lowest_hole_row: 3, hole_count: 2 }));

        let mut rng = DeterministicRng::new(11);
        grid.apply_collapse(&plan, &mut rng);

        // Rows 0 and 1 drop by two
        assert_eq!(grid.color_at(2, 0), TileColor::Red);
        assert_eq!(grid.color_at(3, 0), TileColor::Blue);
        assert_eq!(grid.color_at(4, 0), TileColor::Green);
        assert!(grid.color_at(0, 0).is_playable());
        assert!(grid.color_at(1, 0).is_playable());
        // Column 1 untouched
        assert_eq!(grid.color_at(3, 1), TileColor::Purple);
        assert!(!grid.has_destroyed());
    }

    #[test]
    fn test_apply_collapse_single_column_scenario() {
        // Holes at rows 0 and 1 of a 5-row column: plan entry (1, 2)
        let mut grid = Grid::parse(". . R G B").unwrap();
        let plan = CollapsePlan::from_grid(&grid);
        assert_eq!(plan.get(0), Some(ColumnCollapse { lowest_hole_row: 1, hole_count: 2 }));

        let mut rng = DeterministicRng::new(5);
        grid.apply_collapse(&plan, &mut rng);

        assert_eq!(grid.color_at(2, 0), TileColor::Red);
        assert_eq!(grid.color_at(3, 0), TileColor::Green);
        assert_eq!(grid.color_at(4, 0), TileColor::Blue);
        assert!(grid.color_at(0, 0).is_playable());
        assert!(grid.color_at(1, 0).is_playable());
    }

    #[test]
    fn test_mark_destroyed_and_swap() {
        let mut grid = Grid::parse("RG BY").unwrap();
        grid.swap(TilePos::new(0, 0), TilePos::new(0, 1));
        assert_eq!(grid.to_string(), "GR\nBY");

        let marked = grid.mark_destroyed(&[false, true, true, false]);
        assert_eq!(marked, 2);
        assert_eq!(grid.to_string(), "G.\n.Y");
        assert!(grid.has_destroyed());
    }

    #[test]
    #[should_panic]
    fn test_no_match_board_rejects_single_tile_runs() {
        let mut rng = DeterministicRng::new(1);
        let _ = Grid::random_without_matches(4, 4, 1, &mut rng);
    }

    #[test]
    fn test_random_board_determinism() {
        let a = Grid::random_without_matches(8, 8, 3, &mut DeterministicRng::new(42));
        let b = Grid::random_without_matches(8, 8, 3, &mut DeterministicRng::new(42));
        assert_eq!(a, b);
    }

    proptest! {
        #[test]
        fn prop_no_match_board_has_no_matches(
            rows in 1usize..10,
            columns in 1usize..10,
            n in 2usize..5,
            seed in any::<u64>(),
        ) {
            let mut rng = DeterministicRng::new(seed);
            let grid = Grid::random_without_matches(rows, columns, n, &mut rng);
            prop_assert_eq!(grid.len(), rows * columns);
            prop_assert!(grid.cells().iter().all(|c| c.is_playable()));
            prop_assert!(grid.matches_of_n(n).iter().all(|m| !m));
        }

        #[test]
        fn prop_matches_agree_with_oracle(
            rows in 1usize..9,
            columns in 1usize..9,
            n in 2usize..5,
            seed in any::<u64>(),
            holes in proptest::collection::vec(any::<bool>(), 64),
        ) {
            let mut rng = DeterministicRng::new(seed);
            let mut grid = Grid::random(rows, columns, &mut rng);
            grid.mark_destroyed(&holes);
            prop_assert_eq!(grid.matches_of_n(n), oracle_matches(&grid, n));
        }
    }
}
