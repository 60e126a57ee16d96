//! Drag Interpreter
//!
//! Turns a pointer drag over the board into a swap intent.
//! The dragged tile comes from the start point; the drag direction picks
//! the neighbour it would trade places with.

use serde::{Serialize, Deserialize};

use crate::core::vec2::Vec2;
use crate::game::grid::{Grid, TilePos};

/// Live pointer-drag session plus tap selection.
///
/// Everything except `selected` is meaningful only while `active` is set.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DragSession {
    active: bool,
    start: Vec2,
    current: Vec2,
    dragged: Option<TilePos>,
    replaced: Option<TilePos>,
    displacement: Vec2,
    selected: Option<TilePos>,
}

impl DragSession {
    /// Inactive session with no selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Is a drag in progress?
    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Start point (normalized grid coordinates).
    #[inline]
    pub fn start(&self) -> Vec2 {
        self.start
    }

    /// Latest pointer position (normalized grid coordinates).
    #[inline]
    pub fn current(&self) -> Vec2 {
        self.current
    }

    /// Tile under the start point.
    #[inline]
    pub fn dragged(&self) -> Option<TilePos> {
        self.dragged
    }

    /// Neighbour the dragged tile would swap with.
    #[inline]
    pub fn replaced(&self) -> Option<TilePos> {
        self.replaced
    }

    /// Clamped displacement of the dragged tile.
    #[inline]
    pub fn displacement(&self) -> Vec2 {
        self.displacement
    }

    /// Tap-selected tile.
    #[inline]
    pub fn selected(&self) -> Option<TilePos> {
        self.selected
    }

    /// Open a drag at `point` and prime the cache.
    pub(crate) fn begin(&mut self, point: Vec2, grid: &Grid) {
        self.active = true;
        self.start = point;
        self.current = point;
        self.refresh(grid);
    }

    /// Move the pointer and recompute the cache.
    pub(crate) fn move_to(&mut self, point: Vec2, grid: &Grid) {
        self.current = point;
        self.refresh(grid);
    }

    /// Close the drag, keeping the selection.
    pub(crate) fn deactivate(&mut self) {
        self.active = false;
    }

    /// Drop the whole session including the selection.
    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }

    pub(crate) fn select(&mut self, tile: Option<TilePos>) {
        self.selected = tile;
    }

    /// Recompute dragged tile, replacement tile and displacement.
    fn refresh(&mut self, grid: &Grid) {
        self.dragged = grid.tile_at(self.start);
        self.replaced = None;
        self.displacement = Vec2::ZERO;

        let Some(dragged) = self.dragged else { return };
        let rows = grid.rows();
        let columns = grid.columns();
        let mut diff = self.current - self.start;

        // Boundary tiles cannot be pushed off the board
        if (dragged.column == 0 && diff.x < 0.0) || (dragged.column + 1 == columns && diff.x > 0.0) {
            diff.x = 0.0;
        }
        if (dragged.row == 0 && diff.y < 0.0) || (dragged.row + 1 == rows && diff.y > 0.0) {
            diff.y = 0.0;
        }

        if !diff.is_finite() || diff.is_zero() {
            return;
        }

        if diff.x.abs() > diff.y.abs() {
            let cell = 1.0 / columns as f32;
            let column = if diff.x > 0.0 { Some(dragged.column + 1) } else { dragged.column.checked_sub(1) };
            self.replaced = column.map(|column| TilePos::new(dragged.row, column));
            self.displacement.x = diff.x.clamp(-cell, cell);
        } else {
            let cell = 1.0 / rows as f32;
            let row = if diff.y > 0.0 { Some(dragged.row + 1) } else { dragged.row.checked_sub(1) };
            self.replaced = row.map(|row| TilePos::new(row, dragged.column));
            self.displacement.y = diff.y.clamp(-cell, cell);
        }
    }
}

// =============================================================================
// RELEASE
// =============================================================================

/// What a pointer release means.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReleaseAction {
    /// Dragged at least half a cell: swap dragged and replaced tiles
    SwapDragged,
    /// Tap next to the selected tile: swap the two
    SwapWithSelected {
        /// Tile under the tap
        tapped: TilePos,
        /// Previously selected neighbour
        selected: TilePos,
    },
    /// Tap elsewhere: select the tapped tile
    Select(TilePos),
    /// Release away from the press point without a drag
    Ignore,
}

/// Classify the release of an active drag.
///
/// `released_on` is the tile under the pointer at release.
pub fn classify_release(
    session: &DragSession,
    released_on: Option<TilePos>,
    rows: usize,
    columns: usize,
) -> ReleaseAction {
    let half_cell_x = 1.0 / columns as f32 / 2.0;
    let half_cell_y = 1.0 / rows as f32 / 2.0;
    let displacement = session.displacement();

    if displacement.x.abs() >= half_cell_x || displacement.y.abs() >= half_cell_y {
        return ReleaseAction::SwapDragged;
    }

    match (released_on, session.dragged()) {
        (Some(tapped), Some(pressed)) if tapped == pressed => match session.selected() {
            Some(selected) if selected.is_adjacent(tapped) => {
                ReleaseAction::SwapWithSelected { tapped, selected }
            }
            _ => ReleaseAction::Select(tapped),
        },
        _ => ReleaseAction::Ignore,
    }
}

// =============================================================================
// TESTS
// =============================================================================
