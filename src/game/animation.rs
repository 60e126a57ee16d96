//! Animation State Machine
//!
//! Exactly one animation is active at a time. Each animating variant carries
//! its own payload plus a clock; `GameState::elapse` drives the transitions.

use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::core::vec2::Vec2;
use crate::game::grid::{CollapsePlan, TilePos};

// =============================================================================
// CLOCK
// =============================================================================

/// Start time and duration of a running animation.
///
/// `start_ms` is signed: a swap that continues a drag starts in the past,
/// possibly before game time zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationClock {
    /// Game time the animation started at (ms)
    pub start_ms: i64,
    /// Length of the animation (ms)
    pub duration_ms: u32,
}

impl AnimationClock {
    /// Clock starting at `start_ms`.
    #[inline]
    pub fn new(start_ms: i64, duration_ms: u32) -> Self {
        Self { start_ms, duration_ms }
    }

    /// Fraction of the duration elapsed at `now_ms`, capped at 1.0.
    ///
    /// A zero duration is always complete.
    pub fn fraction(&self, now_ms: u64) -> f32 {
        if self.duration_ms == 0 {
            return 1.0;
        }
        let elapsed = now_ms as i64 - self.start_ms;
        (elapsed as f32 / self.duration_ms as f32).clamp(0.0, 1.0)
    }

    /// Milliseconds until the end boundary. Negative once overrun.
    #[inline]
    pub fn remaining_ms(&self, now_ms: u64) -> i64 {
        self.start_ms + self.duration_ms as i64 - now_ms as i64
    }
}

// =============================================================================
// STATE
// =============================================================================

/// Discriminant of [`AnimationState`], cheap to compare and hash.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum AnimationKind {
    Idle = 0,
    SwappingTiles = 1,
    DestroyingTiles = 2,
    CollapsingTiles = 3,
    GameOver = 4,
}

/// Active animation with its payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[derive(Default)]
pub enum AnimationState {
    /// Waiting for input
    #[default]
    Idle,

    /// Two tiles trading places
    SwappingTiles {
        /// Tile being moved
        dragged: TilePos,
        /// Neighbour it trades with
        replaced: TilePos,
        /// Displacement the interpolation starts from
        start_displacement: Vec2,
        /// Speculative swap: undone if it produces no match
        swap_back: bool,
        /// Timing
        clock: AnimationClock,
    },

    /// Matched tiles fading out
    DestroyingTiles {
        /// Cells to destroy, row-major
        mask: Vec<bool>,
        /// Timing
        clock: AnimationClock,
    },

    /// Columns falling into their holes (grid already shifted)
    CollapsingTiles {
        /// Holes being closed
        plan: CollapsePlan,
        /// Timing
        clock: AnimationClock,
    },

    /// Play clock ran out. Terminal.
    GameOver,
}

impl AnimationState {
    /// Variant tag.
    pub fn kind(&self) -> AnimationKind {
        match self {
            AnimationState::Idle => AnimationKind::Idle,
            AnimationState::SwappingTiles { .. } => AnimationKind::SwappingTiles,
            AnimationState::DestroyingTiles { .. } => AnimationKind::DestroyingTiles,
            AnimationState::CollapsingTiles { .. } => AnimationKind::CollapsingTiles,
            AnimationState::GameOver => AnimationKind::GameOver,
        }
    }

    /// Clock of the running animation, if any.
    pub fn clock(&self) -> Option<&AnimationClock> {
        match self {
            AnimationState::SwappingTiles { clock, .. }
            | AnimationState::DestroyingTiles { clock, .. }
            | AnimationState::CollapsingTiles { clock, .. } => Some(clock),
            AnimationState::Idle | AnimationState::GameOver => None,
        }
    }

    /// Waiting for input?
    #[inline]
    pub fn is_idle(&self) -> bool {
        matches!(self, AnimationState::Idle)
    }

    /// Has the play clock run out?
    #[inline]
    pub fn is_game_over(&self) -> bool {
        matches!(self, AnimationState::GameOver)
    }

    /// True while a timed animation runs.
    #[inline]
    pub fn is_animating(&self) -> bool {
        self.clock().is_some()
    }
}

// =============================================================================
// ERRORS
// =============================================================================

/// Rejected state-machine or drag request. The state is left unchanged.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RequestError {
    /// Requests are only accepted while idle
    #[error("request rejected: animation state is {0:?}, expected Idle")]
    NotIdle(AnimationKind),

    /// Drag operation without an active drag
    #[error("no drag is active")]
    NoActiveDrag,

    /// A drag is already in progress
    #[error("a drag is already active")]
    DragAlreadyActive,

    /// Drag has not picked a neighbour to swap with
    #[error("drag has no replacement tile")]
    NoReplacementTile,

    /// Point lies outside the normalized grid
    #[error("point {0} is outside the grid")]
    OutsideGrid(Vec2),

    /// Point has a NaN or infinite component
    #[error("point {0} is not finite")]
    NonFinitePoint(Vec2),

    /// Tile position is not on the board
    #[error("tile {0} is outside the grid")]
    TileOutOfBounds(TilePos),

    /// Destroy mask length differs from the cell count
    #[error("destroy mask has {actual} entries, grid has {expected} cells")]
    MaskSizeMismatch {
        /// Cells on the board
        expected: usize,
        /// Mask length
        actual: usize,
    },

    /// Collapse plan does not fit the board
    #[error("collapse plan does not fit a {rows}x{columns} grid")]
    PlanMismatch {
        /// Board height
        rows: usize,
        /// Board width
        columns: usize,
    },
}

// =============================================================================
// TESTS
// =============================================================================
