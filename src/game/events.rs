//! Game Events
//!
//! Grid-change notification for dependent logic, and the event log drained
//! into each tick result for replay and inspection.

use std::fmt;
use std::rc::Weak;
use serde::{Serialize, Deserialize};

use crate::game::animation::AnimationKind;
use crate::game::grid::TilePos;

// =============================================================================
// CHANGE NOTIFICATION
// =============================================================================

/// Grid mutation that just completed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GridChange {
    /// Two tiles exchanged colors
    Swapped {
        /// First tile
        a: TilePos,
        /// Second tile
        b: TilePos,
    },
    /// Masked cells became `Destroyed`
    Destroyed {
        /// Cells marked
        count: usize,
    },
    /// Collapse animation finished
    Collapsed {
        /// Holes closed
        removed: u32,
    },
}

/// Subscriber to grid changes.
///
/// Callbacks take `&self`: observers use interior mutability and cannot
/// reach back into the state that notifies them.
pub trait GridChangeObserver {
    /// Called once after each grid-mutating animation completes.
    fn on_grid_changed(&self, change: &GridChange);
}

/// Ordered list of non-owning observer handles.
#[derive(Default)]
pub struct ObserverRegistry {
    observers: Vec<Weak<dyn GridChangeObserver>>,
}

impl ObserverRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe an observer. Notification order is attachment order.
    pub fn attach(&mut self, observer: Weak<dyn GridChangeObserver>) {
        self.observers.push(observer);
    }

    /// Notify every live observer; dropped ones are pruned.
    ///
    /// Returns the number of observers reached.
    pub fn notify(&mut self, change: &GridChange) -> usize {
        let mut reached = 0;
        self.observers.retain(|weak| match weak.upgrade() {
            Some(observer) => {
                observer.on_grid_changed(change);
                reached += 1;
                true
            }
            None => false,
        });
        reached
    }

    /// Number of registered handles (live or not yet pruned).
    #[inline]
    pub fn len(&self) -> usize {
        self.observers.len()
    }

    /// No observers attached?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl fmt::Debug for ObserverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverRegistry")
            .field("observers", &self.observers.len())
            .finish()
    }
}

// =============================================================================
// EVENT LOG
// =============================================================================

/// Game event data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum GameEventData {
    /// Animation requested and accepted
    AnimationStarted {
        kind: AnimationKind,
        duration_ms: u32,
    },

    /// Swap animation completed and colors exchanged
    TilesSwapped {
        a: TilePos,
        b: TilePos,
        swap_back: bool,
    },

    /// Destroy animation completed
    TilesDestroyed {
        count: usize,
    },

    /// Collapse animation completed
    ColumnsCollapsed {
        removed: u32,
    },

    /// Score increased
    ScoreChanged {
        points: u32,
        new_score: u32,
    },

    /// Tile selected by a tap
    TileSelected {
        tile: TilePos,
    },

    /// Play clock ran out
    GameOver {
        final_score: u32,
    },
}

/// A game event stamped with game time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameEvent {
    /// Game time (ms) when the event occurred
    pub time_ms: u64,

    /// Event data
    pub data: GameEventData,
}

impl GameEvent {
    /// Create a new event.
    pub fn new(time_ms: u64, data: GameEventData) -> Self {
        Self { time_ms, data }
    }

    /// Create animation started event.
    pub fn animation_started(time_ms: u64, kind: AnimationKind, duration_ms: u32) -> Self {
        Self::new(time_ms, GameEventData::AnimationStarted { kind, duration_ms })
    }

    /// Create tiles swapped event.
    pub fn tiles_swapped(time_ms: u64, a: TilePos, b: TilePos, swap_back: bool) -> Self {
        Self::new(time_ms, GameEventData::TilesSwapped { a, b, swap_back })
    }

    /// Create score changed event.
    pub fn score_changed(time_ms: u64, points: u32, new_score: u32) -> Self {
        Self::new(time_ms, GameEventData::ScoreChanged { points, new_score })
    }

    /// Create game over event.
    pub fn game_over(time_ms: u64, final_score: u32) -> Self {
        Self::new(time_ms, GameEventData::GameOver { final_score })
    }

    /// The grid change this event reports, if it is one.
    pub fn grid_change(&self) -> Option<GridChange> {
        match &self.data {
            GameEventData::TilesSwapped { a, b, .. } => Some(GridChange::Swapped { a: *a, b: *b }),
            GameEventData::TilesDestroyed { count } => Some(GridChange::Destroyed { count: *count }),
            GameEventData::ColumnsCollapsed { removed } => Some(GridChange::Collapsed { removed: *removed }),
            _ => None,
        }
    }
}
