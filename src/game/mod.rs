//! Game Logic Module
//!
//! All rules-engine code. Deterministic given a seed and an input log.
//!
//! ## Module Structure
//!
//! - `grid`: Board model, match detection, collapse plans
//! - `drag`: Drag interpreter and release classification
//! - `animation`: Animation state machine payloads and request errors
//! - `events`: Grid-change notification and the event log
//! - `state`: Game state and every request/query on it
//! - `reconcile`: Chain-reaction loop (collapse, destroy, swap-back)
//! - `input`: Pointer events and the screen-to-grid transform
//! - `tick`: Frame driver and replay

pub mod grid;
pub mod drag;
pub mod animation;
pub mod events;
pub mod state;
pub mod reconcile;
pub mod input;
pub mod tick;

// Re-export key types
pub use grid::{CollapsePlan, ColumnCollapse, Grid, TileColor, TilePos};
pub use animation::{AnimationKind, AnimationState, RequestError};
pub use events::{GameEvent, GameEventData, GridChange, GridChangeObserver};
pub use state::{GameSnapshot, GameState};
pub use input::{BoardViewport, InputEvent, InputFrame, PointerEvent, ScreenToGrid};
pub use tick::{GameLogic, TickResult};
