//! # Tile Swap
//!
//! Deterministic rules engine for a swap-three tile-matching puzzle.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        TILE SWAP                             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                  │
//! │  ├── vec2.rs     - Normalized grid-space vector              │
//! │  ├── rng.rs      - Deterministic Xorshift128+ PRNG           │
//! │  └── hash.rs     - State hashing for verification            │
//! │                                                              │
//! │  config.rs       - Game parameters, JSON loading             │
//! │                                                              │
//! │  game/           - Rules engine                              │
//! │  ├── grid.rs     - Board, match detection, collapse plans    │
//! │  ├── drag.rs     - Drag interpreter                          │
//! │  ├── animation.rs- Animation state machine                   │
//! │  ├── events.rs   - Change notification and event log         │
//! │  ├── state.rs    - Game state, requests and queries          │
//! │  ├── reconcile.rs- Chain reactions                           │
//! │  ├── input.rs    - Pointer input, screen-to-grid transform   │
//! │  └── tick.rs     - Frame driver and replay                   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism Guarantee
//!
//! All randomness (initial board, refills after a collapse) comes from a
//! seeded Xorshift128+ and time only advances through `elapse`. Given the
//! same seed and the same recorded frames, a game ends with the same board,
//! score and state hash.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod config;
pub mod game;

// Re-export commonly used types
pub use core::vec2::Vec2;
pub use core::rng::DeterministicRng;
pub use config::{ConfigError, GameConfig};
pub use game::grid::{Grid, TileColor, TilePos};
pub use game::state::GameState;
pub use game::tick::{GameLogic, TickResult};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default board height
pub const DEFAULT_ROWS: usize = 8;

/// Default board width
pub const DEFAULT_COLUMNS: usize = 8;

/// Default shortest matching run
pub const DEFAULT_MIN_MATCH_SIZE: usize = 3;

/// Default play clock (seconds)
pub const DEFAULT_MAX_GAMEPLAY_SECONDS: u32 = 60;

/// Default swap/destroy/collapse animation length (ms)
pub const DEFAULT_ANIMATION_DURATION_MS: u32 = 500;

/// Default reconciliation iterations per update
pub const DEFAULT_MAX_CASCADE_STEPS: u32 = 32;
