//! Game Configuration
//!
//! Construction parameters for a game, loadable from JSON.
//! Missing fields fall back to the classic 8x8, match-3, 60 second game.

use std::path::Path;
use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::game::input::BoardViewport;
use crate::{
    DEFAULT_ANIMATION_DURATION_MS, DEFAULT_COLUMNS, DEFAULT_MAX_CASCADE_STEPS,
    DEFAULT_MAX_GAMEPLAY_SECONDS, DEFAULT_MIN_MATCH_SIZE, DEFAULT_ROWS,
};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Board has no cells
    #[error("board must have at least one row and one column, got {rows}x{columns}")]
    EmptyBoard {
        /// Configured rows
        rows: usize,
        /// Configured columns
        columns: usize,
    },

    /// Every single tile would count as a match
    #[error("minimum match size must be greater than 1, got {0}")]
    MatchSizeTooSmall(usize),

    /// Reconciliation could never make progress
    #[error("max_cascade_steps must be at least 1")]
    ZeroCascadeSteps,

    /// Supplied board does not have the configured dimensions
    #[error("grid is {actual_rows}x{actual_columns}, config expects {rows}x{columns}")]
    GridSizeMismatch {
        /// Configured rows
        rows: usize,
        /// Configured columns
        columns: usize,
        /// Rows of the supplied grid
        actual_rows: usize,
        /// Columns of the supplied grid
        actual_columns: usize,
    },

    /// Viewport has no area, so pointer positions cannot be mapped
    #[error("viewport cannot map pointer input: {0:?}")]
    DegenerateViewport(BoardViewport),

    /// Config file could not be read
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid JSON for this schema
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Parameters fixed for the lifetime of a game.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Board height in tiles
    pub rows: usize,
    /// Board width in tiles
    pub columns: usize,
    /// Shortest run that counts as a match
    pub min_match_size: usize,
    /// Play clock in seconds (time spent animating is not charged)
    pub max_gameplay_seconds: u32,
    /// Duration of every swap/destroy/collapse animation. 0 = instant.
    pub animation_duration_ms: u32,
    /// Reconciliation iterations allowed per update call
    pub max_cascade_steps: u32,
    /// RNG seed for board generation and refills
    pub seed: u64,
    /// Screen layout used to map pointer events onto the board
    pub viewport: BoardViewport,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            columns: DEFAULT_COLUMNS,
            min_match_size: DEFAULT_MIN_MATCH_SIZE,
            max_gameplay_seconds: DEFAULT_MAX_GAMEPLAY_SECONDS,
            animation_duration_ms: DEFAULT_ANIMATION_DURATION_MS,
            max_cascade_steps: DEFAULT_MAX_CASCADE_STEPS,
            seed: 0,
            viewport: BoardViewport::default(),
        }
    }
}

impl GameConfig {
    /// Default configuration with a specific seed.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    /// Check the invariants the engine relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rows == 0 || self.columns == 0 {
            return Err(ConfigError::EmptyBoard {
                rows: self.rows,
                columns: self.columns,
            });
        }
        if self.min_match_size <= 1 {
            return Err(ConfigError::MatchSizeTooSmall(self.min_match_size));
        }
        if self.max_cascade_steps == 0 {
            return Err(ConfigError::ZeroCascadeSteps);
        }
        if !self.viewport.is_mappable() {
            return Err(ConfigError::DegenerateViewport(self.viewport));
        }
        Ok(())
    }

    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Play clock in milliseconds.
    #[inline]
    pub fn max_gameplay_ms(&self) -> u64 {
        self.max_gameplay_seconds as u64 * 1000
    }
}
