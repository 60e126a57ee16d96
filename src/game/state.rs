//! Game State
//!
//! Owns the board, the drag session, the active animation, both clocks,
//! the score and the change observers. Every documented request and query
//! of the rules engine lives here; reconciliation drives it from outside.

use std::rc::Weak;
use serde::{Serialize, Deserialize};
use tracing::{debug, info, warn};

use crate::config::{ConfigError, GameConfig};
use crate::core::hash::{compute_state_hash, StateHash};
use crate::core::rng::DeterministicRng;
use crate::core::vec2::Vec2;
use crate::game::animation::{AnimationClock, AnimationKind, AnimationState, RequestError};
use crate::game::drag::DragSession;
use crate::game::events::{GameEvent, GameEventData, GridChange, GridChangeObserver, ObserverRegistry};
use crate::game::grid::{CollapsePlan, Grid, TileColor, TilePos};

// =============================================================================
// SNAPSHOT
// =============================================================================

/// Serializable read-only view of a game.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    /// Board height
    pub rows: usize,
    /// Board width
    pub columns: usize,
    /// One string per row, one glyph per tile
    pub board: Vec<String>,
    /// Active animation
    pub animation: AnimationKind,
    /// Progress of the active animation
    pub animation_percentage: f32,
    /// Tap selection
    pub selected_tile: Option<TilePos>,
    /// Tiles removed so far
    pub score: u32,
    /// Whole seconds of play left
    pub gameplay_time_left: u32,
    /// Total elapsed time (ms)
    pub game_time_ms: u64,
}

// =============================================================================
// GAME STATE
// =============================================================================

/// Complete state of one game.
///
/// Move-only: neither the state nor its grid implement `Clone`.
#[derive(Debug)]
pub struct GameState {
    /// Construction parameters
    config: GameConfig,

    /// The board
    grid: Grid,

    /// Deterministic RNG for board generation and refills
    rng: DeterministicRng,

    /// Pointer drag and tap selection
    drag: DragSession,

    /// Active animation with its payload
    animation: AnimationState,

    /// Speculative swap that completed and awaits a match check
    pending_swap_back: Option<(TilePos, TilePos)>,

    /// Monotonic game clock (ms)
    game_time_ms: u64,

    /// Play clock (ms), excluding time spent inside animations
    gameplay_time_ms: u64,

    /// Cells removed so far
    score: u32,

    /// Grid-change subscribers
    observers: ObserverRegistry,

    /// Events generated since the last `take_events`
    pending_events: Vec<GameEvent>,
}

impl GameState {
    /// Create a game with a fresh no-match board.
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut rng = DeterministicRng::new(config.seed);
        let grid = Grid::random_without_matches(config.rows, config.columns, config.min_match_size, &mut rng);
        Ok(Self::assemble(config, grid, rng))
    }

    /// Create a game around an explicit board.
    pub fn with_grid(config: GameConfig, grid: Grid) -> Result<Self, ConfigError> {
        config.validate()?;
        if grid.rows() != config.rows || grid.columns() != config.columns {
            return Err(ConfigError::GridSizeMismatch {
                rows: config.rows,
                columns: config.columns,
                actual_rows: grid.rows(),
                actual_columns: grid.columns(),
            });
        }
        let rng = DeterministicRng::new(config.seed);
        Ok(Self::assemble(config, grid, rng))
    }

    fn assemble(config: GameConfig, grid: Grid, rng: DeterministicRng) -> Self {
        Self {
            config,
            grid,
            rng,
            drag: DragSession::new(),
            animation: AnimationState::Idle,
            pending_swap_back: None,
            game_time_ms: 0,
            gameplay_time_ms: 0,
            score: 0,
            observers: ObserverRegistry::new(),
            pending_events: Vec::new(),
        }
    }

    /// Start over: new no-match board, clocks and score zeroed.
    ///
    /// Observers stay attached. The RNG is not reseeded.
    pub fn restart(&mut self) {
        self.grid.reroll_without_matches(self.config.min_match_size, &mut self.rng);
        self.drag.reset();
        self.animation = AnimationState::Idle;
        self.pending_swap_back = None;
        self.game_time_ms = 0;
        self.gameplay_time_ms = 0;
        self.score = 0;
        self.pending_events.clear();
        info!(rows = self.grid.rows(), columns = self.grid.columns(), "game restarted");
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Construction parameters.
    #[inline]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// The board.
    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Board height.
    #[inline]
    pub fn rows(&self) -> usize {
        self.grid.rows()
    }

    /// Board width.
    #[inline]
    pub fn columns(&self) -> usize {
        self.grid.columns()
    }

    /// Color at (row, column); `NoColor` when out of range.
    #[inline]
    pub fn color_at(&self, row: usize, column: usize) -> TileColor {
        self.grid.color_at(row, column)
    }

    /// Active animation with payload.
    #[inline]
    pub fn animation(&self) -> &AnimationState {
        &self.animation
    }

    /// Active animation without payload.
    #[inline]
    pub fn animation_kind(&self) -> AnimationKind {
        self.animation.kind()
    }

    /// Progress of the active animation in [0, 1]. 0.0 when nothing animates.
    pub fn animation_percentage(&self) -> f32 {
        self.animation
            .clock()
            .map(|clock| clock.fraction(self.game_time_ms))
            .unwrap_or(0.0)
    }

    /// Monotonic game clock (ms).
    #[inline]
    pub fn game_time_ms(&self) -> u64 {
        self.game_time_ms
    }

    /// Play clock (ms).
    #[inline]
    pub fn gameplay_time_ms(&self) -> u64 {
        self.gameplay_time_ms
    }

    /// Tile being dragged, or the first tile of a running swap.
    pub fn dragged_tile(&self) -> Option<TilePos> {
        match &self.animation {
            AnimationState::SwappingTiles { dragged, .. } => Some(*dragged),
            _ if self.drag.is_active() => self.drag.dragged(),
            _ => {
                warn!("dragged_tile queried without an active drag");
                None
            }
        }
    }

    /// Neighbour of the dragged tile, or the second tile of a running swap.
    pub fn replaced_tile(&self) -> Option<TilePos> {
        match &self.animation {
            AnimationState::SwappingTiles { replaced, .. } => Some(*replaced),
            _ if self.drag.is_active() => self.drag.replaced(),
            _ => {
                warn!("replaced_tile queried without an active drag");
                None
            }
        }
    }

    /// Displayed offset of the dragged tile in normalized grid units.
    ///
    /// During a swap this interpolates from the start displacement to a full
    /// cell toward the replaced tile.
    pub fn dragged_tile_displacement(&self) -> Vec2 {
        match &self.animation {
            AnimationState::SwappingTiles { dragged, replaced, start_displacement, clock, .. } => {
                let target = self.swap_offset(*dragged, *replaced);
                start_displacement.lerp(target, clock.fraction(self.game_time_ms))
            }
            _ if self.drag.is_active() => self.drag.displacement(),
            _ => {
                warn!("dragged_tile_displacement queried without an active drag");
                Vec2::ZERO
            }
        }
    }

    fn swap_offset(&self, from: TilePos, to: TilePos) -> Vec2 {
        Vec2::new(
            (to.column as f32 - from.column as f32) / self.columns() as f32,
            (to.row as f32 - from.row as f32) / self.rows() as f32,
        )
    }

    /// True if the cell is part of a running destroy animation.
    pub fn is_tile_being_destroyed(&self, row: usize, column: usize) -> bool {
        if row >= self.rows() || column >= self.columns() {
            warn!(row, column, "is_tile_being_destroyed out of range");
            return false;
        }
        match &self.animation {
            AnimationState::DestroyingTiles { mask, .. } => mask[row * self.columns() + column],
            _ => false,
        }
    }

    /// Plan of the running collapse animation.
    pub fn collapse_plan(&self) -> Option<&CollapsePlan> {
        match &self.animation {
            AnimationState::CollapsingTiles { plan, .. } => Some(plan),
            _ => None,
        }
    }

    /// Tap-selected tile.
    #[inline]
    pub fn selected_tile(&self) -> Option<TilePos> {
        self.drag.selected()
    }

    /// Remaining play time in whole seconds, rounded up.
    pub fn gameplay_time_left(&self) -> u32 {
        let limit = self.config.max_gameplay_ms();
        if limit <= self.gameplay_time_ms {
            return 0;
        }
        (limit - self.gameplay_time_ms).div_ceil(1000) as u32
    }

    /// Tiles removed so far.
    #[inline]
    pub fn score(&self) -> u32 {
        self.score
    }

    /// True for a running speculative swap or one awaiting its match check.
    pub fn is_swap_back(&self) -> bool {
        match &self.animation {
            AnimationState::SwappingTiles { swap_back, .. } => *swap_back,
            _ => self.pending_swap_back.is_some(),
        }
    }

    /// Completed speculative swap not yet checked by reconciliation.
    #[inline]
    pub fn pending_swap_back(&self) -> Option<(TilePos, TilePos)> {
        self.pending_swap_back
    }

    /// Drag start point, while a drag is active.
    pub fn drag_start_location(&self) -> Option<Vec2> {
        self.drag.is_active().then(|| self.drag.start())
    }

    /// Latest drag point, while a drag is active.
    pub fn drag_current_location(&self) -> Option<Vec2> {
        self.drag.is_active().then(|| self.drag.current())
    }

    /// Is a drag in progress?
    #[inline]
    pub fn is_drag_active(&self) -> bool {
        self.drag.is_active()
    }

    /// Drag session (read-only).
    #[inline]
    pub fn drag(&self) -> &DragSession {
        &self.drag
    }

    /// Serializable view of the game.
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            rows: self.rows(),
            columns: self.columns(),
            board: self.grid.to_string().lines().map(str::to_owned).collect(),
            animation: self.animation_kind(),
            animation_percentage: self.animation_percentage(),
            selected_tile: self.selected_tile(),
            score: self.score,
            gameplay_time_left: self.gameplay_time_left(),
            game_time_ms: self.game_time_ms,
        }
    }

    /// Hash of clocks, score, animation and board.
    pub fn compute_hash(&self) -> StateHash {
        compute_state_hash(self.game_time_ms, self.config.seed, |hasher| {
            hasher.update_u64(self.gameplay_time_ms);
            hasher.update_u32(self.score);
            hasher.update_u8(self.animation_kind() as u8);
            hasher.update_bool(self.pending_swap_back.is_some());
            hasher.update_vec2(self.drag.displacement());
            for word in self.rng.state() {
                hasher.update_u64(word);
            }
            hasher.update_u32(self.rows() as u32);
            hasher.update_u32(self.columns() as u32);
            for color in self.grid.cells() {
                hasher.update_u8(*color as u8);
            }
        })
    }

    // =========================================================================
    // Drag requests
    // =========================================================================

    fn ensure_idle(&self) -> Result<(), RequestError> {
        if self.animation.is_idle() {
            Ok(())
        } else {
            Err(RequestError::NotIdle(self.animation_kind()))
        }
    }

    /// Begin a drag at a normalized grid point.
    pub fn set_drag_start_location(&mut self, point: Vec2) -> Result<(), RequestError> {
        let result = self.ensure_idle().and_then(|_| {
            if self.drag.is_active() {
                Err(RequestError::DragAlreadyActive)
            } else if self.grid.tile_at(point).is_none() {
                Err(RequestError::OutsideGrid(point))
            } else {
                Ok(())
            }
        });
        if let Err(err) = &result {
            warn!(%err, "set_drag_start_location rejected");
            return result;
        }

        self.drag.begin(point, &self.grid);
        Ok(())
    }

    /// Move the active drag to a normalized grid point.
    pub fn set_drag_current_location(&mut self, point: Vec2) -> Result<(), RequestError> {
        let result = self.ensure_idle().and_then(|_| {
            if !self.drag.is_active() {
                Err(RequestError::NoActiveDrag)
            } else if !point.is_finite() {
                Err(RequestError::NonFinitePoint(point))
            } else {
                Ok(())
            }
        });
        if let Err(err) = &result {
            warn!(%err, "set_drag_current_location rejected");
            return result;
        }

        self.drag.move_to(point, &self.grid);
        Ok(())
    }

    /// Close the drag without swapping. Selection survives.
    pub fn deactivate_drag(&mut self) {
        self.drag.deactivate();
    }

    /// Select a tile for tap-to-swap.
    pub fn select_tile(&mut self, tile: TilePos) -> Result<(), RequestError> {
        if !self.grid.contains(tile) {
            warn!(%tile, "select_tile out of range");
            return Err(RequestError::TileOutOfBounds(tile));
        }
        self.drag.select(Some(tile));
        self.push_event(GameEvent::new(self.game_time_ms, GameEventData::TileSelected { tile }));
        Ok(())
    }

    /// Clear the tap selection.
    pub fn deselect_tile(&mut self) {
        self.drag.select(None);
    }

    // =========================================================================
    // Animation requests
    // =========================================================================

    /// Swap the dragged tile with its replacement.
    ///
    /// With `animate_from_current` the animation continues from where the
    /// drag left the tile: its start time is moved back by the fraction of a
    /// cell already travelled.
    pub fn swap_dragged_and_replaced_tiles(
        &mut self,
        duration_ms: u32,
        animate_from_current: bool,
        swap_back: bool,
    ) -> Result<(), RequestError> {
        let checked = if !self.drag.is_active() {
            Err(RequestError::NoActiveDrag)
        } else {
            self.ensure_idle()
        };
        let (dragged, replaced) = match (checked, self.drag.dragged(), self.drag.replaced()) {
            (Err(err), _, _) => {
                warn!(%err, "swap_dragged_and_replaced_tiles rejected");
                return Err(err);
            }
            (Ok(()), Some(dragged), Some(replaced)) => (dragged, replaced),
            (Ok(()), _, _) => {
                warn!("swap_dragged_and_replaced_tiles rejected: no replacement tile");
                return Err(RequestError::NoReplacementTile);
            }
        };

        let now = self.game_time_ms as i64;
        let displacement = self.drag.displacement();
        let (start_ms, start_displacement) = if animate_from_current {
            let travelled = (displacement.x.abs() * self.columns() as f32)
                .max(displacement.y.abs() * self.rows() as f32)
                .min(1.0);
            let head_start = (duration_ms as f32 * travelled) as i64;
            (now - head_start, Vec2::ZERO)
        } else {
            (now, displacement)
        };

        self.start_animation(AnimationState::SwappingTiles {
            dragged,
            replaced,
            start_displacement,
            swap_back,
            clock: AnimationClock::new(start_ms, duration_ms),
        });
        Ok(())
    }

    /// Swap two tiles. Resets the drag session, selection included.
    pub fn swap_tiles(
        &mut self,
        a: TilePos,
        b: TilePos,
        duration_ms: u32,
        swap_back: bool,
    ) -> Result<(), RequestError> {
        if let Err(err) = self.ensure_idle() {
            warn!(%err, %a, %b, "swap_tiles rejected");
            return Err(err);
        }
        for tile in [a, b] {
            if !self.grid.contains(tile) {
                warn!(%tile, "swap_tiles rejected: tile out of range");
                return Err(RequestError::TileOutOfBounds(tile));
            }
        }

        self.drag.reset();
        self.start_animation(AnimationState::SwappingTiles {
            dragged: a,
            replaced: b,
            start_displacement: Vec2::ZERO,
            swap_back,
            clock: AnimationClock::new(self.game_time_ms as i64, duration_ms),
        });
        Ok(())
    }

    /// Forget the pending swap-back, and the speculative flag of a running swap.
    pub fn reset_swap_back(&mut self) {
        self.pending_swap_back = None;
        if let AnimationState::SwappingTiles { swap_back, .. } = &mut self.animation {
            *swap_back = false;
        }
    }

    /// Take the pending swap-back, clearing it.
    pub(crate) fn take_pending_swap_back(&mut self) -> Option<(TilePos, TilePos)> {
        self.pending_swap_back.take()
    }

    /// Animate the destruction of every masked cell.
    pub fn destroy_tiles(&mut self, mask: Vec<bool>, duration_ms: u32) -> Result<(), RequestError> {
        if mask.len() != self.grid.len() {
            let err = RequestError::MaskSizeMismatch {
                expected: self.grid.len(),
                actual: mask.len(),
            };
            warn!(%err, "destroy_tiles rejected");
            return Err(err);
        }
        if let Err(err) = self.ensure_idle() {
            warn!(%err, "destroy_tiles rejected");
            return Err(err);
        }
        if self.drag.is_active() {
            warn!("destroy_tiles while dragging; drag reset");
            self.drag.reset();
        }

        self.start_animation(AnimationState::DestroyingTiles {
            mask,
            clock: AnimationClock::new(self.game_time_ms as i64, duration_ms),
        });
        Ok(())
    }

    /// Collapse columns. The grid shifts now; the animation is visual only.
    pub fn collapse_columns(&mut self, plan: CollapsePlan, duration_ms: u32) -> Result<(), RequestError> {
        if !plan.fits(self.rows(), self.columns()) {
            let err = RequestError::PlanMismatch {
                rows: self.rows(),
                columns: self.columns(),
            };
            warn!(%err, "collapse_columns rejected");
            return Err(err);
        }
        if let Err(err) = self.ensure_idle() {
            warn!(%err, "collapse_columns rejected");
            return Err(err);
        }
        if self.drag.is_active() {
            warn!("collapse_columns while dragging; drag reset");
            self.drag.reset();
        }

        self.grid.apply_collapse(&plan, &mut self.rng);
        self.start_animation(AnimationState::CollapsingTiles {
            plan,
            clock: AnimationClock::new(self.game_time_ms as i64, duration_ms),
        });
        Ok(())
    }

    fn start_animation(&mut self, animation: AnimationState) {
        let kind = animation.kind();
        let duration_ms = animation.clock().map(|c| c.duration_ms).unwrap_or(0);
        debug!(?kind, duration_ms, time_ms = self.game_time_ms, "animation started");
        self.drag.select(None);
        self.animation = animation;
        self.push_event(GameEvent::animation_started(self.game_time_ms, kind, duration_ms));
    }

    // =========================================================================
    // Time
    // =========================================================================

    /// Advance both clocks by `delta_ms` and progress the active animation.
    ///
    /// Time inside an animation's allotted duration is not charged to the
    /// play clock; the part of the tick past its end is.
    pub fn elapse(&mut self, delta_ms: u32) {
        if self.animation.is_game_over() {
            return;
        }

        let dt = delta_ms as u64;
        self.game_time_ms += dt;
        self.gameplay_time_ms += dt;

        if let Some(clock) = self.animation.clock().copied() {
            let leftover = clock.remaining_ms(self.game_time_ms);
            self.gameplay_time_ms -= dt;
            if leftover < 0 {
                self.gameplay_time_ms += leftover.unsigned_abs().min(dt);
            }

            self.drag.select(None);

            let fraction = clock.fraction(self.game_time_ms);
            #[cfg(feature = "debug-tracing")]
            tracing::trace!(kind = ?self.animation_kind(), fraction, time_ms = self.game_time_ms, "animation tick");

            if fraction >= 1.0 {
                self.finish_animation();
            }
        }

        if self.gameplay_time_left() == 0 {
            self.enter_game_over();
        }
    }

    /// Apply the effect of the completed animation and notify observers.
    fn finish_animation(&mut self) {
        let finished = std::mem::take(&mut self.animation);
        let now = self.game_time_ms;

        let change = match finished {
            AnimationState::SwappingTiles { dragged, replaced, swap_back, .. } => {
                self.grid.swap(dragged, replaced);
                if swap_back {
                    self.pending_swap_back = Some((dragged, replaced));
                }
                self.push_event(GameEvent::tiles_swapped(now, dragged, replaced, swap_back));
                GridChange::Swapped { a: dragged, b: replaced }
            }
            AnimationState::DestroyingTiles { mask, .. } => {
                let count = self.grid.mark_destroyed(&mask);
                self.push_event(GameEvent::new(now, GameEventData::TilesDestroyed { count }));
                GridChange::Destroyed { count }
            }
            AnimationState::CollapsingTiles { plan, .. } => {
                let removed = plan.removed_count();
                self.push_event(GameEvent::new(now, GameEventData::ColumnsCollapsed { removed }));
                GridChange::Collapsed { removed }
            }
            other => {
                self.animation = other;
                return;
            }
        };

        debug!(?change, time_ms = now, "animation finished");
        self.observers.notify(&change);
    }

    fn enter_game_over(&mut self) {
        self.animation = AnimationState::GameOver;
        self.drag.reset();
        self.pending_swap_back = None;
        info!(score = self.score, time_ms = self.game_time_ms, "game over");
        self.push_event(GameEvent::game_over(self.game_time_ms, self.score));
    }

    // =========================================================================
    // Observers, score, events
    // =========================================================================

    /// Subscribe to grid changes.
    pub fn attach_observer(&mut self, observer: Weak<dyn GridChangeObserver>) {
        self.observers.attach(observer);
    }

    /// Add points to the score.
    pub(crate) fn add_to_score(&mut self, points: u32) {
        if points == 0 {
            return;
        }
        self.score += points;
        self.push_event(GameEvent::score_changed(self.game_time_ms, points, self.score));
    }

    /// Mutable board access for test setup.
    #[cfg(test)]
    pub(crate) fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    /// Push an event to the pending list.
    pub fn push_event(&mut self, event: GameEvent) {
        self.pending_events.push(event);
    }

    /// Take all pending events.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.pending_events)
    }
}

// =============================================================================
// TESTS
// =============================================================================
