//! Reconciliation Loop
//!
//! After every completed grid mutation the board is re-examined and the next
//! animation is requested: collapse holes first, then destroy matches, then
//! undo a speculative swap that matched nothing.

use std::cell::Cell;
use std::rc::Rc;
use tracing::{debug, warn};

use crate::game::events::{GridChange, GridChangeObserver};
use crate::game::grid::{CollapsePlan, TilePos};
use crate::game::state::GameState;

// =============================================================================
// DIRTY SIGNAL
// =============================================================================

/// One-shot flag armed by grid-change notifications.
#[derive(Debug, Default)]
pub struct DirtySignal {
    dirty: Cell<bool>,
}

impl DirtySignal {
    /// Create an unarmed signal.
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Arm the signal by hand.
    #[inline]
    pub fn arm(&self) {
        self.dirty.set(true);
    }

    /// Is a pass pending?
    #[inline]
    pub fn is_armed(&self) -> bool {
        self.dirty.get()
    }

    /// Clear the flag, returning whether it was set.
    #[inline]
    pub fn take(&self) -> bool {
        self.dirty.replace(false)
    }
}

impl GridChangeObserver for DirtySignal {
    fn on_grid_changed(&self, _change: &GridChange) {
        self.dirty.set(true);
    }
}

// =============================================================================
// DECISION
// =============================================================================

/// Next step of a cascade.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReconcileAction {
    /// Close holes left by destroyed tiles
    Collapse(CollapsePlan),
    /// Destroy every matched tile
    Destroy(Vec<bool>),
    /// Undo a speculative swap that matched nothing
    SwapBack(TilePos, TilePos),
    /// Nothing to do
    Settled,
}

/// Inspect the board and pick the next action.
pub fn decide(state: &GameState) -> ReconcileAction {
    let grid = state.grid();

    if grid.has_destroyed() {
        return ReconcileAction::Collapse(CollapsePlan::from_grid(grid));
    }

    let mask = grid.matches_of_n(state.config().min_match_size);
    if mask.iter().any(|m| *m) {
        return ReconcileAction::Destroy(mask);
    }

    match state.pending_swap_back() {
        Some((a, b)) => ReconcileAction::SwapBack(a, b),
        None => ReconcileAction::Settled,
    }
}

/// Issue the request for `action`. Returns true if an animation started.
pub fn apply(state: &mut GameState, action: ReconcileAction) -> bool {
    let duration_ms = state.config().animation_duration_ms;

    match action {
        ReconcileAction::Collapse(plan) => {
            let removed = plan.removed_count();
            match state.collapse_columns(plan, duration_ms) {
                Ok(()) => {
                    state.add_to_score(removed);
                    true
                }
                Err(_) => false,
            }
        }
        ReconcileAction::Destroy(mask) => {
            state.reset_swap_back();
            state.destroy_tiles(mask, duration_ms).is_ok()
        }
        ReconcileAction::SwapBack(a, b) => {
            state.take_pending_swap_back();
            state.swap_tiles(b, a, duration_ms, false).is_ok()
        }
        ReconcileAction::Settled => false,
    }
}

// =============================================================================
// RECONCILER
// =============================================================================

/// Outcome of one reconciliation pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Iterations run
    pub steps: u32,
    /// Animations requested
    pub requests: u32,
    /// Stopped by the step cap with work still pending
    pub capped: bool,
}

/// Drives the cascade from a [`DirtySignal`] attached to a game.
#[derive(Debug)]
pub struct Reconciler {
    signal: Rc<DirtySignal>,
}

impl Reconciler {
    /// Create a reconciler and subscribe it to `state`.
    pub fn attach(state: &mut GameState) -> Self {
        let signal = DirtySignal::new();
        let observer: Rc<dyn GridChangeObserver> = signal.clone();
        state.attach_observer(Rc::downgrade(&observer));
        Self { signal }
    }

    /// True while a completed mutation has not been reconciled.
    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.signal.is_armed()
    }

    /// Force a pass on the next `run`, e.g. for a board supplied with matches.
    #[inline]
    pub fn request_pass(&self) {
        self.signal.arm();
    }

    /// Run the loop while the signal is armed, up to `max_cascade_steps`.
    ///
    /// With zero-length animations each request completes immediately, so a
    /// whole cascade resolves within one call.
    pub fn run(&self, state: &mut GameState) -> ReconcileReport {
        let mut report = ReconcileReport::default();
        if state.animation().is_game_over() {
            return report;
        }

        let max_steps = state.config().max_cascade_steps;
        let instant = state.config().animation_duration_ms == 0;

        while self.signal.is_armed() {
            if report.steps >= max_steps {
                warn!(steps = report.steps, "cascade step cap reached; resuming next update");
                report.capped = true;
                break;
            }
            self.signal.take();
            report.steps += 1;

            let action = decide(state);
            debug!(?action, step = report.steps, "reconcile");
            if apply(state, action) {
                report.requests += 1;
                if instant {
                    state.elapse(0);
                }
            }
        }

        report
    }
}

// =============================================================================
// TESTS
// =============================================================================
