//! Input Handling
//!
//! Pointer events in screen space, the screen-to-grid transform, and the
//! glue that feeds them to the drag interpreter.

use serde::{Serialize, Deserialize};
use tracing::debug;

use crate::core::vec2::Vec2;
use crate::game::drag::{classify_release, ReleaseAction};
use crate::game::state::GameState;

// =============================================================================
// SCREEN TO GRID
// =============================================================================

/// Maps screen coordinates onto normalized grid coordinates.
///
/// (0, 0) is the top-left corner of the board and (1, 1) the bottom-right;
/// points off the board map outside the unit square.
pub trait ScreenToGrid {
    /// Convert a screen position to grid space.
    fn grid_coordinates(&self, x: f32, y: f32) -> Vec2;
}

/// Window size plus the fractions of it the board occupies.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardViewport {
    /// Window width in pixels
    pub width: f32,
    /// Window height in pixels
    pub height: f32,
    /// Left board edge as a fraction of the width
    pub grid_left: f32,
    /// Right board edge as a fraction of the width
    pub grid_right: f32,
    /// Top board edge as a fraction of the height
    pub grid_top: f32,
    /// Bottom board edge as a fraction of the height
    pub grid_bottom: f32,
}

impl Default for BoardViewport {
    fn default() -> Self {
        Self {
            width: 755.0,
            height: 600.0,
            grid_left: 0.42,
            grid_right: 0.9,
            grid_top: 0.15,
            grid_bottom: 0.755,
        }
    }
}

impl BoardViewport {
    /// True if the window and the board span a positive, finite area.
    pub fn is_mappable(&self) -> bool {
        let spans = [
            (0.0, self.width),
            (0.0, self.height),
            (self.grid_left, self.grid_right),
            (self.grid_top, self.grid_bottom),
        ];
        spans.iter().all(|&(low, high)| low.is_finite() && high.is_finite() && high > low)
    }

    /// Inverse of [`ScreenToGrid::grid_coordinates`].
    pub fn screen_coordinates(&self, point: Vec2) -> (f32, f32) {
        let x = (self.grid_left + point.x * (self.grid_right - self.grid_left)) * self.width;
        let y = (self.grid_top + point.y * (self.grid_bottom - self.grid_top)) * self.height;
        (x, y)
    }
}

impl ScreenToGrid for BoardViewport {
    fn grid_coordinates(&self, x: f32, y: f32) -> Vec2 {
        let gx = (x / self.width - self.grid_left) / (self.grid_right - self.grid_left);
        let gy = (y / self.height - self.grid_top) / (self.grid_bottom - self.grid_top);
        Vec2::new(gx, gy)
    }
}

// =============================================================================
// EVENTS
// =============================================================================

/// Pointer event in screen coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    /// Button pressed
    Down {
        /// Screen x
        x: f32,
        /// Screen y
        y: f32,
    },
    /// Pointer moved
    Move {
        /// Screen x
        x: f32,
        /// Screen y
        y: f32,
    },
    /// Button released
    Up {
        /// Screen x
        x: f32,
        /// Screen y
        y: f32,
    },
}

impl PointerEvent {
    /// Screen position of the event.
    pub fn position(&self) -> (f32, f32) {
        match *self {
            PointerEvent::Down { x, y } | PointerEvent::Move { x, y } | PointerEvent::Up { x, y } => (x, y),
        }
    }
}

/// Anything the frame loop can feed the game.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    /// Mouse or touch input
    Pointer(PointerEvent),
    /// Window closed or quit requested
    Quit,
}

/// Input recorded for a single frame.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct InputFrame {
    /// Time elapsed since the previous frame (ms)
    pub delta_ms: u32,
    /// Events delivered before the frame's update
    pub events: Vec<InputEvent>,
}

impl InputFrame {
    /// Frame without input.
    pub fn idle(delta_ms: u32) -> Self {
        Self { delta_ms, events: Vec::new() }
    }

    /// Frame carrying pointer events.
    pub fn with_pointer(delta_ms: u32, events: impl IntoIterator<Item = PointerEvent>) -> Self {
        Self {
            delta_ms,
            events: events.into_iter().map(InputEvent::Pointer).collect(),
        }
    }

    #[inline]
    pub fn is_idle(&self) -> bool {
        self.events.is_empty()
    }

    /// True if the frame asks to quit.
    pub fn quit_requested(&self) -> bool {
        self.events.contains(&InputEvent::Quit)
    }
}

// =============================================================================
// POINTER HANDLING
// =============================================================================

/// Feed one pointer event to the drag interpreter.
///
/// Ignored unless the state is idle. Returns the release classification
/// for pointer-up events that closed a drag.
pub fn handle_pointer(
    state: &mut GameState,
    event: PointerEvent,
    transform: &impl ScreenToGrid,
) -> Option<ReleaseAction> {
    if !state.animation().is_idle() {
        return None;
    }

    let (x, y) = event.position();
    let point = transform.grid_coordinates(x, y);

    match event {
        PointerEvent::Down { .. } => {
            // Rejections are logged by the state
            let _ = state.set_drag_start_location(point);
            None
        }
        PointerEvent::Move { .. } => {
            if state.is_drag_active() {
                let _ = state.set_drag_current_location(point);
            }
            None
        }
        PointerEvent::Up { .. } => {
            if !state.is_drag_active() {
                return None;
            }
            let _ = state.set_drag_current_location(point);

            let released_on = state.grid().tile_at(point);
            let action = classify_release(state.drag(), released_on, state.rows(), state.columns());
            let duration_ms = state.config().animation_duration_ms;
            debug!(?action, %point, "pointer released");

            let _ = match action {
                ReleaseAction::SwapDragged => state.swap_dragged_and_replaced_tiles(duration_ms, true, true),
                ReleaseAction::SwapWithSelected { tapped, selected } => {
                    state.swap_tiles(tapped, selected, duration_ms, true)
                }
                ReleaseAction::Select(tile) => state.select_tile(tile),
                ReleaseAction::Ignore => Ok(()),
            };
            state.deactivate_drag();
            Some(action)
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::game::animation::{AnimationKind, AnimationState};
    use crate::game::grid::{Grid, TilePos};

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    fn game() -> GameState {
        let grid = Grid::parse("RGBY GBYR BYRG YRGB").unwrap();
        let config = GameConfig { rows: 4, columns: 4, ..GameConfig::default() };
        GameState::with_grid(config, grid).unwrap()
    }

    /// Screen position of a tile center under the default viewport.
    fn tile_center(row: usize, column: usize) -> (f32, f32) {
        BoardViewport::default().screen_coordinates(Vec2::new(
            (column as f32 + 0.5) / 4.0,
            (row as f32 + 0.5) / 4.0,
        ))
    }

    #[test]
    fn test_default_viewport_corners() {
        let viewport = BoardViewport::default();

        let top_left = viewport.grid_coordinates(0.42 * 755.0, 0.15 * 600.0);
        assert!(close(top_left.x, 0.0) && close(top_left.y, 0.0));

        let bottom_right = viewport.grid_coordinates(0.9 * 755.0, 0.755 * 600.0);
        assert!(close(bottom_right.x, 1.0) && close(bottom_right.y, 1.0));

        // Window origin is off the board
        assert!(!viewport.grid_coordinates(0.0, 0.0).is_normalized());
    }

    #[test]
    fn test_screen_round_trip() {
        let viewport = BoardViewport::default();
        let (x, y) = viewport.screen_coordinates(Vec2::new(0.25, 0.75));
        let back = viewport.grid_coordinates(x, y);
        assert!(close(back.x, 0.25) && close(back.y, 0.75));
    }

    #[test]
    fn test_drag_gesture_starts_swap() {
        let viewport = BoardViewport::default();
        let mut state = game();
        let (x0, y0) = tile_center(1, 1);
        let (x1, y1) = tile_center(1, 2);

        handle_pointer(&mut state, PointerEvent::Down { x: x0, y: y0 }, &viewport);
        handle_pointer(&mut state, PointerEvent::Move { x: x1, y: y1 }, &viewport);
        let action = handle_pointer(&mut state, PointerEvent::Up { x: x1, y: y1 }, &viewport);

        assert_eq!(action, Some(ReleaseAction::SwapDragged));
        assert!(!state.is_drag_active());
        match state.animation() {
            AnimationState::SwappingTiles { dragged, replaced, swap_back, .. } => {
                assert_eq!(*dragged, TilePos::new(1, 1));
                assert_eq!(*replaced, TilePos::new(1, 2));
                assert!(*swap_back);
            }
            other => panic!("expected a swap, got {:?}", other),
        }
        // About a full cell was dragged, so the swap is nearly done
        assert!(state.animation_percentage() > 0.9);
    }

    #[test]
    fn test_tap_select_then_tap_neighbour() {
        let viewport = BoardViewport::default();
        let mut state = game();
        let (x0, y0) = tile_center(2, 2);
        let (x1, y1) = tile_center(2, 3);

        handle_pointer(&mut state, PointerEvent::Down { x: x0, y: y0 }, &viewport);
        let action = handle_pointer(&mut state, PointerEvent::Up { x: x0, y: y0 }, &viewport);
        assert_eq!(action, Some(ReleaseAction::Select(TilePos::new(2, 2))));
        assert_eq!(state.selected_tile(), Some(TilePos::new(2, 2)));

        handle_pointer(&mut state, PointerEvent::Down { x: x1, y: y1 }, &viewport);
        let action = handle_pointer(&mut state, PointerEvent::Up { x: x1, y: y1 }, &viewport);
        assert_eq!(
            action,
            Some(ReleaseAction::SwapWithSelected {
                tapped: TilePos::new(2, 3),
                selected: TilePos::new(2, 2),
            })
        );
        assert_eq!(state.animation_kind(), AnimationKind::SwappingTiles);
        assert!(state.is_swap_back());
        assert_eq!(state.selected_tile(), None);
    }

    #[test]
    fn test_input_ignored_while_animating() {
        let viewport = BoardViewport::default();
        let mut state = game();
        state.destroy_tiles(vec![false; 16], 500).unwrap();

        let (x, y) = tile_center(0, 0);
        handle_pointer(&mut state, PointerEvent::Down { x, y }, &viewport);
        assert!(!state.is_drag_active());
    }

    #[test]
    fn test_press_outside_board_is_rejected() {
        let viewport = BoardViewport::default();
        let mut state = game();
        handle_pointer(&mut state, PointerEvent::Down { x: 5.0, y: 5.0 }, &viewport);
        assert!(!state.is_drag_active());
        assert_eq!(handle_pointer(&mut state, PointerEvent::Up { x: 5.0, y: 5.0 }, &viewport), None);
    }

    #[test]
    fn test_input_frame_helpers() {
        let frame = InputFrame::with_pointer(16, [PointerEvent::Down { x: 1.0, y: 2.0 }]);
        assert!(!frame.is_idle());
        assert!(!frame.quit_requested());
        assert!(InputFrame::idle(16).is_idle());

        let quit = InputFrame { delta_ms: 16, events: vec![InputEvent::Quit] };
        assert!(quit.quit_requested());
    }
}
