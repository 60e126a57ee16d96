//! Frame Driver
//!
//! Input then Update, once per frame. Update advances the clocks and runs the
//! reconciliation loop. Given a seed and the recorded frames, a game replays
//! bit-for-bit.

use tracing::info;

use crate::config::{ConfigError, GameConfig};
use crate::game::drag::ReleaseAction;
use crate::game::events::{GameEvent, GameEventData};
use crate::game::input::{handle_pointer, InputEvent, InputFrame};
use crate::game::reconcile::Reconciler;
use crate::game::state::GameState;

/// Result of one update.
#[derive(Debug, Default)]
pub struct TickResult {
    /// Events generated since the previous update
    pub events: Vec<GameEvent>,
    /// Whether the game is over
    pub game_over: bool,
    /// Reconciliation iterations run
    pub cascade_steps: u32,
    /// Reconciliation stopped at the step cap
    pub cascade_capped: bool,
}

impl TickResult {
    /// Points scored during this update.
    pub fn points(&self) -> u32 {
        self.events
            .iter()
            .map(|e| match e.data {
                GameEventData::ScoreChanged { points, .. } => points,
                _ => 0,
            })
            .sum()
    }
}

/// Game state plus its reconciliation loop.
#[derive(Debug)]
pub struct GameLogic {
    state: GameState,
    reconciler: Reconciler,
    quit: bool,
}

impl GameLogic {
    /// New game from a configuration.
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        Ok(Self::from_state(GameState::new(config)?))
    }

    /// Wrap an existing state. The first update checks the board once.
    pub fn from_state(mut state: GameState) -> Self {
        let reconciler = Reconciler::attach(&mut state);
        reconciler.request_pass();
        Self {
            state,
            reconciler,
            quit: false,
        }
    }

    /// Game state (read-only).
    #[inline]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Game state (mutable), for direct requests.
    #[inline]
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    /// Has a quit been requested?
    #[inline]
    pub fn quit_requested(&self) -> bool {
        self.quit
    }

    /// True while a cascade is still being reconciled.
    #[inline]
    pub fn is_reconciling(&self) -> bool {
        self.reconciler.is_dirty()
    }

    /// Deliver one input event.
    ///
    /// Pointer events are ignored after game over and while a cascade is
    /// pending reconciliation.
    pub fn input(&mut self, event: InputEvent) -> Option<ReleaseAction> {
        match event {
            InputEvent::Quit => {
                self.quit = true;
                None
            }
            InputEvent::Pointer(pointer) => {
                if self.state.animation().is_game_over() || self.reconciler.is_dirty() {
                    return None;
                }
                let viewport = self.state.config().viewport;
                handle_pointer(&mut self.state, pointer, &viewport)
            }
        }
    }

    /// Advance the game by `delta_ms` and reconcile the board.
    pub fn update(&mut self, delta_ms: u32) -> TickResult {
        let mut result = TickResult::default();

        self.state.elapse(delta_ms);

        if !self.state.animation().is_game_over() {
            let report = self.reconciler.run(&mut self.state);
            result.cascade_steps = report.steps;
            result.cascade_capped = report.capped;
        }

        result.game_over = self.state.animation().is_game_over();
        result.events = self.state.take_events();
        result
    }

    /// Deliver a recorded frame: its events, then one update.
    pub fn frame(&mut self, frame: &InputFrame) -> TickResult {
        for event in &frame.events {
            self.input(*event);
        }
        self.update(frame.delta_ms)
    }

    /// Start a new round with the same configuration.
    pub fn restart(&mut self) {
        self.state.restart();
        self.reconciler.request_pass();
        self.quit = false;
    }
}

/// Replay recorded frames from a fresh game.
///
/// Stops early at game over or quit. Returns the final game and all events.
pub fn replay_game(
    config: GameConfig,
    frames: &[InputFrame],
) -> Result<(GameLogic, Vec<GameEvent>), ConfigError> {
    let mut logic = GameLogic::new(config)?;
    let mut all_events = Vec::new();

    for frame in frames {
        let result = logic.frame(frame);
        all_events.extend(result.events);

        if result.game_over || logic.quit_requested() {
            break;
        }
    }

    info!(
        frames = frames.len(),
        events = all_events.len(),
        score = logic.state().score(),
        "replay finished"
    );
    Ok((logic, all_events))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::vec2::Vec2;
    use crate::game::animation::AnimationKind;
    use crate::game::grid::Grid;
    use crate::game::input::PointerEvent;

    /// Pointer events dragging the tile at `(row, column)` one cell right.
    fn drag_right(logic: &GameLogic, row: usize, column: usize) -> Vec<PointerEvent> {
        let viewport = logic.state().config().viewport;
        let rows = logic.state().rows() as f32;
        let columns = logic.state().columns() as f32;
        let start = Vec2::new((column as f32 + 0.5) / columns, (row as f32 + 0.5) / rows);
        let end = start + Vec2::new(1.0 / columns, 0.0);
        let (x0, y0) = viewport.screen_coordinates(start);
        let (x1, y1) = viewport.screen_coordinates(end);
        vec![
            PointerEvent::Down { x: x0, y: y0 },
            PointerEvent::Move { x: x1, y: y1 },
            PointerEvent::Up { x: x1, y: y1 },
        ]
    }

    fn scripted_frames(logic: &GameLogic) -> Vec<InputFrame> {
        let mut frames = Vec::new();
        for i in 0..40 {
            let row = i % 8;
            let column = (i * 3) % 7;
            frames.push(InputFrame::with_pointer(16, drag_right(logic, row, column)));
            for _ in 0..90 {
                frames.push(InputFrame::idle(16));
            }
        }
        frames
    }

    #[test]
    fn test_replay_determinism() {
        let config = GameConfig::with_seed(99);
        let logic = GameLogic::new(config.clone()).unwrap();
        let frames = scripted_frames(&logic);

        let (final1, events1) = replay_game(config.clone(), &frames).unwrap();
        let (final2, events2) = replay_game(config, &frames).unwrap();

        assert_eq!(final1.state().compute_hash(), final2.state().compute_hash());
        assert_eq!(final1.state().score(), final2.state().score());
        assert_eq!(events1, events2);
    }

    #[test]
    fn test_different_seeds_diverge() {
        let a = GameLogic::new(GameConfig::with_seed(1)).unwrap();
        let b = GameLogic::new(GameConfig::with_seed(2)).unwrap();
        assert_ne!(a.state().compute_hash(), b.state().compute_hash());
    }

    #[test]
    fn test_game_ends_when_clock_runs_out() {
        let mut logic = GameLogic::new(GameConfig::with_seed(5)).unwrap();
        let mut ended_at = None;

        for frame in 0..4000u32 {
            let result = logic.update(16);
            if result.game_over {
                ended_at = Some(frame);
                assert!(result.events.iter().any(|e| matches!(e.data, GameEventData::GameOver { .. })));
                break;
            }
        }

        // 60 s of idle play at 16 ms per frame
        assert_eq!(ended_at, Some(3749));
        assert_eq!(logic.state().gameplay_time_left(), 0);

        // Later updates do nothing
        let time = logic.state().game_time_ms();
        let result = logic.update(16);
        assert!(result.game_over);
        assert!(result.events.is_empty());
        assert_eq!(logic.state().game_time_ms(), time);
    }

    #[test]
    fn test_swap_round_trip_through_frames() {
        let grid = Grid::parse("RGBY GBYR BYRG YRGB").unwrap();
        let config = GameConfig { rows: 4, columns: 4, ..GameConfig::default() };
        let mut logic = GameLogic::from_state(GameState::with_grid(config, grid).unwrap());
        let original = logic.state().grid().to_string();

        // First update only checks the supplied board
        let result = logic.update(0);
        assert_eq!(result.cascade_steps, 1);

        // The drag covered a full cell, so the swap lands within this frame;
        // it matches nothing and the swap-back starts in the same update
        let frame = InputFrame::with_pointer(16, drag_right(&logic, 0, 0));
        let result = logic.frame(&frame);
        assert_eq!(result.cascade_steps, 1);
        assert!(result.events.iter().any(|e| matches!(
            e.data,
            GameEventData::TilesSwapped { swap_back: true, .. }
        )));
        assert_eq!(logic.state().animation_kind(), AnimationKind::SwappingTiles);
        assert!(!logic.state().is_swap_back());

        logic.update(500);
        assert_eq!(logic.state().animation_kind(), AnimationKind::Idle);
        assert_eq!(logic.state().grid().to_string(), original);
        assert_eq!(logic.state().score(), 0);
    }

    #[test]
    fn test_input_ignored_while_reconciling() {
        let grid = Grid::parse("RRRG GBYP YPGB BGPY").unwrap();
        let config = GameConfig {
            rows: 4,
            columns: 4,
            animation_duration_ms: 0,
            max_cascade_steps: 1,
            ..GameConfig::default()
        };
        let mut logic = GameLogic::from_state(GameState::with_grid(config, grid).unwrap());

        let result = logic.update(0);
        assert!(result.cascade_capped);
        assert!(logic.is_reconciling());

        for event in drag_right(&logic, 3, 0) {
            assert_eq!(logic.input(InputEvent::Pointer(event)), None);
        }
        assert!(!logic.state().is_drag_active());
    }

    #[test]
    fn test_quit_stops_replay() {
        let config = GameConfig::with_seed(3);
        let frames = vec![
            InputFrame::idle(16),
            InputFrame { delta_ms: 16, events: vec![InputEvent::Quit] },
            InputFrame::idle(16),
        ];
        let (logic, _) = replay_game(config, &frames).unwrap();
        assert!(logic.quit_requested());
        assert_eq!(logic.state().game_time_ms(), 32);
    }

    #[test]
    fn test_points_sum_score_events() {
        let grid = Grid::parse("RRRG GBYP YPGB BGPY").unwrap();
        let config = GameConfig {
            rows: 4,
            columns: 4,
            animation_duration_ms: 0,
            ..GameConfig::default()
        };
        let mut logic = GameLogic::from_state(GameState::with_grid(config, grid).unwrap());
        let result = logic.update(0);
        assert_eq!(result.points(), logic.state().score());
        assert!(logic.state().score() >= 3);
    }
}
