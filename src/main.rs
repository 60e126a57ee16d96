//! Tile Swap Demo
//!
//! Headless stand-in for the frame loop: a bot plays one game through pointer
//! events, then the recorded input is replayed to verify determinism.

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use tile_swap::{
    VERSION,
    config::GameConfig,
    core::{rng::DeterministicRng, vec2::Vec2},
    game::{
        grid::{Grid, TilePos},
        input::{InputEvent, InputFrame, PointerEvent},
        tick::{replay_game, GameLogic},
    },
};

/// Frame length of the simulated loop (ms)
const FRAME_MS: u32 = 16;

/// Hard stop for the demo loop (about 10 minutes of frames)
const MAX_FRAMES: u32 = 40_000;

/// Idle frames the bot waits between moves
const THINK_FRAMES: u32 = 20;

fn main() -> Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    let config = match std::env::args().nth(1) {
        Some(path) => GameConfig::from_json_file(&path)
            .with_context(|| format!("failed to load config from {}", path))?,
        None => GameConfig::with_seed(12345),
    };

    info!("Tile Swap v{}", VERSION);
    info!(
        "Board: {}x{}, match {}, {} s, {} ms animations",
        config.rows,
        config.columns,
        config.min_match_size,
        config.max_gameplay_seconds,
        config.animation_duration_ms
    );

    demo_game(config)
}

/// Play one bot game, then replay it.
fn demo_game(config: GameConfig) -> Result<()> {
    info!("=== Starting Demo Game ===");
    info!("RNG Seed: {}", config.seed);

    let mut logic = GameLogic::new(config.clone()).context("invalid game config")?;
    info!("Initial board:\n{}", logic.state().grid());

    let mut bot = DeterministicRng::new(config.seed ^ 0xB07);
    let mut recording: Vec<InputFrame> = Vec::new();
    let mut cooldown = THINK_FRAMES;
    let mut moves = 0u32;

    for frame_index in 0..MAX_FRAMES {
        let mut frame = InputFrame::idle(FRAME_MS);

        let ready = logic.state().animation().is_idle() && !logic.is_reconciling();
        if ready {
            if cooldown == 0 {
                frame.events = bot_move(&logic, &mut bot)
                    .into_iter()
                    .map(InputEvent::Pointer)
                    .collect();
                moves += 1;
                cooldown = THINK_FRAMES;
            } else {
                cooldown -= 1;
            }
        }

        let result = logic.frame(&frame);
        recording.push(frame);

        if result.points() > 0 {
            info!(
                "t={:>6} ms: +{} (score {}, {} s left)",
                logic.state().game_time_ms(),
                result.points(),
                logic.state().score(),
                logic.state().gameplay_time_left()
            );
        }
        if result.cascade_capped {
            warn!("frame {}: cascade capped", frame_index);
        }
        if result.game_over {
            info!("Game over at frame {}", frame_index);
            break;
        }
    }

    // Print final results
    info!("=== Game Results ===");
    let state = logic.state();
    let hash = state.compute_hash();
    info!("Moves: {}", moves);
    info!("Final score: {}", state.score());
    info!("Final board:\n{}", state.grid());
    info!("Final State Hash: {}", hex::encode(hash));

    let snapshot = serde_json::to_string_pretty(&state.snapshot())
        .context("failed to serialize snapshot")?;
    println!("{}", snapshot);

    // Verify determinism by replaying the encoded recording
    info!("=== Verifying Determinism ===");
    let encoded = bincode::serialize(&recording).context("failed to encode recording")?;
    info!("Recording: {} frames, {} bytes", recording.len(), encoded.len());
    let decoded: Vec<InputFrame> =
        bincode::deserialize(&encoded).context("failed to decode recording")?;

    let (replayed, events) = replay_game(config, &decoded).context("replay failed")?;
    let replay_hash = replayed.state().compute_hash();
    info!("Replay State Hash: {} ({} events)", hex::encode(replay_hash), events.len());

    if hash == replay_hash {
        info!("DETERMINISM VERIFIED: Hashes match!");
        Ok(())
    } else {
        anyhow::bail!("DETERMINISM FAILURE: Hashes differ!")
    }
}

/// Pick a move and express it as a pointer drag.
///
/// Prefers a swap that lines up a match; otherwise drags a random tile.
fn bot_move(logic: &GameLogic, rng: &mut DeterministicRng) -> Vec<PointerEvent> {
    let state = logic.state();
    let grid = state.grid();
    let rows = grid.rows();
    let columns = grid.columns();

    let (from, to) = find_matching_swap(grid, state.config().min_match_size, rng)
        .unwrap_or_else(|| random_swap(rows, columns, rng));

    let viewport = state.config().viewport;
    let center = |tile: TilePos| {
        Vec2::new(
            (tile.column as f32 + 0.5) / columns as f32,
            (tile.row as f32 + 0.5) / rows as f32,
        )
    };
    let (x0, y0) = viewport.screen_coordinates(center(from));
    let (x1, y1) = viewport.screen_coordinates(center(to));

    vec![
        PointerEvent::Down { x: x0, y: y0 },
        PointerEvent::Move { x: (x0 + x1) / 2.0, y: (y0 + y1) / 2.0 },
        PointerEvent::Move { x: x1, y: y1 },
        PointerEvent::Up { x: x1, y: y1 },
    ]
}

/// First right/down swap, from a random starting cell, that creates a match.
fn find_matching_swap(grid: &Grid, n: usize, rng: &mut DeterministicRng) -> Option<(TilePos, TilePos)> {
    let rows = grid.rows();
    let columns = grid.columns();
    let total = grid.len();
    if total == 0 {
        return None;
    }
    let offset = rng.next_int(total as u32) as usize;

    for step in 0..total {
        let index = (offset + step) % total;
        let from = TilePos::new(index / columns, index % columns);
        let neighbours = [
            (from.column + 1 < columns).then(|| TilePos::new(from.row, from.column + 1)),
            (from.row + 1 < rows).then(|| TilePos::new(from.row + 1, from.column)),
        ];

        for to in neighbours.into_iter().flatten() {
            let mut cells = grid.cells().to_vec();
            cells.swap(from.row * columns + from.column, to.row * columns + to.column);
            let Ok(trial) = Grid::from_cells(rows, columns, cells) else { continue };
            if trial.matches_of_n(n).iter().any(|m| *m) {
                return Some((from, to));
            }
        }
    }

    None
}

/// Any adjacent pair.
fn random_swap(rows: usize, columns: usize, rng: &mut DeterministicRng) -> (TilePos, TilePos) {
    let row = rng.next_int(rows as u32) as usize;
    let column = rng.next_int(columns as u32) as usize;
    let from = TilePos::new(row, column);

    let to = if column + 1 < columns {
        TilePos::new(row, column + 1)
    } else if row + 1 < rows {
        TilePos::new(row + 1, column)
    } else if column > 0 {
        TilePos::new(row, column - 1)
    } else {
        TilePos::new(row.saturating_sub(1), column)
    };

    (from, to)
}
