//! Core deterministic primitives.
//!
//! Seeded randomness, grid-space vectors and state hashing.
//! Everything above this layer is reproducible from a seed and an input log.

pub mod vec2;
pub mod rng;
pub mod hash;

// Re-export core types
pub use vec2::Vec2;
pub use rng::DeterministicRng;
pub use hash::{compute_state_hash, StateHash, StateHasher};
