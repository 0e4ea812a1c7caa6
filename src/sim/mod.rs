//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only (one call to `tick` = one step)
//! - Seeded RNG only
//! - Stable iteration order (active-piece index order is fusion priority)
//! - No rendering or platform dependencies

pub mod collision;
pub mod monitor;
pub mod piece;
pub mod rank;
pub mod spawner;
pub mod state;
pub mod tick;

pub use collision::{CollisionResult, Fusion, circle_circle, resolve_collisions};
pub use monitor::find_danger_crossing;
pub use piece::{Piece, PopCurve};
pub use rank::{Rank, RankSpec, RankTable};
pub use spawner::{Spawner, spawn_held_piece};
pub use state::{
    DropOutcome, GamePhase, PieceView, Session, SimEvent, Simulation, Snapshot, SuppressReason,
};
pub use tick::{AUTOPLAY_OFFSETS, TickInput, autoplay_drop_x, step};
