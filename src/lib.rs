//! Fruity Merge - a falling-fruit merge game simulation
//!
//! Core modules:
//! - `sim`: Deterministic simulation (gravity, containment, collisions, fusion)
//! - `config`: Data-driven well geometry, physics tuning and rank table
//!
//! Rendering, audio and input capture live outside this crate; they drive
//! [`sim::Simulation`] through `request_drop`, `tick`, `snapshot` and `reset`.

pub mod config;
pub mod sim;

pub use config::{ConfigError, SimConfig};
pub use sim::{DropOutcome, SimEvent, Simulation, Snapshot};

/// Reference tuning values (one tick = one frame at 60 Hz)
pub mod consts {
    /// Simulation rate driven by the external frame clock
    pub const TICK_HZ: u32 = 60;
    /// Maximum ticks per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;

    /// Base length unit the rank radii are expressed in
    pub const UNIT: f32 = 12.0;

    /// Well dimensions (well-local, y grows downward)
    pub const WELL_WIDTH: f32 = 244.0; // int(20.4 * UNIT)
    pub const WELL_HEIGHT: f32 = 382.0; // int(31.9 * UNIT)
    /// Pieces settled with their top edge at or above this line end the run
    pub const DANGER_LINE: f32 = 60.0;
    /// Height at which dropped pieces appear
    pub const SPAWN_Y: f32 = 30.0;

    /// Downward acceleration per tick
    pub const GRAVITY: f32 = 0.3;
    /// Per-tick velocity multiplier applied to both axes
    pub const DAMPING: f32 = 0.95;
    /// Velocity components below this magnitude snap to zero
    pub const REST_EPSILON: f32 = 0.05;
    /// Velocity multiplier applied to both pieces of a separated contact
    pub const CONTACT_DAMPING: f32 = 0.9;
    /// Pairwise relaxation passes per tick
    pub const RELAXATION_PASSES: u32 = 3;

    /// Ticks between accepted drops
    pub const DROP_COOLDOWN_TICKS: u32 = 15;
    /// Ticks after creation during which a piece cannot end the run
    pub const GRACE_TICKS: u32 = 60;
    /// Length of the pop animation started by a fusion
    pub const POP_TICKS: u32 = 15;
    /// Peak relative radius change during the pop animation
    pub const POP_AMPLITUDE: f32 = 0.3;
    /// Pop counter ticks per half sine period
    pub const POP_PERIOD: f32 = 10.0;

    /// Spawned ranks are drawn from the lowest N ranks
    pub const SPAWN_RANK_COUNT: u8 = 3;
    /// Upcoming ranks shown in the preview
    pub const QUEUE_LEN: usize = 2;
    /// Max horizontal jitter speed given to new pieces
    pub const SPAWN_JITTER: f32 = 0.5;
    /// Upward speed given to a freshly fused piece
    pub const FUSION_IMPULSE: f32 = 2.0;
}

/// RGB triplet used for renderer-facing colors
pub type Rgb = [u8; 3];
