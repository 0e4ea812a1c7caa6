//! Simulation configuration
//!
//! Well geometry, physics tuning and the rank table. Consumed once at
//! construction; constant for a session. Loadable from JSON, with every
//! field defaulting to the reference tuning.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::sim::rank::{Rank, RankTable};

/// Fatal configuration problems surfaced at startup
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("rank table is empty")]
    EmptyRankTable,
    #[error("rank table has {0} entries (max 255)")]
    TooManyRanks(usize),
    #[error("rank {rank} has invalid radius {radius}")]
    InvalidRadius { rank: usize, radius: f32 },
    #[error("rank {rank} radius does not increase over the previous rank")]
    NonIncreasingRadius { rank: usize },
    #[error("rank {rank} value does not increase over the previous rank")]
    NonIncreasingValue { rank: usize },
    #[error("invalid well geometry: {0}")]
    InvalidGeometry(String),
    #[error("invalid physics tuning: {0}")]
    InvalidPhysics(String),
    #[error("spawn rank count {count} must be within 1..={available}")]
    InvalidSpawnRanks { count: u8, available: usize },
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Playfield dimensions in well-local coordinates (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WellGeometry {
    pub width: f32,
    /// Floor y-coordinate
    pub height: f32,
    /// Top edges at or above this y end the run
    pub danger_line: f32,
    /// Height at which dropped pieces appear
    pub spawn_y: f32,
}

impl Default for WellGeometry {
    fn default() -> Self {
        Self {
            width: WELL_WIDTH,
            height: WELL_HEIGHT,
            danger_line: DANGER_LINE,
            spawn_y: SPAWN_Y,
        }
    }
}

impl WellGeometry {
    /// Horizontal center of the well
    pub fn center_x(&self) -> f32 {
        self.width / 2.0
    }
}

/// Per-tick integration and contact constants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsTuning {
    pub gravity: f32,
    pub damping: f32,
    pub rest_epsilon: f32,
    pub contact_damping: f32,
    pub relaxation_passes: u32,
}

impl Default for PhysicsTuning {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            damping: DAMPING,
            rest_epsilon: REST_EPSILON,
            contact_damping: CONTACT_DAMPING,
            relaxation_passes: RELAXATION_PASSES,
        }
    }
}

/// Tick-counted windows
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingTuning {
    pub drop_cooldown_ticks: u32,
    pub grace_ticks: u32,
    pub pop_ticks: u32,
    pub pop_amplitude: f32,
    pub pop_period: f32,
    pub tick_hz: u32,
}

impl Default for TimingTuning {
    fn default() -> Self {
        Self {
            drop_cooldown_ticks: DROP_COOLDOWN_TICKS,
            grace_ticks: GRACE_TICKS,
            pop_ticks: POP_TICKS,
            pop_amplitude: POP_AMPLITUDE,
            pop_period: POP_PERIOD,
            tick_hz: TICK_HZ,
        }
    }
}

impl TimingTuning {
    /// Seconds per simulation tick
    pub fn tick_dt(&self) -> f32 {
        1.0 / self.tick_hz as f32
    }
}

/// Spawn distribution and creation impulses
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnTuning {
    /// Spawned ranks are uniform over `0..spawn_rank_count`
    pub spawn_rank_count: u8,
    /// Max horizontal speed given to new pieces
    pub jitter: f32,
    /// Upward speed given to fused pieces
    pub fusion_impulse: f32,
}

impl Default for SpawnTuning {
    fn default() -> Self {
        Self {
            spawn_rank_count: SPAWN_RANK_COUNT,
            jitter: SPAWN_JITTER,
            fusion_impulse: FUSION_IMPULSE,
        }
    }
}

/// Complete simulation configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub well: WellGeometry,
    pub physics: PhysicsTuning,
    pub timing: TimingTuning,
    pub spawn: SpawnTuning,
    pub ranks: RankTable,
}

impl SimConfig {
    /// Parse and validate a JSON config
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json_str(&json)?;
        log::info!("Loaded config from {}", path.as_ref().display());
        Ok(config)
    }

    /// Reject configurations the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.ranks.validate()?;

        let spawn_count = self.spawn.spawn_rank_count;
        if spawn_count == 0 || spawn_count as usize > self.ranks.len() {
            return Err(ConfigError::InvalidSpawnRanks {
                count: spawn_count,
                available: self.ranks.len(),
            });
        }

        let well = &self.well;
        if !(well.width.is_finite() && well.width > 0.0)
            || !(well.height.is_finite() && well.height > 0.0)
        {
            return Err(ConfigError::InvalidGeometry(format!(
                "well must have positive size, got {}x{}",
                well.width, well.height
            )));
        }
        if !(0.0..well.height).contains(&well.danger_line) {
            return Err(ConfigError::InvalidGeometry(format!(
                "danger line {} outside well height {}",
                well.danger_line, well.height
            )));
        }
        if !(0.0..well.height).contains(&well.spawn_y) {
            return Err(ConfigError::InvalidGeometry(format!(
                "spawn height {} outside well height {}",
                well.spawn_y, well.height
            )));
        }
        let widest_spawn = self.ranks.radius(Rank(spawn_count - 1)) * 2.0;
        if widest_spawn > well.width {
            return Err(ConfigError::InvalidGeometry(format!(
                "well width {} narrower than spawnable piece {}",
                well.width, widest_spawn
            )));
        }

        let physics = &self.physics;
        if physics.relaxation_passes == 0 {
            return Err(ConfigError::InvalidPhysics(
                "relaxation_passes must be at least 1".into(),
            ));
        }
        if !(physics.damping > 0.0 && physics.damping <= 1.0) {
            return Err(ConfigError::InvalidPhysics(format!(
                "damping {} outside (0, 1]",
                physics.damping
            )));
        }
        if !(physics.contact_damping > 0.0 && physics.contact_damping <= 1.0) {
            return Err(ConfigError::InvalidPhysics(format!(
                "contact_damping {} outside (0, 1]",
                physics.contact_damping
            )));
        }
        if !(physics.rest_epsilon >= 0.0) || !physics.gravity.is_finite() {
            return Err(ConfigError::InvalidPhysics(format!(
                "rest_epsilon {} / gravity {} invalid",
                physics.rest_epsilon, physics.gravity
            )));
        }

        let timing = &self.timing;
        if timing.tick_hz == 0 {
            return Err(ConfigError::InvalidPhysics("tick_hz must be at least 1".into()));
        }
        if timing.pop_ticks > 0 && !(timing.pop_period > 0.0) {
            return Err(ConfigError::InvalidPhysics(format!(
                "pop_period {} must be positive",
                timing.pop_period
            )));
        }
        if !(0.0..1.0).contains(&timing.pop_amplitude) {
            return Err(ConfigError::InvalidPhysics(format!(
                "pop_amplitude {} outside [0, 1)",
                timing.pop_amplitude
            )));
        }
        if !(self.spawn.jitter >= 0.0 && self.spawn.jitter.is_finite()) {
            return Err(ConfigError::InvalidPhysics(format!(
                "spawn jitter {} invalid",
                self.spawn.jitter
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = SimConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.well.width, 244.0);
        assert_eq!(config.well.height, 382.0);
        assert_eq!(config.physics.relaxation_passes, 3);
        assert_eq!(config.timing.grace_ticks, 60);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config =
            SimConfig::from_json_str(r#"{ "well": { "width": 300 }, "timing": { "grace_ticks": 30 } }"#)
                .unwrap();
        assert_eq!(config.well.width, 300.0);
        assert_eq!(config.well.height, WELL_HEIGHT);
        assert_eq!(config.timing.grace_ticks, 30);
        assert_eq!(config.timing.drop_cooldown_ticks, DROP_COOLDOWN_TICKS);
        assert_eq!(config.ranks.len(), 11);
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        assert!(matches!(
            SimConfig::from_json_str("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_empty_rank_table_is_fatal() {
        assert!(matches!(
            SimConfig::from_json_str(r#"{ "ranks": [] }"#),
            Err(ConfigError::EmptyRankTable)
        ));
    }

    #[test]
    fn test_danger_line_outside_well_rejected() {
        let mut config = SimConfig::default();
        config.well.danger_line = config.well.height + 1.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidGeometry(_))
        ));
    }

    #[test]
    fn test_narrow_well_rejected() {
        let mut config = SimConfig::default();
        config.well.width = 20.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidGeometry(_))
        ));
    }

    #[test]
    fn test_spawn_rank_count_bounds() {
        let mut config = SimConfig::default();
        config.spawn.spawn_rank_count = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidSpawnRanks { .. })
        ));
        config.spawn.spawn_rank_count = 12;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidSpawnRanks { .. })
        ));
    }

    #[test]
    fn test_zero_passes_rejected() {
        let mut config = SimConfig::default();
        config.physics.relaxation_passes = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidPhysics(_))
        ));
    }

    #[test]
    fn test_zero_tick_hz_rejected() {
        let mut config = SimConfig::default();
        config.timing.tick_hz = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidPhysics(_))
        ));
    }

    #[test]
    fn test_tick_dt_follows_tick_hz() {
        let config = SimConfig::from_json_str(r#"{"timing":{"tick_hz":30}}"#).unwrap();
        assert_eq!(config.timing.tick_dt(), 1.0 / 30.0);
        assert_eq!(SimConfig::default().timing.tick_dt(), 1.0 / 60.0);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        assert!(matches!(
            SimConfig::load("/nonexistent/fruity-merge.json"),
            Err(ConfigError::Io(_))
        ));
    }
}
