//! Rank table: the size/score tiers pieces move through as they fuse
//!
//! Radius and value must be strictly increasing with rank. The last rank is
//! terminal and never fuses further.

use serde::{Deserialize, Serialize};

use crate::Rgb;
use crate::config::ConfigError;
use crate::consts::UNIT;

/// Discrete size/score tier of a piece (0 = smallest)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Rank(pub u8);

impl Rank {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// The rank a fusion of two pieces of this rank produces
    #[inline]
    pub fn next(self) -> Rank {
        Rank(self.0 + 1)
    }
}

impl std::fmt::Display for Rank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Physical and visual properties of one rank
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankSpec {
    pub name: String,
    /// Base collision radius (before pop scaling)
    pub radius: f32,
    /// Score awarded when a piece of this rank is created by fusion
    pub value: u64,
    pub color: Rgb,
    pub accent: Rgb,
    pub glow: Rgb,
}

impl RankSpec {
    fn new(name: &str, radius_units: f32, value: u64, color: Rgb, accent: Rgb, glow: Rgb) -> Self {
        Self {
            name: name.to_string(),
            radius: UNIT * radius_units,
            value,
            color,
            accent,
            glow,
        }
    }
}

/// Ordered table of ranks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RankTable {
    ranks: Vec<RankSpec>,
}

impl Default for RankTable {
    fn default() -> Self {
        Self {
            ranks: vec![
                RankSpec::new("blueberry", 1.00, 1, [74, 144, 226], [53, 122, 189], [174, 214, 255]),
                RankSpec::new("strawberry", 1.25, 2, [255, 107, 107], [229, 90, 90], [255, 207, 207]),
                RankSpec::new("cherry", 1.50, 4, [192, 57, 43], [146, 43, 33], [255, 157, 143]),
                RankSpec::new("peach", 1.75, 8, [255, 140, 66], [245, 124, 0], [255, 240, 166]),
                RankSpec::new("lemon", 2.00, 12, [255, 217, 61], [251, 192, 45], [255, 255, 161]),
                RankSpec::new("plum", 2.30, 20, [170, 0, 255], [98, 0, 234], [220, 150, 255]),
                RankSpec::new("orange", 2.60, 30, [255, 165, 0], [230, 81, 0], [255, 215, 150]),
                RankSpec::new("lime", 3.00, 40, [0, 184, 148], [0, 105, 92], [150, 255, 228]),
                RankSpec::new("pineapple", 3.50, 60, [253, 203, 110], [245, 127, 23], [255, 253, 210]),
                RankSpec::new("grape", 4.00, 100, [108, 92, 231], [81, 45, 168], [208, 192, 255]),
                RankSpec::new("melon", 4.50, 200, [46, 204, 113], [30, 132, 73], [196, 255, 213]),
            ],
        }
    }
}

impl RankTable {
    /// Build a table from explicit specs, validating ordering
    pub fn new(ranks: Vec<RankSpec>) -> Result<Self, ConfigError> {
        let table = Self { ranks };
        table.validate()?;
        Ok(table)
    }

    /// Check radius/value ordering
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ranks.is_empty() {
            return Err(ConfigError::EmptyRankTable);
        }
        if self.ranks.len() > u8::MAX as usize {
            return Err(ConfigError::TooManyRanks(self.ranks.len()));
        }
        for (i, spec) in self.ranks.iter().enumerate() {
            if !(spec.radius.is_finite() && spec.radius > 0.0) {
                return Err(ConfigError::InvalidRadius {
                    rank: i,
                    radius: spec.radius,
                });
            }
            if i == 0 {
                continue;
            }
            let prev = &self.ranks[i - 1];
            if spec.radius <= prev.radius {
                return Err(ConfigError::NonIncreasingRadius { rank: i });
            }
            if spec.value <= prev.value {
                return Err(ConfigError::NonIncreasingValue { rank: i });
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }

    /// Highest rank; cannot fuse further
    pub fn max_rank(&self) -> Rank {
        Rank(self.ranks.len().saturating_sub(1) as u8)
    }

    /// Whether two pieces of this rank may fuse
    #[inline]
    pub fn can_fuse(&self, rank: Rank) -> bool {
        rank < self.max_rank()
    }

    pub fn contains(&self, rank: Rank) -> bool {
        rank.index() < self.ranks.len()
    }

    /// Spec for a rank; ranks outside the table are programming errors
    #[inline]
    pub fn spec(&self, rank: Rank) -> &RankSpec {
        &self.ranks[rank.index()]
    }

    #[inline]
    pub fn radius(&self, rank: Rank) -> f32 {
        self.spec(rank).radius
    }

    #[inline]
    pub fn value(&self, rank: Rank) -> u64 {
        self.spec(rank).value
    }

    #[inline]
    pub fn color(&self, rank: Rank) -> Rgb {
        self.spec(rank).color
    }

    pub fn iter(&self) -> impl Iterator<Item = (Rank, &RankSpec)> {
        self.ranks
            .iter()
            .enumerate()
            .map(|(i, spec)| (Rank(i as u8), spec))
    }
}
