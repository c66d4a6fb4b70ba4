//! Configuration for harvesters and the simulation driver.
//!
//! Every section carries `#[serde(default)]`, so a JSON file only needs the
//! fields it wants to override:
//!
//! ```
//! use quarry_core::config::SimulationConfig;
//!
//! let config = SimulationConfig::from_json_str(r#"{ "harvester": { "capacity": 8 } }"#)?;
//! assert_eq!(config.harvester.capacity, 8);
//! assert_eq!(config.harvester.stats.max_health, 100);
//! # Ok::<(), quarry_core::config::ConfigError>(())
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::feedback::DEFAULT_CUE_CAPACITY;

/// Errors raised while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// The configuration text is not valid JSON for [`SimulationConfig`].
    #[error("failed to parse config JSON: {source}")]
    Parse {
        /// The underlying parse error.
        #[from]
        source: serde_json::Error,
    },

    /// A field holds a value the simulation cannot run with.
    #[error("invalid config value for `{field}`: {reason}")]
    Invalid {
        /// Dotted path of the offending field.
        field: &'static str,
        /// Why the value was rejected.
        reason: &'static str,
    },
}

/// Base combat and movement stats of a unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitStats {
    /// Current health.
    pub health: u32,
    /// Maximum health.
    pub max_health: u32,
    /// Damage dealt by a frontal hit; hits from behind deal double.
    pub strength: u32,
    /// Defense rating. Carried for completeness; damage ignores it.
    pub defense: u32,
    /// Movement speed in world units per time unit.
    pub speed: f32,
    /// Distance at which the unit can strike its target.
    pub attack_range: f32,
    /// Time units between attacks.
    pub attack_cooldown: f32,
    /// Current special-ability cooldown progress.
    pub skill_cooldown: f32,
    /// Cooldown progress required before the ability is usable.
    pub max_skill_cooldown: f32,
}

impl Default for UnitStats {
    fn default() -> Self {
        Self {
            health: 100,
            max_health: 100,
            strength: 4,
            defense: 4,
            speed: 3.0,
            attack_range: 2.0,
            attack_cooldown: 3.0,
            skill_cooldown: 15.0,
            max_skill_cooldown: 15.0,
        }
    }
}

/// Arrival tolerance applied by each state's entry handler.
///
/// Battle is absent: it uses [`UnitStats::attack_range`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArrivalTolerances {
    /// Idle.
    pub idle: f32,
    /// Harvest.
    pub harvest: f32,
    /// Stock.
    pub stock: f32,
    /// Decontaminate.
    pub decontaminate: f32,
    /// PickUp.
    pub pickup: f32,
}

impl Default for ArrivalTolerances {
    fn default() -> Self {
        Self {
            idle: 1.0,
            harvest: 1.5,
            stock: 1.5,
            decontaminate: 1.0,
            pickup: 1.0,
        }
    }
}

/// Per-harvester tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarvesterConfig {
    /// Starting stats.
    pub stats: UnitStats,
    /// Cargo units in one full load.
    pub capacity: u32,
    /// Arrival tolerance per state.
    pub tolerances: ArrivalTolerances,
    /// Time units between harvest, purify and delivery ticks.
    pub activity_interval: f32,
    /// Distance in front of the stockpile where deliveries happen.
    pub stockpile_standoff: f32,
    /// Radius of the circle dropped cargo is scattered on.
    pub drop_radius: f32,
    /// Radius scanned by the taunt ability.
    pub taunt_radius: f32,
    /// Fraction of the remaining look-at angle turned per time unit.
    pub turn_rate: f32,
    /// A look target closer than this disables auto-rotation.
    pub look_engage_distance: f32,
}

impl Default for HarvesterConfig {
    fn default() -> Self {
        Self {
            stats: UnitStats::default(),
            capacity: 5,
            tolerances: ArrivalTolerances::default(),
            activity_interval: 1.0,
            stockpile_standoff: 2.0,
            drop_radius: 1.5,
            taunt_radius: 5.0,
            turn_rate: 5.0,
            look_engage_distance: 5.0,
        }
    }
}

impl HarvesterConfig {
    /// Checks that the values can drive a harvester.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let stats = &self.stats;
        if stats.max_health == 0 {
            return Err(invalid("harvester.stats.max_health", "must be positive"));
        }
        if stats.health > stats.max_health {
            return Err(invalid("harvester.stats.health", "exceeds max_health"));
        }
        if stats.max_skill_cooldown < 0.0 {
            return Err(invalid("harvester.stats.max_skill_cooldown", "must not be negative"));
        }
        if self.capacity == 0 {
            return Err(invalid("harvester.capacity", "must be positive"));
        }
        if self.activity_interval <= 0.0 {
            return Err(invalid("harvester.activity_interval", "must be positive"));
        }
        let radii = [
            ("harvester.stockpile_standoff", self.stockpile_standoff),
            ("harvester.drop_radius", self.drop_radius),
            ("harvester.taunt_radius", self.taunt_radius),
            ("harvester.stats.attack_range", stats.attack_range),
        ];
        for (field, value) in radii {
            if value < 0.0 {
                return Err(invalid(field, "must not be negative"));
            }
        }
        Ok(())
    }
}

/// Top-level configuration for a [`Simulation`](crate::simulation::Simulation).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Applied to every spawned harvester.
    pub harvester: HarvesterConfig,
    /// Fixed length of one tick in time units.
    pub dt: f32,
    /// Notices kept before the oldest is dropped.
    pub notice_capacity: usize,
    /// Presentation cues kept before the oldest is dropped.
    pub cue_capacity: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            harvester: HarvesterConfig::default(),
            dt: 1.0 / 60.0,
            notice_capacity: 32,
            cue_capacity: DEFAULT_CUE_CAPACITY,
        }
    }
}

impl SimulationConfig {
    /// Parses and validates a JSON document.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] for malformed JSON, [`ConfigError::Invalid`]
    /// for values rejected by [`validate`](Self::validate).
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON file.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`from_json_str`](Self::from_json_str).
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Checks every section.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dt <= 0.0 {
            return Err(invalid("dt", "must be positive"));
        }
        self.harvester.validate()
    }
}

fn invalid(field: &'static str, reason: &'static str) -> ConfigError {
    ConfigError::Invalid { field, reason }
}
