//! Battle configuration with documented constants
//!
//! Every tuning number the engine uses lives here. A session owns one
//! `BattleConfig`; nothing reads configuration from global state.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{BattleError, Result};

/// Configuration for the battle systems
///
/// Loadable from TOML; any field left out keeps its default.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    // === LEVELS ===
    /// Lowest level a unit can have
    pub min_level: u32,

    /// Highest level a unit can reach; experience stops accruing here
    pub max_level: u32,

    // === STATS ===
    /// Cap on effort investment per stat
    pub ev_max: u8,

    /// Speed EV at which the first flat speed bonus kicks in
    ///
    /// Reaching `ev_max` grants the second point.
    pub ev_middle: u8,

    /// Half-width of the individual-value band around 1.0
    ///
    /// At 0.05 every IV lands in [0.95, 1.05].
    pub iv_variation: f64,

    // === COMBAT ===
    /// Default chance that a melee attack lands
    pub default_accuracy: f64,

    /// Default chance that a landed attack is critical
    pub critical_chance: f64,

    /// Multiplier that replaces all other multipliers on a critical hit
    pub critical_multiplier: f64,

    /// Half-width of the uniform damage variance band around 1.0
    ///
    /// At 0.3 damage is scaled by a factor in [0.7, 1.3].
    pub damage_variation: f64,

    /// Default attack range in tiles (Manhattan)
    pub default_range: u32,

    /// Radius of fog each unit clears around itself
    pub fog_dispel_radius: u32,

    // === EXPERIENCE ===
    /// Experience needed for one level-up
    pub experience_per_level: f64,

    /// Experience for landing a hit on an equal-level foe
    pub base_attack_experience: f64,

    /// Cap on experience from a single hit
    pub max_attack_experience: f64,

    /// Experience for defeating an equal-level foe
    pub base_kill_experience: f64,

    /// Cap on experience from a single defeat
    pub max_kill_experience: f64,

    // === ENEMIES ===
    /// Chance a defeated enemy offers to join the player
    pub recruitment_chance: f64,

    /// Chance a defeated enemy drops its item
    pub drop_chance: f64,

    /// Maximum distance of a generated enemy level from its center
    ///
    /// The standard deviation of the level roll is a third of this.
    pub max_enemy_level_deviation: u32,

    /// Presentation delay between AI steps, in milliseconds
    ///
    /// Only forwarded to the presentation sink. The engine itself never
    /// sleeps, so headless runs may leave this at zero.
    pub enemy_step_delay_ms: u64,

    /// Upper bound on team turns drained by one command
    ///
    /// Stops two AI teams that cannot reach each other from looping
    /// forever.
    pub max_turns_per_command: u32,

    // === TEAMS ===
    /// Allies brought into a single battle level
    pub max_active_allies: usize,

    // === WEATHER ===
    /// Chance that non-normal weather clears at the end of a round
    pub weather_end_chance: f64,

    /// Attack multiplier while the sun is out
    pub sun_attack_multiplier: f64,

    /// Attack multiplier while it rains
    pub rain_attack_multiplier: f64,

    /// Flat speed penalty while it snows
    pub snow_speed_penalty: f64,

    /// Fraction of max HP a storm deals at the end of each round
    pub storm_damage_fraction: f64,

    /// Multiplier on every effect chance at night
    pub night_effect_multiplier: f64,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            min_level: 1,
            max_level: 50,

            ev_max: 25,
            ev_middle: 12,
            iv_variation: 0.05,

            default_accuracy: 0.9,
            critical_chance: 0.1,
            critical_multiplier: 2.0,
            damage_variation: 0.3,
            default_range: 1,
            fog_dispel_radius: 2,

            experience_per_level: 1000.0,
            base_attack_experience: 30.0,
            max_attack_experience: 300.0,
            base_kill_experience: 250.0,
            max_kill_experience: 5000.0,

            recruitment_chance: 0.2,
            drop_chance: 0.1,
            max_enemy_level_deviation: 6,
            enemy_step_delay_ms: 1000,
            max_turns_per_command: 200,

            max_active_allies: 5,

            weather_end_chance: 0.15,
            sun_attack_multiplier: 1.1,
            rain_attack_multiplier: 0.9,
            snow_speed_penalty: 1.0,
            storm_damage_fraction: 1.0 / 16.0,
            night_effect_multiplier: 2.0,
        }
    }
}

impl BattleConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration for headless runs: no presentation delay
    pub fn headless() -> Self {
        Self {
            enemy_step_delay_ms: 0,
            ..Self::default()
        }
    }

    /// Read a TOML config file and validate it
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: BattleConfig = toml::from_str(contents)?;
        config.validate().map_err(BattleError::InvalidConfig)?;
        Ok(config)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.min_level == 0 || self.min_level > self.max_level {
            return Err(format!(
                "level bounds must satisfy 1 <= min_level ({}) <= max_level ({})",
                self.min_level, self.max_level
            ));
        }

        if self.ev_middle > self.ev_max {
            return Err(format!(
                "ev_middle ({}) should be <= ev_max ({})",
                self.ev_middle, self.ev_max
            ));
        }

        let chances = [
            ("default_accuracy", self.default_accuracy),
            ("critical_chance", self.critical_chance),
            ("recruitment_chance", self.recruitment_chance),
            ("drop_chance", self.drop_chance),
            ("weather_end_chance", self.weather_end_chance),
        ];
        for (name, value) in chances {
            if !(0.0..=1.0).contains(&value) {
                return Err(format!("{} ({}) must be within [0, 1]", name, value));
            }
        }

        if !(0.0..1.0).contains(&self.damage_variation) || !(0.0..1.0).contains(&self.iv_variation)
        {
            return Err("variation bands must be within [0, 1)".into());
        }

        if self.experience_per_level <= 0.0 {
            return Err("experience_per_level must be positive".into());
        }

        if self.max_turns_per_command == 0 {
            return Err("max_turns_per_command must be at least 1".into());
        }

        Ok(())
    }
}
