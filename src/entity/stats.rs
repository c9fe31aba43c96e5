//! Base stats, individual variation, effort investment and the stat formulas

use serde::{Deserialize, Serialize};

use crate::core::dice::RandomSource;
use crate::core::types::EvStat;
use crate::grid::terrain::TerrainCosts;

/// Species template supplied by the content table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseStats {
    pub attack: u32,
    pub defense: u32,
    pub hp: u32,
    pub speed: u32,
    pub terrain_costs: TerrainCosts,
    /// Name of the ability every member of the species carries
    pub ability: String,
}

/// Individual multipliers fixed at creation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ivs {
    pub attack: f64,
    pub defense: f64,
    pub hp: f64,
}

impl Ivs {
    /// Neutral IVs (all 1.0)
    pub fn neutral() -> Self {
        Self {
            attack: 1.0,
            defense: 1.0,
            hp: 1.0,
        }
    }

    /// Sample each IV uniformly from [1 - variation, 1 + variation]
    pub fn roll(dice: &mut dyn RandomSource, variation: f64) -> Self {
        let mut sample = || dice.uniform(1.0 - variation, 1.0 + variation);
        Self {
            attack: sample(),
            defense: sample(),
            hp: sample(),
        }
    }
}

impl Default for Ivs {
    fn default() -> Self {
        Self::neutral()
    }
}

/// Effort investment counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Evs {
    pub attack: u8,
    pub defense: u8,
    pub hp: u8,
    pub speed: u8,
    pub ability: u8,
}

impl Evs {
    pub fn get(&self, stat: EvStat) -> u8 {
        match stat {
            EvStat::Attack => self.attack,
            EvStat::Defense => self.defense,
            EvStat::Hp => self.hp,
            EvStat::Speed => self.speed,
            EvStat::Ability => self.ability,
        }
    }

    fn slot(&mut self, stat: EvStat) -> &mut u8 {
        match stat {
            EvStat::Attack => &mut self.attack,
            EvStat::Defense => &mut self.defense,
            EvStat::Hp => &mut self.hp,
            EvStat::Speed => &mut self.speed,
            EvStat::Ability => &mut self.ability,
        }
    }

    /// Add up to `points` to a stat without passing `max`; returns points used
    pub fn invest(&mut self, stat: EvStat, points: u8, max: u8) -> u8 {
        let slot = self.slot(stat);
        let room = max.saturating_sub(*slot);
        let used = points.min(room);
        *slot += used;
        used
    }

    /// Clamp every counter to `max`
    pub fn clamped(mut self, max: u8) -> Self {
        for stat in [
            EvStat::Attack,
            EvStat::Defense,
            EvStat::Hp,
            EvStat::Speed,
            EvStat::Ability,
        ] {
            let slot = self.slot(stat);
            *slot = (*slot).min(max);
        }
        self
    }

    pub fn total(&self) -> u32 {
        self.attack as u32 + self.defense as u32 + self.hp as u32 + self.speed as u32 + self.ability as u32
    }
}

/// Unrounded stat from base, level, IV and EV
pub fn raw_stat(base: f64, level: u32, iv: f64, ev: u8) -> f64 {
    let mut raw = base / 2.0 + level as f64 * base / 10.0;
    raw *= 1.0 + ev as f64 / 125.0;
    raw * iv
}

/// Flat speed bonus for speed investment
pub fn speed_bonus(ev: u8, ev_middle: u8, ev_max: u8) -> f64 {
    if ev >= ev_max {
        2.0
    } else if ev >= ev_middle {
        1.0
    } else {
        0.0
    }
}

/// Linear interpolation from `low` at 0 ability EVs to `high` at `ev_max`
pub fn ability_calc(ability_ev: u8, ev_max: u8, low: f64, high: f64) -> f64 {
    low + (high - low) / ev_max as f64 * ability_ev as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dice::ScriptedDice;

    #[test]
    fn test_raw_stat_formula() {
        // 50/2 + 10*50/10 = 75
        assert!((raw_stat(50.0, 10, 1.0, 0) - 75.0).abs() < 1e-9);
        // with 25 EVs: 75 * 1.2 = 90
        assert!((raw_stat(50.0, 10, 1.0, 25) - 90.0).abs() < 1e-9);
        // with IV 1.05
        assert!((raw_stat(50.0, 10, 1.05, 0) - 78.75).abs() < 1e-9);
    }

    #[test]
    fn test_speed_bonus_steps() {
        assert_eq!(speed_bonus(0, 12, 25), 0.0);
        assert_eq!(speed_bonus(11, 12, 25), 0.0);
        assert_eq!(speed_bonus(12, 12, 25), 1.0);
        assert_eq!(speed_bonus(24, 12, 25), 1.0);
        assert_eq!(speed_bonus(25, 12, 25), 2.0);
    }

    #[test]
    fn test_ability_calc_endpoints() {
        assert_eq!(ability_calc(0, 25, 1.25, 1.5), 1.25);
        assert!((ability_calc(25, 25, 1.25, 1.5) - 1.5).abs() < 1e-12);
        assert!((ability_calc(10, 25, 10.0, 15.0) - 12.0).abs() < 1e-12);
        // decreasing ranges work too
        assert!((ability_calc(25, 25, 0.5, 0.0)).abs() < 1e-12);
    }

    #[test]
    fn test_ivs_within_band() {
        let mut dice = ScriptedDice::new([0.0, 0.5, 0.999]);
        let ivs = Ivs::roll(&mut dice, 0.05);
        assert!((ivs.attack - 0.95).abs() < 1e-12);
        assert!((ivs.defense - 1.0).abs() < 1e-12);
        assert!(ivs.hp < 1.05 && ivs.hp > 1.04);
    }

    #[test]
    fn test_evs_invest_caps() {
        let mut evs = Evs::default();
        assert_eq!(evs.invest(EvStat::Speed, 20, 25), 20);
        assert_eq!(evs.invest(EvStat::Speed, 20, 25), 5);
        assert_eq!(evs.speed, 25);
        assert_eq!(evs.invest(EvStat::Speed, 1, 25), 0);
        assert_eq!(evs.total(), 25);
    }

    #[test]
    fn test_evs_clamped() {
        let evs = Evs {
            attack: 40,
            ability: 3,
            ..Evs::default()
        }
        .clamped(25);
        assert_eq!(evs.attack, 25);
        assert_eq!(evs.ability, 3);
    }
}
