//! Weather: level-wide conditions rolled at round start

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::battle::events::BattleEvent;
use crate::core::config::BattleConfig;
use crate::core::types::StatKind;
use crate::entity::status::{Duration, StatChange, StatOp};
use crate::session::Session;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub enum Weather {
    #[default]
    Normal,
    Sun,
    Rain,
    Snow,
    Storm,
    Overcast,
    Night,
}

impl Weather {
    /// Stat change every animal carries while this weather lasts
    pub fn stat_change(&self, config: &BattleConfig) -> Option<StatChange> {
        let (id, stat, op) = match self {
            Weather::Sun => ("sun", StatKind::Attack, StatOp::Mul(config.sun_attack_multiplier)),
            Weather::Rain => ("rain", StatKind::Attack, StatOp::Mul(config.rain_attack_multiplier)),
            Weather::Snow => ("snow", StatKind::Speed, StatOp::Sub(config.snow_speed_penalty)),
            _ => return None,
        };
        Some(StatChange::new(id, stat, op, Duration::Permanent))
    }

    pub fn begin_text(&self) -> &'static str {
        match self {
            Weather::Normal => "The weather calmed.",
            Weather::Sun => "The sun began to shine!",
            Weather::Rain => "A downpour started!",
            Weather::Snow => "Flurries started to fall!",
            Weather::Storm => "A vicious storm brewed!",
            Weather::Overcast => "Clouds filled the sky!",
            Weather::Night => "Night suddenly fell!",
        }
    }
}

impl std::str::FromStr for Weather {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "normal" => Ok(Weather::Normal),
            "sun" => Ok(Weather::Sun),
            "rain" => Ok(Weather::Rain),
            "snow" => Ok(Weather::Snow),
            "storm" => Ok(Weather::Storm),
            "overcast" => Ok(Weather::Overcast),
            "night" => Ok(Weather::Night),
            other => Err(format!("unknown weather '{}'", other)),
        }
    }
}

/// Per-round chance of each non-normal weather
///
/// Whatever probability is left over keeps the weather normal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeatherChances(pub BTreeMap<Weather, f64>);

impl WeatherChances {
    pub fn none() -> Self {
        Self(BTreeMap::new())
    }

    /// Pick a weather with one roll by stacking the chances in enum order
    pub fn pick(&self, roll: f64) -> Weather {
        let mut cumulative = 0.0;
        for (weather, chance) in &self.0 {
            if *weather == Weather::Normal {
                continue;
            }
            cumulative += chance;
            if cumulative >= roll {
                return *weather;
            }
        }
        Weather::Normal
    }

    pub fn total(&self) -> f64 {
        self.0
            .iter()
            .filter(|(w, _)| **w != Weather::Normal)
            .map(|(_, c)| c)
            .sum()
    }
}

impl Default for WeatherChances {
    fn default() -> Self {
        Self(
            [
                (Weather::Night, 0.1),
                (Weather::Snow, 0.1),
                (Weather::Storm, 0.1),
                (Weather::Overcast, 0.1),
            ]
            .into_iter()
            .collect(),
        )
    }
}

impl Session {
    /// Replace the current weather, finishing the old one first
    pub fn set_weather(&mut self, weather: Weather) {
        let Ok(level) = self.level() else {
            return;
        };
        let old = level.weather;
        if old == weather {
            return;
        }
        if let Some(change) = old.stat_change(&self.config) {
            for id in self.animal_ids() {
                if let Some(animal) = self.animal_mut(id) {
                    animal.statuses.remove(&change.id);
                }
            }
        }
        if let Ok(level) = self.level_mut() {
            level.weather = weather;
        }
        info!("{}", weather.begin_text());
        self.apply_weather_changes();
        self.emit(BattleEvent::WeatherChanged { weather });
    }

    /// Multiplier on every effect chance
    pub fn weather_effect_multiplier(&self) -> f64 {
        match self.level().map(|l| l.weather) {
            Ok(Weather::Night) => self.config.night_effect_multiplier,
            _ => 1.0,
        }
    }

    fn apply_weather_changes(&mut self) {
        let Ok(weather) = self.level().map(|l| l.weather) else {
            return;
        };
        if let Some(change) = weather.stat_change(&self.config) {
            for id in self.animal_ids() {
                self.apply_stat_change(id, change.clone());
            }
        }
    }

    /// Normal weather may turn; the current weather's stat change is
    /// reapplied so units that arrived mid-weather carry it too
    pub(crate) fn weather_round_start(&mut self) {
        let Ok(level) = self.level() else {
            return;
        };
        if level.weather == Weather::Normal {
            let chances = level.weather_chances.clone();
            let roll = self.dice().next_f64();
            let next = chances.pick(roll);
            if next != Weather::Normal {
                self.set_weather(next);
            }
        }
        self.apply_weather_changes();
    }

    pub(crate) fn weather_round_end(&mut self) {
        let Ok(weather) = self.level().map(|l| l.weather) else {
            return;
        };
        match weather {
            Weather::Storm => {
                info!("The wind and rain hurt everyone!");
                let fraction = self.config.storm_damage_fraction;
                for id in self.animal_ids() {
                    let max = self.animal(id).map(|a| a.max_hp()).unwrap_or(0);
                    self.passive_damage(id, (max as f64 * fraction).round());
                }
            }
            Weather::Overcast => {
                for id in self.animal_ids() {
                    if let Some(animal) = self.animal_mut(id) {
                        animal.statuses.clear_changes();
                    }
                }
            }
            _ => {}
        }
        // rolled every round, Normal included, so replays draw the same dice
        let ends = self.chance(self.config.weather_end_chance);
        if ends && weather != Weather::Normal {
            self.set_weather(Weather::Normal);
        }
    }
}
