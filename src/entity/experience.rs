//! Experience curves and level-ups for allies

use tracing::info;

use crate::core::config::BattleConfig;
use crate::entity::animal::Animal;

/// Experience for landing a hit; shrinks against weaker foes
pub fn attack_experience(config: &BattleConfig, own_level: u32, foe_level: u32) -> f64 {
    let diff = own_level as f64 - foe_level as f64;
    let factor = if diff > 0.0 { 0.6f64.powf(diff) } else { 1.15f64.powf(-diff) };
    (config.base_attack_experience * factor).clamp(0.0, config.max_attack_experience)
}

/// Experience for defeating a foe
pub fn kill_experience(config: &BattleConfig, own_level: u32, foe_level: u32) -> f64 {
    let diff = own_level as f64 - foe_level as f64;
    let factor = if diff > 0.0 { 0.7f64.powf(diff) } else { 1.2f64.powf(-diff) };
    (config.base_kill_experience * factor).clamp(0.0, config.max_kill_experience)
}

/// Add experience to an ally, levelling up as thresholds are crossed
///
/// Returns the number of levels gained. Enemies ignore experience.
pub fn gain_experience(animal: &mut Animal, amount: f64, config: &BattleConfig) -> u32 {
    let level = animal.level;
    let Some(progress) = animal.progress_mut() else {
        return 0;
    };
    if level >= config.max_level {
        progress.experience = 0.0;
        return 0;
    }

    progress.experience += amount.max(0.0);
    let mut gained = 0;
    while progress.experience >= config.experience_per_level && level + gained < config.max_level {
        progress.experience -= config.experience_per_level;
        progress.skill_points += 1;
        gained += 1;
    }
    if level + gained >= config.max_level {
        progress.experience = 0.0;
    }

    if gained > 0 {
        animal.level += gained;
        animal.full_heal();
        info!("{} reached level {}", animal.name, animal.level);
    }
    gained
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ability::catalog;
    use crate::entity::animal::{AllyProgress, AnimalKind};
    use crate::entity::stats::{BaseStats, Ivs};
    use crate::grid::TerrainCosts;

    fn ally(level: u32) -> Animal {
        let base = BaseStats {
            attack: 50,
            defense: 50,
            hp: 50,
            speed: 3,
            terrain_costs: TerrainCosts::uniform(1),
            ability: "Clutch".into(),
        };
        Animal::new(
            "Bear",
            "Bruno",
            base,
            level,
            Ivs::neutral(),
            catalog::lookup("Clutch").unwrap(),
            AnimalKind::Ally(AllyProgress::default()),
            &BattleConfig::default(),
        )
    }

    #[test]
    fn test_experience_curves() {
        let config = BattleConfig::default();
        assert_eq!(attack_experience(&config, 10, 10), 30.0);
        assert!((attack_experience(&config, 11, 10) - 18.0).abs() < 1e-9);
        assert!((attack_experience(&config, 10, 11) - 34.5).abs() < 1e-9);
        assert_eq!(attack_experience(&config, 1, 50), 300.0);
        assert_eq!(kill_experience(&config, 10, 10), 250.0);
        assert_eq!(kill_experience(&config, 1, 50), 5000.0);
    }

    #[test]
    fn test_level_up_heals_and_grants_point() {
        let config = BattleConfig::default();
        let mut a = ally(5);
        a.set_hp(1);
        let gained = gain_experience(&mut a, 1200.0, &config);
        assert_eq!(gained, 1);
        assert_eq!(a.level, 6);
        assert_eq!(a.hp(), a.max_hp());
        let progress = a.progress().unwrap();
        assert_eq!(progress.skill_points, 1);
        assert!((progress.experience - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_max_level_resets_experience() {
        let config = BattleConfig::default();
        let mut a = ally(49);
        assert_eq!(gain_experience(&mut a, 5000.0, &config), 1);
        assert_eq!(a.level, 50);
        assert_eq!(a.progress().unwrap().experience, 0.0);
        assert_eq!(gain_experience(&mut a, 500.0, &config), 0);
        assert_eq!(a.progress().unwrap().experience, 0.0);
    }
}
