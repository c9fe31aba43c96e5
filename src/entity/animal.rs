//! Animals: the units that fight
//!
//! An `Animal` holds its species template, growth counters, HP, statuses
//! and merged ability hooks. Anything that needs the level (movement,
//! combat, turn signals) goes through `Session`; this type only knows about
//! itself.

use crate::ability::{AbilityDefinition, AbilityKind, AbilityState, Action, HookTable};
use crate::core::config::BattleConfig;
use crate::core::types::{EvStat, StatKind, TeamName};
use crate::entity::stats::{ability_calc, raw_stat, speed_bonus, BaseStats, Evs, Ivs};
use crate::entity::status::{Duration, StatChange, StatusEffects};

/// Stat rules copied from the config at creation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatRules {
    pub ev_max: u8,
    pub ev_middle: u8,
    pub max_level: u32,
}

impl StatRules {
    pub fn from_config(config: &BattleConfig) -> Self {
        Self {
            ev_max: config.ev_max,
            ev_middle: config.ev_middle,
            max_level: config.max_level,
        }
    }
}

impl Default for StatRules {
    fn default() -> Self {
        Self::from_config(&BattleConfig::default())
    }
}

/// Combat fields abilities may adjust in `update_fields`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CombatFields {
    pub range: u32,
    pub accuracy: f64,
    pub crit_chance: f64,
    pub crit_multiplier: f64,
    pub fog_dispel_radius: u32,
}

impl CombatFields {
    pub fn from_config(config: &BattleConfig) -> Self {
        Self {
            range: config.default_range,
            accuracy: config.default_accuracy,
            crit_chance: config.critical_chance,
            crit_multiplier: config.critical_multiplier,
            fog_dispel_radius: config.fog_dispel_radius,
        }
    }
}

impl Default for CombatFields {
    fn default() -> Self {
        Self::from_config(&BattleConfig::default())
    }
}

/// Player-side progression
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AllyProgress {
    pub experience: f64,
    pub skill_points: u32,
    /// Brought into battle levels
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnemyTraits {
    pub recruitment_chance: f64,
    pub drop_item: Option<String>,
    pub drop_chance: f64,
}

impl EnemyTraits {
    pub fn from_config(config: &BattleConfig) -> Self {
        Self {
            recruitment_chance: config.recruitment_chance,
            drop_item: None,
            drop_chance: config.drop_chance,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnimalKind {
    Ally(AllyProgress),
    Enemy(EnemyTraits),
}

#[derive(Debug, Clone)]
pub struct Animal {
    pub species: String,
    pub name: String,
    pub base: BaseStats,
    pub level: u32,
    pub ivs: Ivs,
    pub evs: Evs,
    current_hp: i32,
    pub statuses: StatusEffects,
    pub team: Option<TeamName>,
    pub ability: AbilityDefinition,
    /// Active extension points
    pub hooks: HookTable,
    /// Table the ability was merged over
    pub defaults: HookTable,
    pub ability_state: AbilityState,
    pub actions: Vec<Action>,
    pub fields: CombatFields,
    field_defaults: CombatFields,
    pub moved: bool,
    /// Whether stock actions may end this unit's turn
    pub auto_end_turn: bool,
    pub kind: AnimalKind,
    pub rules: StatRules,
}

impl Animal {
    /// Build a unit at full HP with its ability merged
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        species: impl Into<String>,
        name: impl Into<String>,
        base: BaseStats,
        level: u32,
        ivs: Ivs,
        ability: AbilityDefinition,
        kind: AnimalKind,
        config: &BattleConfig,
    ) -> Self {
        let fields = CombatFields::from_config(config);
        let mut animal = Self {
            species: species.into(),
            name: name.into(),
            base,
            level: level.clamp(config.min_level, config.max_level),
            ivs,
            evs: Evs::default(),
            current_hp: 0,
            statuses: StatusEffects::default(),
            team: None,
            ability,
            hooks: HookTable::default(),
            defaults: HookTable::default(),
            ability_state: AbilityState::default(),
            actions: vec![Action::melee()],
            fields,
            field_defaults: fields,
            moved: false,
            auto_end_turn: true,
            kind,
            rules: StatRules::from_config(config),
        };
        animal.merge_ability();
        animal.current_hp = animal.max_hp();
        animal
    }

    /// Re-merge the ability, wiping ability state and resetting fields
    pub fn merge_ability(&mut self) {
        self.fields = self.field_defaults;
        self.ability_state = AbilityState::default();
        self.defaults = HookTable::default();
        self.hooks = self.ability.overrides.merge_onto(&self.defaults);
        self.actions = vec![Action::melee()];
        if let AbilityKind::Action(action) = self.ability.kind {
            self.actions.push(action);
        }
        (self.hooks.update_fields)(self);
    }

    /// Fresh state for a new level
    pub fn reset_for_level(&mut self) {
        self.statuses.clear();
        self.moved = false;
        self.auto_end_turn = true;
        self.merge_ability();
    }

    pub fn with_evs(mut self, evs: Evs) -> Self {
        self.evs = evs.clamped(self.rules.ev_max);
        self.current_hp = self.max_hp();
        self
    }

    // === STATS ===

    pub fn max_hp(&self) -> i32 {
        raw_stat(self.base.hp as f64, self.level, self.ivs.hp, self.evs.hp).round() as i32
    }

    /// Attack; `pure` skips stat changes
    pub fn attack(&self, pure: bool) -> i32 {
        let raw = raw_stat(self.base.attack as f64, self.level, self.ivs.attack, self.evs.attack);
        self.finish_stat(StatKind::Attack, raw, pure)
    }

    /// Defense; `pure` skips stat changes
    pub fn defense(&self, pure: bool) -> i32 {
        let raw = raw_stat(self.base.defense as f64, self.level, self.ivs.defense, self.evs.defense);
        self.finish_stat(StatKind::Defense, raw, pure)
    }

    fn finish_stat(&self, stat: StatKind, raw: f64, pure: bool) -> i32 {
        let value = if pure { raw } else { self.statuses.modify(stat, raw) };
        value.round() as i32
    }

    /// Movement budget: species speed, EV bonus, then stat changes
    pub fn speed(&self, pure: bool) -> f64 {
        let base = self.base.speed as f64
            + speed_bonus(self.evs.speed, self.rules.ev_middle, self.rules.ev_max);
        if pure {
            base
        } else {
            self.statuses.modify(StatKind::Speed, base).max(0.0)
        }
    }

    pub fn ability_calc(&self, low: f64, high: f64) -> f64 {
        ability_calc(self.evs.ability, self.rules.ev_max, low, high)
    }

    /// Invocations per level; 0 unless the ability is invokable
    pub fn max_ability_uses(&self) -> u32 {
        match &self.ability.kind {
            AbilityKind::Invokable(inv) => self.ability_calc(inv.uses.0, inv.uses.1).round() as u32,
            _ => 0,
        }
    }

    pub fn ability_uses_left(&self) -> u32 {
        self.max_ability_uses().saturating_sub(self.ability_state.uses)
    }

    // === HP ===

    pub fn hp(&self) -> i32 {
        self.current_hp
    }

    /// Set HP clamped to [0, max]; returns the stored value
    pub fn set_hp(&mut self, hp: i32) -> i32 {
        self.current_hp = hp.clamp(0, self.max_hp());
        self.current_hp
    }

    /// Gain rounded HP up to the max; returns the amount really gained
    pub fn gain_hp(&mut self, amount: f64) -> i32 {
        let before = self.current_hp;
        self.set_hp(before + amount.round() as i32);
        self.current_hp - before
    }

    pub fn gain_hp_percent(&mut self, percent: f64) -> i32 {
        self.gain_hp(self.max_hp() as f64 * percent / 100.0)
    }

    pub fn full_heal(&mut self) {
        self.current_hp = self.max_hp();
    }

    pub fn hp_percent(&self) -> i32 {
        let max = self.max_hp();
        if max <= 0 {
            return 0;
        }
        (self.current_hp as f64 / max as f64 * 100.0).round() as i32
    }

    pub fn is_dead(&self) -> bool {
        self.current_hp <= 0
    }

    // === STATUS ===

    pub fn apply_stat_change(&mut self, change: StatChange) {
        self.statuses.apply(change);
    }

    /// Apply a stat change with rounded turns
    pub fn boost(&mut self, id: &str, stat: StatKind, op: crate::entity::status::StatOp, turns: f64) {
        self.statuses
            .apply(StatChange::new(id, stat, op, Duration::rounded(turns)));
    }

    // === KIND ===

    pub fn is_ally(&self) -> bool {
        matches!(self.kind, AnimalKind::Ally(_))
    }

    pub fn is_enemy(&self) -> bool {
        matches!(self.kind, AnimalKind::Enemy(_))
    }

    pub fn progress(&self) -> Option<&AllyProgress> {
        match &self.kind {
            AnimalKind::Ally(progress) => Some(progress),
            AnimalKind::Enemy(_) => None,
        }
    }

    pub fn progress_mut(&mut self) -> Option<&mut AllyProgress> {
        match &mut self.kind {
            AnimalKind::Ally(progress) => Some(progress),
            AnimalKind::Enemy(_) => None,
        }
    }

    /// Trade skill points for EVs, one for one; returns the points spent
    ///
    /// Enemies have no skill points and never invest.
    pub fn spend_skill_points(&mut self, stat: EvStat, points: u32) -> u32 {
        let ev_max = self.rules.ev_max;
        let AnimalKind::Ally(progress) = &mut self.kind else {
            return 0;
        };
        let budget = points.min(progress.skill_points).min(u8::MAX as u32) as u8;
        let spent = self.evs.invest(stat, budget, ev_max) as u32;
        progress.skill_points -= spent;
        spent
    }

    pub fn is_friend_of(&self, other: &Animal) -> bool {
        self.team.is_some() && self.team == other.team
    }

    /// Look up an action by name, ignoring case and spaces
    ///
    /// "EggCannon" and "egg cannon" both find "Egg Cannon", so one-word
    /// command lines can name any action.
    pub fn action(&self, name: &str) -> Option<Action> {
        let key = action_key(name);
        self.actions
            .iter()
            .find(|a| action_key(a.name) == key)
            .copied()
    }
}

fn action_key(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ability::catalog;
    use crate::entity::status::StatOp;
    use crate::grid::TerrainCosts;

    pub(crate) fn base(attack: u32, defense: u32, hp: u32, speed: u32) -> BaseStats {
        BaseStats {
            attack,
            defense,
            hp,
            speed,
            terrain_costs: TerrainCosts::uniform(1),
            ability: "Clutch".into(),
        }
    }

    fn animal(level: u32) -> Animal {
        let config = BattleConfig::default();
        Animal::new(
            "Bear",
            "Bruno",
            base(60, 55, 45, 4),
            level,
            Ivs::neutral(),
            catalog::lookup("Clutch").unwrap(),
            AnimalKind::Ally(AllyProgress::default()),
            &config,
        )
    }

    #[test]
    fn test_stats_at_level_10() {
        let a = animal(10);
        // 60/2 + 10*60/10 = 90
        assert_eq!(a.attack(true), 90);
        // 55/2 + 55 = 82.5 -> 83
        assert_eq!(a.defense(true), 83);
        // 45/2 + 45 = 67.5 -> 68
        assert_eq!(a.max_hp(), 68);
        assert_eq!(a.hp(), 68);
        assert_eq!(a.speed(false), 4.0);
    }

    #[test]
    fn test_pure_attack_ignores_changes() {
        let mut a = animal(10);
        let pure = a.attack(true);
        a.boost("x", StatKind::Attack, StatOp::Mul(1.5), 2.0);
        assert_eq!(a.attack(true), pure);
        assert_eq!(a.attack(false), 135);
    }

    #[test]
    fn test_hp_clamped() {
        let mut a = animal(5);
        assert_eq!(a.set_hp(-20), 0);
        assert!(a.is_dead());
        assert_eq!(a.set_hp(10_000), a.max_hp());
        a.set_hp(1);
        assert_eq!(a.gain_hp(2.4), 2);
    }

    #[test]
    fn test_hp_percent_rounds() {
        let mut a = animal(10);
        a.set_hp(34);
        assert_eq!(a.hp_percent(), 50);
    }

    #[test]
    fn test_action_lookup_ignores_spaces() {
        let config = BattleConfig::default();
        let ostrich = Animal::new(
            "Ostrich",
            "Olga",
            base(50, 55, 45, 4),
            10,
            Ivs::neutral(),
            catalog::lookup("EggCannon").unwrap(),
            AnimalKind::Ally(AllyProgress::default()),
            &config,
        );
        for name in ["Egg Cannon", "EggCannon", "eggcannon"] {
            assert_eq!(ostrich.action(name).map(|a| a.name), Some("Egg Cannon"));
        }
        assert!(ostrich.action("Egg").is_none());
    }

    #[test]
    fn test_speed_bonus_and_snow() {
        let mut a = animal(10).with_evs(Evs {
            speed: 25,
            ..Evs::default()
        });
        assert_eq!(a.speed(false), 6.0);
        a.boost("snow", StatKind::Speed, StatOp::Sub(1.0), 3.0);
        assert_eq!(a.speed(false), 5.0);
        assert_eq!(a.speed(true), 6.0);
    }

    #[test]
    fn test_level_clamped() {
        assert_eq!(animal(0).level, 1);
        assert_eq!(animal(99).level, 50);
    }

    #[test]
    fn test_reset_clears_statuses() {
        let mut a = animal(10);
        a.boost("x", StatKind::Defense, StatOp::Mul(2.0), 5.0);
        a.ability_state.kills = 3;
        a.reset_for_level();
        assert!(a.statuses.changes().is_empty());
        assert_eq!(a.ability_state, AbilityState::default());
    }

    #[test]
    fn test_spending_skill_points() {
        let mut a = animal(3);
        a.progress_mut().unwrap().skill_points = 3;
        assert_eq!(a.spend_skill_points(EvStat::Attack, 5), 3);
        assert_eq!(a.evs.attack, 3);
        assert_eq!(a.progress().unwrap().skill_points, 0);
        assert_eq!(a.spend_skill_points(EvStat::Attack, 1), 0);
    }
}
