//! Session - the explicit context every operation runs against
//!
//! A `Session` owns the configuration, the content provider, the random
//! source, the presentation sink, the player's roster and inventory, and
//! at most one loaded `Level`. Hooks and commands all take `&mut Session`;
//! nothing in the crate reads global state.

use tracing::{debug, info};

use crate::ability::HookTable;
use crate::battle::events::{BattleEvent, NullSink, PresentationSink};
use crate::battle::level::Level;
use crate::content::{ContentProvider, ContentTable};
use crate::core::config::BattleConfig;
use crate::core::dice::{RandomSource, SeededDice};
use crate::core::error::{BattleError, Result};
use crate::core::types::{ActorId, Difficulty, EvStat, TargetType};
use crate::entity::experience::{attack_experience, gain_experience, kill_experience};
use crate::entity::{
    AfflictionKind, AllyProgress, Animal, AnimalKind, Duration, EnemyTraits, Ivs, StatChange,
};
use crate::grid::Coord;

pub struct Session {
    pub config: BattleConfig,
    content: Box<dyn ContentProvider>,
    dice: Box<dyn RandomSource>,
    sink: Box<dyn PresentationSink>,
    level: Option<Level>,
    events: Vec<BattleEvent>,
    /// Allies kept between levels
    pub roster: Vec<Animal>,
    /// Items picked up or dropped by enemies
    pub inventory: Vec<String>,
    pub difficulty: Difficulty,
    next_id: u32,
}

impl Session {
    /// Validate `config` and start an empty session
    pub fn new(
        config: BattleConfig,
        content: Box<dyn ContentProvider>,
        dice: Box<dyn RandomSource>,
    ) -> Result<Self> {
        config.validate().map_err(BattleError::InvalidConfig)?;
        Ok(Self {
            config,
            content,
            dice,
            sink: Box::new(NullSink),
            level: None,
            events: Vec::new(),
            roster: Vec::new(),
            inventory: Vec::new(),
            difficulty: Difficulty::default(),
            next_id: 1,
        })
    }

    /// Headless config, built-in species, ChaCha dice
    pub fn seeded(seed: u64) -> Result<Self> {
        Self::new(
            BattleConfig::headless(),
            Box::new(ContentTable::builtin()?),
            Box::new(SeededDice::new(seed)),
        )
    }

    pub fn with_sink(mut self, sink: Box<dyn PresentationSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn content(&self) -> &dyn ContentProvider {
        self.content.as_ref()
    }

    // === LEVEL ===

    pub fn level(&self) -> Result<&Level> {
        self.level.as_ref().ok_or(BattleError::NoActiveLevel)
    }

    pub fn level_mut(&mut self) -> Result<&mut Level> {
        self.level.as_mut().ok_or(BattleError::NoActiveLevel)
    }

    pub fn has_level(&self) -> bool {
        self.level.is_some()
    }

    pub(crate) fn install_level(&mut self, level: Level) {
        self.level = Some(level);
    }

    pub(crate) fn take_level(&mut self) -> Option<Level> {
        self.level.take()
    }

    pub(crate) fn next_actor_id(&mut self) -> ActorId {
        let id = ActorId(self.next_id);
        self.next_id += 1;
        id
    }

    // === EVENTS ===

    /// Forward to the sink and keep a copy in the log
    pub fn emit(&mut self, event: BattleEvent) {
        self.sink.on_event(&event);
        self.events.push(event);
    }

    pub fn events(&self) -> &[BattleEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<BattleEvent> {
        std::mem::take(&mut self.events)
    }

    // === RANDOMNESS ===

    pub fn dice(&mut self) -> &mut dyn RandomSource {
        self.dice.as_mut()
    }

    pub fn set_dice(&mut self, dice: Box<dyn RandomSource>) {
        self.dice = dice;
    }

    /// One raw roll against `chance`; no hooks involved
    pub fn chance(&mut self, chance: f64) -> bool {
        self.dice.chance(chance)
    }

    // === ACTORS ===

    /// Live animal on the current level
    pub fn animal(&self, id: ActorId) -> Option<&Animal> {
        self.level.as_ref()?.animal(id)
    }

    pub fn animal_mut(&mut self, id: ActorId) -> Option<&mut Animal> {
        self.level.as_mut()?.animal_mut(id)
    }

    /// Live or fallen animal
    pub fn any_animal(&self, id: ActorId) -> Option<&Animal> {
        let level = self.level.as_ref()?;
        level
            .animal(id)
            .or_else(|| level.fallen(id).and_then(|a| a.as_animal()))
    }

    pub fn require_animal(&self, id: ActorId) -> Result<&Animal> {
        self.animal(id).ok_or(BattleError::ActorNotFound(id))
    }

    /// Still in play; a unit at 0 HP stays alive until its death resolves
    pub fn is_alive(&self, id: ActorId) -> bool {
        self.animal(id).is_some()
    }

    pub fn hooks(&self, id: ActorId) -> Option<HookTable> {
        self.any_animal(id).map(|a| a.hooks)
    }

    pub fn defaults(&self, id: ActorId) -> Option<HookTable> {
        self.any_animal(id).map(|a| a.defaults)
    }

    /// Ability scaling for `id`; `low` for unknown ids
    pub fn ability_calc(&self, id: ActorId, low: f64, high: f64) -> f64 {
        self.any_animal(id)
            .map(|a| a.ability_calc(low, high))
            .unwrap_or(low)
    }

    pub fn hp_percent(&self, id: ActorId) -> i32 {
        self.any_animal(id).map(|a| a.hp_percent()).unwrap_or(0)
    }

    pub fn animal_ids(&self) -> Vec<ActorId> {
        self.level
            .as_ref()
            .map(|l| l.animal_ids())
            .unwrap_or_default()
    }

    pub fn tile_of(&self, id: ActorId) -> Option<Coord> {
        self.level.as_ref()?.actor(id)?.tile
    }

    /// Manhattan distance between two placed actors
    pub fn distance(&self, a: ActorId, b: ActorId) -> Option<u32> {
        Some(self.tile_of(a)?.distance(&self.tile_of(b)?))
    }

    // === RELATIONS ===

    /// How `target` relates to `user`; `None` for self or non-animals
    pub fn target_type_of(&self, user: ActorId, target: ActorId) -> Option<TargetType> {
        if user == target {
            return None;
        }
        let user = self.animal(user)?;
        let target = self.animal(target)?;
        Some(if user.is_friend_of(target) {
            TargetType::Friend
        } else {
            TargetType::Foe
        })
    }

    /// Within the user's attack range
    pub fn within_range(&self, user: ActorId, target: ActorId) -> bool {
        match (self.animal(user), self.distance(user, target)) {
            (Some(animal), Some(distance)) => distance <= animal.fields.range,
            _ => false,
        }
    }

    pub fn foes_of(&self, id: ActorId) -> Vec<ActorId> {
        self.related(id, TargetType::Foe)
    }

    pub fn friends_of(&self, id: ActorId) -> Vec<ActorId> {
        self.related(id, TargetType::Friend)
    }

    fn related(&self, id: ActorId, relation: TargetType) -> Vec<ActorId> {
        self.animal_ids()
            .into_iter()
            .filter(|other| self.target_type_of(id, *other) == Some(relation))
            .collect()
    }

    pub fn foes_within(&self, id: ActorId, radius: f64) -> Vec<ActorId> {
        self.within(self.foes_of(id), id, radius)
    }

    pub fn friends_within(&self, id: ActorId, radius: f64) -> Vec<ActorId> {
        self.within(self.friends_of(id), id, radius)
    }

    fn within(&self, ids: Vec<ActorId>, center: ActorId, radius: f64) -> Vec<ActorId> {
        ids.into_iter()
            .filter(|other| {
                self.distance(center, *other)
                    .map(|d| d as f64 <= radius)
                    .unwrap_or(false)
            })
            .collect()
    }

    // === STATUS & HP ===

    pub fn apply_stat_change(&mut self, id: ActorId, change: StatChange) {
        if let Some(animal) = self.animal_mut(id) {
            animal.apply_stat_change(change);
        }
    }

    pub fn afflict(&mut self, id: ActorId, kind: AfflictionKind, duration: Duration) {
        if let Some(animal) = self.animal_mut(id) {
            animal.statuses.afflict(kind, duration);
        }
    }

    /// Shift HP by `delta` with clamping; returns the new HP
    pub fn change_hp(&mut self, id: ActorId, delta: i32) -> i32 {
        let hp = self.animal(id).map(|a| a.hp()).unwrap_or(0);
        self.set_hp(id, hp.saturating_add(delta))
    }

    /// Set HP clamped to [0, max]; returns the stored value
    pub fn set_hp(&mut self, id: ActorId, hp: i32) -> i32 {
        let Some(animal) = self.animal_mut(id) else {
            return 0;
        };
        let hp = animal.set_hp(hp);
        let max_hp = animal.max_hp();
        self.emit(BattleEvent::HpChanged { id, hp, max_hp });
        hp
    }

    /// Heal by a rounded amount; returns the HP actually gained
    pub fn gain_hp(&mut self, id: ActorId, amount: f64) -> i32 {
        let Some(before) = self.animal(id).map(|a| a.hp()) else {
            return 0;
        };
        let after = self.set_hp(id, before + amount.round() as i32);
        after - before
    }

    pub fn gain_hp_percent(&mut self, id: ActorId, percent: f64) -> i32 {
        let max = self.animal(id).map(|a| a.max_hp()).unwrap_or(0);
        self.gain_hp(id, max as f64 * percent / 100.0)
    }

    /// Move a defeated unit off the grid into the graveyard
    pub(crate) fn bury(&mut self, id: ActorId) {
        if let Some(level) = self.level.as_mut() {
            level.bury(id);
        }
    }

    // === EXPERIENCE ===

    pub fn award_attack_experience(&mut self, me: ActorId, foe: ActorId) {
        self.award_experience(me, foe, attack_experience);
    }

    pub fn award_kill_experience(&mut self, me: ActorId, foe: ActorId) {
        self.award_experience(me, foe, kill_experience);
    }

    fn award_experience(
        &mut self,
        me: ActorId,
        foe: ActorId,
        curve: fn(&BattleConfig, u32, u32) -> f64,
    ) {
        let Some(foe_level) = self.any_animal(foe).map(|a| a.level) else {
            return;
        };
        let Some(level) = self.level.as_mut() else {
            return;
        };
        let Some(animal) = level.animal_mut(me).filter(|a| a.is_ally()) else {
            return;
        };
        let amount = curve(&self.config, animal.level, foe_level);
        let gained = gain_experience(animal, amount, &self.config);
        if gained > 0 {
            let reached = animal.level;
            self.emit(BattleEvent::LevelUp { id: me, level: reached });
        }
    }

    // === ROSTER ===

    /// A fresh ally with skill points equal to its level
    pub fn create_ally(&mut self, species: &str, name: &str, level: u32) -> Result<Animal> {
        let level = level.clamp(self.config.min_level, self.config.max_level);
        let progress = AllyProgress {
            experience: 0.0,
            skill_points: level,
            active: true,
        };
        self.create_animal(species, name, level, AnimalKind::Ally(progress))
    }

    /// An enemy at `level`, or at a rolled level when none is given
    pub fn create_enemy(&mut self, species: &str, level: Option<u32>) -> Result<Animal> {
        let level = match level {
            Some(level) => level,
            None => self.roll_enemy_level(),
        };
        let traits = EnemyTraits::from_config(&self.config);
        self.create_animal(species, species, level, AnimalKind::Enemy(traits))
    }

    fn create_animal(
        &mut self,
        species: &str,
        name: &str,
        level: u32,
        kind: AnimalKind,
    ) -> Result<Animal> {
        let base = self.content.base_stats(species)?.clone();
        let ability = self.content.ability(&base.ability)?;
        let ivs = Ivs::roll(self.dice.as_mut(), self.config.iv_variation);
        debug!("created {} ({}) at level {}", name, species, level);
        Ok(Animal::new(species, name, base, level, ivs, ability, kind, &self.config))
    }

    /// Normal roll around the strongest ally's level plus difficulty bias
    pub fn roll_enemy_level(&mut self) -> u32 {
        let strongest = self
            .roster
            .iter()
            .map(|a| a.level)
            .max()
            .unwrap_or(self.config.min_level);
        let center = strongest as f64 + self.difficulty.level_bias() as f64;
        let max_dev = self.config.max_enemy_level_deviation as f64;
        let roll = center + self.dice.normal() * max_dev / 3.0;
        let level = roll
            .round()
            .clamp(center - max_dev, center + max_dev)
            .clamp(self.config.min_level as f64, self.config.max_level as f64);
        level as u32
    }

    /// Add a new ally to the roster
    pub fn recruit(&mut self, ally: Animal) {
        info!("{} joined the roster", ally.name);
        self.roster.push(ally);
    }

    /// Spend a roster ally's skill points on one EV
    pub fn invest(&mut self, roster_index: usize, stat: EvStat, points: u32) -> u32 {
        self.roster
            .get_mut(roster_index)
            .map(|a| a.spend_skill_points(stat, points))
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dice::ScriptedDice;

    fn session(roll: f64) -> Session {
        Session::new(
            BattleConfig::headless(),
            Box::new(ContentTable::builtin().unwrap()),
            Box::new(ScriptedDice::constant(roll)),
        )
        .unwrap()
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = BattleConfig {
            min_level: 0,
            ..BattleConfig::default()
        };
        let result = Session::new(
            config,
            Box::new(ContentTable::builtin().unwrap()),
            Box::new(ScriptedDice::constant(0.5)),
        );
        assert!(matches!(result, Err(BattleError::InvalidConfig(_))));
    }

    #[test]
    fn test_create_ally_gets_skill_points() {
        let mut s = session(0.5);
        let ally = s.create_ally("Bear", "Bruno", 7).unwrap();
        assert_eq!(ally.level, 7);
        assert_eq!(ally.progress().unwrap().skill_points, 7);
        assert_eq!(ally.hp(), ally.max_hp());
        assert!(s.create_ally("Dragon", "Puff", 3).is_err());
    }

    #[test]
    fn test_enemy_level_centers_on_strongest_ally() {
        // 0.5 then 0.25: Box-Muller gives sqrt(2 ln 2) * cos(pi/2) = 0
        let mut s = session(0.5);
        let ally = s.create_ally("Bear", "Bruno", 12).unwrap();
        s.recruit(ally);
        s.set_dice(Box::new(ScriptedDice::new([0.5, 0.25])));
        s.difficulty = Difficulty::Hard;
        assert_eq!(s.roll_enemy_level(), 13);
    }

    #[test]
    fn test_enemy_level_clamped_to_deviation() {
        // a tiny first roll sends the normal sample far out
        let mut s = session(0.5);
        let ally = s.create_ally("Bear", "Bruno", 20).unwrap();
        s.recruit(ally);
        s.set_dice(Box::new(ScriptedDice::new([1e-300, 0.0])));
        assert_eq!(s.roll_enemy_level(), 26);
    }

    #[test]
    fn test_no_level_is_an_error() {
        let s = session(0.5);
        assert!(matches!(s.level(), Err(BattleError::NoActiveLevel)));
        assert!(s.animal_ids().is_empty());
    }

    #[test]
    fn test_invest_spends_roster_points() {
        let mut s = session(0.5);
        let ally = s.create_ally("Bear", "Bruno", 4).unwrap();
        s.recruit(ally);
        assert_eq!(s.invest(0, EvStat::Speed, 2), 2);
        assert_eq!(s.roster[0].evs.speed, 2);
        assert_eq!(s.invest(3, EvStat::Speed, 2), 0);
    }
}
