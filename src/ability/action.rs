//! Targetable actions
//!
//! Every animal can Melee. Action-granting abilities append one more.

use crate::core::types::{ActorId, TargetType};
use crate::session::Session;

pub type ActivateFn = fn(&mut Session, ActorId, ActorId);
pub type ShouldUseFn = fn(&mut Session, ActorId, ActorId) -> bool;
pub type CanUseFn = fn(&Session, ActorId, ActorId) -> bool;

#[derive(Debug, Clone, Copy)]
pub struct Action {
    pub name: &'static str,
    pub description: &'static str,
    pub target: TargetType,
    pub priority: i32,
    pub activate: ActivateFn,
    /// AI predicate
    pub should_use: ShouldUseFn,
    /// Replaces the default "within range" adjacency check
    pub can_use: Option<CanUseFn>,
}

impl Action {
    pub const MELEE: &'static str = "Melee";

    /// The normal attack
    pub fn melee() -> Self {
        Self {
            name: Self::MELEE,
            description: "The normal attack",
            target: TargetType::Foe,
            priority: 0,
            activate: melee_activate,
            should_use: melee_should_use,
            can_use: None,
        }
    }

    pub fn is_melee(&self) -> bool {
        self.name == Self::MELEE
    }

    /// Target type matches and the adjacency check passes
    pub fn can_be_used(&self, session: &Session, user: ActorId, target: ActorId) -> bool {
        let Some(relation) = session.target_type_of(user, target) else {
            return false;
        };
        if relation != self.target {
            return false;
        }
        match self.can_use {
            Some(check) => check(session, user, target),
            None => session.within_range(user, target),
        }
    }
}

fn melee_activate(session: &mut Session, user: ActorId, target: ActorId) {
    session.attack(user, target, Default::default());
}

fn melee_should_use(session: &mut Session, user: ActorId, target: ActorId) -> bool {
    session.can_attack(user, target)
}
