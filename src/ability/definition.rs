//! Ability definitions and per-level ability state

use crate::ability::action::Action;
use crate::ability::hooks::HookOverrides;
use crate::core::types::ActorId;
use crate::session::Session;

/// Runs an invokable ability; true if it counts as used
pub type InvokeFn = fn(&mut Session, ActorId) -> bool;
/// AI predicate for invoking
pub type ShouldInvokeFn = fn(&mut Session, ActorId) -> bool;

#[derive(Debug, Clone, Copy)]
pub struct Invocation {
    /// Uses per level at 0 and at max ability EVs
    pub uses: (f64, f64),
    pub invoke: InvokeFn,
    pub should_invoke: ShouldInvokeFn,
}

#[derive(Debug, Clone, Copy)]
pub enum AbilityKind {
    /// Pure hook overrides
    Innate,
    /// Overrides plus a budgeted active effect
    Invokable(Invocation),
    /// Adds an action to the unit's list
    Action(Action),
}

#[derive(Debug, Clone, Copy)]
pub struct AbilityDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub kind: AbilityKind,
    pub overrides: HookOverrides,
}

impl AbilityDefinition {
    pub fn innate(name: &'static str, description: &'static str, overrides: HookOverrides) -> Self {
        Self {
            name,
            description,
            kind: AbilityKind::Innate,
            overrides,
        }
    }

    pub fn invokable(
        name: &'static str,
        description: &'static str,
        uses: (f64, f64),
        invoke: InvokeFn,
        should_invoke: ShouldInvokeFn,
    ) -> Self {
        Self {
            name,
            description,
            kind: AbilityKind::Invokable(Invocation {
                uses,
                invoke,
                should_invoke,
            }),
            overrides: HookOverrides::none(),
        }
    }

    pub fn action(action: Action) -> Self {
        Self {
            name: action.name,
            description: action.description,
            kind: AbilityKind::Action(action),
            overrides: HookOverrides::none(),
        }
    }

    pub fn with_overrides(mut self, overrides: HookOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn invocation(&self) -> Option<&Invocation> {
        match &self.kind {
            AbilityKind::Invokable(invocation) => Some(invocation),
            _ => None,
        }
    }

    pub fn granted_action(&self) -> Option<&Action> {
        match &self.kind {
            AbilityKind::Action(action) => Some(action),
            _ => None,
        }
    }
}

/// Ability-local state, wiped on every merge
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AbilityState {
    /// Invocations spent this level
    pub uses: u32,
    /// Defeats counted by kill-scaling abilities
    pub kills: u32,
    /// HP left in an active substitute
    pub substitute_hp: Option<i32>,
    /// One more action before the turn ends on its own
    pub bonus_action: bool,
}
