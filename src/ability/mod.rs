pub mod action;
pub mod actions;
pub mod catalog;
pub mod definition;
pub mod hooks;
pub mod innate;
pub mod invokable;

pub use action::Action;
pub use definition::{AbilityDefinition, AbilityKind, AbilityState, Invocation};
pub use hooks::{HookOverrides, HookTable};
