//! Beast Tactics - turn-based battle engine for animal squads on a tile grid

pub mod ability;
pub mod battle;
pub mod combat;
pub mod content;
pub mod core;
pub mod entity;
pub mod grid;
pub mod persistence;
pub mod session;

pub use session::Session;
