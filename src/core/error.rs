use thiserror::Error;

use crate::core::types::ActorId;

#[derive(Error, Debug)]
pub enum BattleError {
    #[error("Unknown species: {0}")]
    UnknownSpecies(String),

    #[error("Unknown ability: {0}")]
    UnknownAbility(String),

    #[error("Malformed terrain cost table for {species}: {reason}")]
    MalformedTerrainCosts { species: String, reason: String },

    #[error("Unknown terrain code: {0}")]
    UnknownTerrain(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid level: {0}")]
    InvalidLevel(String),

    #[error("Actor not found: {0}")]
    ActorNotFound(ActorId),

    #[error("No level is loaded")]
    NoActiveLevel,

    #[error("No saved team named {0}")]
    RecordNotFound(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, BattleError>;
