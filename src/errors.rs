// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

use crate::plan::PlanError;
use crate::types::NameError;

#[derive(Error, Debug)]
pub enum TapbatchError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Invalid name: {0}")]
    InvalidName(#[from] NameError),

    #[error("Formula listed twice: {0}")]
    DuplicateFormula(String),

    #[error("brew command failed: {0}")]
    BrewError(String),

    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, TapbatchError>;
