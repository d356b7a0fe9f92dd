//! Error types shared across configuration loading and simulation execution.

use std::fmt;

/// A single configuration problem, reported with the offending field.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigError {
    pub field: String,
    pub message: String,
}

impl ConfigError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

/// Errors surfaced by the simulation core, matching the three kinds a caller
/// needs to distinguish: bad input, a bad scenario intervention, and a bug.
#[derive(Debug, Clone, PartialEq)]
pub enum SimError {
    InvalidConfig(Vec<ConfigError>),
    InvalidIntervention { index: usize, message: String },
    InternalInvariant { detail: String },
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::InvalidConfig(errors) => {
                writeln!(f, "invalid configuration ({} issue(s)):", errors.len())?;
                for e in errors {
                    writeln!(f, "  - {e}")?;
                }
                Ok(())
            }
            SimError::InvalidIntervention { index, message } => {
                write!(f, "invalid intervention at index {index}: {message}")
            }
            SimError::InternalInvariant { detail } => {
                write!(f, "internal invariant violated: {detail}")
            }
        }
    }
}

impl std::error::Error for SimError {}

pub type SimResult<T> = Result<T, SimError>;
