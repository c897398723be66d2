//! Pipeline-level errors and their classification.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;
use crate::parse::{FinancialError, ParseError};
use crate::sim::{ScheduleError, SimError};

/// Coarse classification of a pipeline failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A required file or setting is absent.
    InputMissing,
    /// An input exists but could not be read as expected.
    ParseFailure,
    /// Inputs were read but are inconsistent or out of range.
    ValidationFailure,
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("missing input: {0}")]
    MissingInput(&'static str),
    #[error("cannot read {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot read descriptor {}: {source}", .path.display())]
    Descriptor {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("result table: {0}")]
    Parse(#[from] ParseError),
    #[error("descriptor: {0}")]
    Financial(#[from] FinancialError),
    #[error("{field}: {source}")]
    Schedule {
        field: &'static str,
        #[source]
        source: ScheduleError,
    },
    #[error("simulation: {0}")]
    Sim(#[from] SimError),
    #[error("invalid configuration: {}", format_config_errors(.0))]
    Config(Vec<ConfigError>),
}

fn format_config_errors(errors: &[ConfigError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingInput(_) | Self::Unreadable { .. } => ErrorKind::InputMissing,
            Self::Descriptor { .. } | Self::Parse(_) | Self::Financial(_) => ErrorKind::ParseFailure,
            Self::Schedule { .. } | Self::Sim(_) | Self::Config(_) => ErrorKind::ValidationFailure,
        }
    }
}
