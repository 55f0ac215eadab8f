use std::{io, path::PathBuf};

use thiserror::Error;

use crate::config::ConfigParseError;

/// Failures that end a run. Each variant maps onto one process exit status.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("An error occurred while reading configuration file {}\n{source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{source} (in {})", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: ConfigParseError,
    },

    #[error("unable to update configuration file {}: {source}", path.display())]
    ConfigWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("unable to locate configuration file")]
    Locate,

    #[error("{0}")]
    Lookup(String),

    #[error("{0}")]
    Validation(String),

    #[error("An error occurred while trying to fetch data.\n{0:#}")]
    Upstream(anyhow::Error),
}

impl WeatherError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Process exit status for this failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            WeatherError::ConfigRead { .. } | WeatherError::ConfigWrite { .. } => 1,
            WeatherError::Validation(_) => 2,
            WeatherError::ConfigParse { .. } | WeatherError::Locate | WeatherError::Lookup(_) => 3,
            WeatherError::Upstream(_) => 9,
        }
    }
}

pub type Result<T, E = WeatherError> = std::result::Result<T, E>;
