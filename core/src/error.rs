use thiserror::Error;

use crate::event::DeathCause;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid config: {reason}")]
    InvalidConfig { reason: String },

    #[error("Session is over ({cause}); restart required")]
    SessionOver { cause: DeathCause },

    #[error("tick() called on paused clock")]
    PausedClock,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SimError {
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig { reason: reason.into() }
    }
}

pub type SimResult<T> = Result<T, SimError>;
