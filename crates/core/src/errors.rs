use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error(transparent)]
    Configuration(#[from] ConfigError),
    #[error("integration failure: {0}")]
    Integration(String),
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),
}

impl ApplicationError {
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "config_validation",
            Self::Integration(_) => "nlu_integration",
            Self::Io(_) => "io",
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Configuration(_) => 2,
            Self::Integration(_) => 3,
            Self::Io(_) => 4,
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "Configuration is invalid. Run `twinbot config` to inspect it.",
            Self::Integration(_) => "The NLU service is unavailable. Please retry shortly.",
            Self::Io(_) => "Reading input or writing output failed.",
        }
    }
}
