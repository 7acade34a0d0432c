pub mod chat;
pub mod config;
pub mod intents;
pub mod parse;

use serde::Serialize;
use serde_json::Value;
use twinbot_core::config::{AppConfig, LoadOptions};
use twinbot_core::errors::ApplicationError;
use twinbot_nlu::TwinNluClient;

use crate::logging::init_logging;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        Self::success_with_data(command, message, None)
    }

    pub fn success_with_data(
        command: &str,
        message: impl Into<String>,
        data: Option<Value>,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            data,
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
            data: None,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    pub fn from_error(command: &str, error: &ApplicationError) -> Self {
        Self::failure(command, error.error_class(), error.to_string(), error.exit_code())
    }

    /// Plain text output, used for bot replies.
    pub fn text(output: impl Into<String>) -> Self {
        Self { exit_code: 0, output: output.into() }
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

/// Loads configuration and installs logging for a command run.
pub(crate) fn prepare(options: &LoadOptions) -> Result<AppConfig, ApplicationError> {
    let config = AppConfig::load(options.clone())?;
    init_logging(&config);
    Ok(config)
}

pub(crate) fn nlu_client(config: &AppConfig) -> Result<TwinNluClient, ApplicationError> {
    TwinNluClient::from_config(&config.nlu)
        .map_err(|error| ApplicationError::Integration(error.to_string()))
}

/// Runs `future` to completion on a single-threaded runtime.
pub(crate) fn block_on<F, T>(future: F) -> Result<T, ApplicationError>
where
    F: std::future::Future<Output = Result<T, ApplicationError>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
    runtime.block_on(future)
}
