use serde_json::json;
use twinbot_agent::Interpreter;
use twinbot_core::config::LoadOptions;
use twinbot_core::errors::ApplicationError;

use crate::commands::{block_on, nlu_client, prepare, CommandResult};

/// Shows how the interpreter sees `text`. Service failures are not errors
/// here: they surface as the fallback intent, exactly as in a dialog turn.
pub fn run(options: &LoadOptions, text: &str) -> CommandResult {
    let result = prepare(options).and_then(|config| {
        block_on(async move {
            let interpreter = Interpreter::from_config(nlu_client(&config)?, &config.agent);
            Ok::<_, ApplicationError>(interpreter.parse(text).await)
        })
    });

    match result {
        Ok((intent, entities)) => CommandResult::success_with_data(
            "parse",
            format!("classified as `{}` ({})", intent.name, intent.confidence),
            Some(json!({ "intent": intent, "entities": entities })),
        ),
        Err(error) => CommandResult::from_error("parse", &error),
    }
}
