use serde_json::Value;
use twinbot_agent::Interpreter;
use twinbot_core::config::LoadOptions;
use twinbot_core::errors::ApplicationError;

use crate::commands::{block_on, nlu_client, prepare, CommandResult};

pub fn run(options: &LoadOptions) -> CommandResult {
    let result = prepare(options).and_then(|config| {
        block_on(async move {
            let interpreter = Interpreter::from_config(nlu_client(&config)?, &config.agent);
            let intent_types = interpreter
                .intent_types()
                .await
                .map_err(|error| ApplicationError::Integration(error.to_string()))?;
            Ok::<_, ApplicationError>((config.agent.id.clone(), intent_types))
        })
    });

    match result {
        Ok((agent_id, intent_types)) => {
            let message =
                format!("{} intent types registered for agent {agent_id}", intent_types.len());
            let data = serde_json::to_value(&intent_types).unwrap_or(Value::Null);
            CommandResult::success_with_data("intents", message, Some(data))
        }
        Err(error) => CommandResult::from_error("intents", &error),
    }
}
