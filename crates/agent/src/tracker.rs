use tracing::{debug, info};
use twinbot_core::config::AppConfig;
use twinbot_nlu::NluClient;
use uuid::Uuid;

use crate::dispatcher::ActionDispatcher;
use crate::interpreter::Interpreter;

/// One conversation: interprets each utterance and dispatches it.
pub struct DialogTracker<C> {
    interpreter: Interpreter<C>,
    dispatcher: ActionDispatcher,
}

impl<C> DialogTracker<C>
where
    C: NluClient,
{
    pub fn new(interpreter: Interpreter<C>, dispatcher: ActionDispatcher) -> Self {
        Self { interpreter, dispatcher }
    }

    pub fn from_config(client: C, config: &AppConfig) -> Self {
        Self::new(
            Interpreter::from_config(client, &config.agent),
            ActionDispatcher::new(config.dialog.confidence_threshold),
        )
    }

    pub fn interpreter(&self) -> &Interpreter<C> {
        &self.interpreter
    }

    pub fn dispatcher(&self) -> &ActionDispatcher {
        &self.dispatcher
    }

    pub async fn predict(&mut self, text: &str) -> String {
        let turn_id = Uuid::new_v4();
        let (intent, entities) = self.interpreter.parse(text).await;
        info!(
            event_name = "dialog.turn.interpreted",
            turn_id = %turn_id,
            intent = %intent.name,
            confidence = intent.confidence,
            entity_count = entities.len(),
            "utterance interpreted"
        );

        let reply = self.dispatcher.process(intent, entities);
        debug!(event_name = "dialog.turn.replied", turn_id = %turn_id, reply = %reply, "reply ready");
        reply
    }
}
