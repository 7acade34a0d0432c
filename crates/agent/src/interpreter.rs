use tracing::error;
use twinbot_core::config::AgentConfig;
use twinbot_core::domain::{Entity, Intent, IntentType};
use twinbot_nlu::{NluClient, NluError};

/// Turns raw utterances into `(Intent, entities)` using the NLU service.
///
/// `parse` never fails: any client error is logged and replaced by the
/// fallback intent with no entities, so the dispatcher always has input.
pub struct Interpreter<C> {
    client: C,
    agent_id: String,
    timezone: String,
}

impl<C> Interpreter<C>
where
    C: NluClient,
{
    pub fn new(client: C, agent_id: impl Into<String>, timezone: impl Into<String>) -> Self {
        Self { client, agent_id: agent_id.into(), timezone: timezone.into() }
    }

    pub fn from_config(client: C, agent: &AgentConfig) -> Self {
        Self::new(client, agent.id.clone(), agent.timezone.clone())
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }

    pub fn timezone(&self) -> &str {
        &self.timezone
    }

    pub async fn parse(&self, text: &str) -> (Intent, Vec<Entity>) {
        match self.client.parse(&self.agent_id, &self.timezone, text).await {
            Ok(parsed) => {
                let intent = parsed.intent.map(Intent::from).unwrap_or_else(Intent::fallback);
                (intent, parsed.entities.unwrap_or_default())
            }
            Err(nlu_error) => {
                error!(
                    event_name = "dialog.interpreter.nlu_failed",
                    agent_id = %self.agent_id,
                    kind = ?nlu_error.kind,
                    error = %nlu_error,
                    "nlu parse failed, using fallback intent"
                );
                (Intent::fallback(), Vec::new())
            }
        }
    }

    pub async fn intent_types(&self) -> Result<Vec<IntentType>, NluError> {
        self.client.intent_types(&self.agent_id).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use twinbot_core::config::AgentConfig;
    use twinbot_core::domain::{Entity, Intent, IntentType, RawIntent};
    use twinbot_nlu::{NluClient, NluError, NluParse};

    use super::Interpreter;

    /// Replays a canned result and records the request it saw.
    struct ScriptedClient {
        result: fn() -> Result<NluParse, NluError>,
        seen: Mutex<Vec<(String, String, String)>>,
    }

    impl ScriptedClient {
        fn new(result: fn() -> Result<NluParse, NluError>) -> Self {
            Self { result, seen: Mutex::new(Vec::new()) }
        }
    }

    #[async_trait]
    impl NluClient for ScriptedClient {
        async fn parse(
            &self,
            agent_id: &str,
            timezone: &str,
            query: &str,
        ) -> Result<NluParse, NluError> {
            if let Ok(mut seen) = self.seen.lock() {
                seen.push((agent_id.to_string(), timezone.to_string(), query.to_string()));
            }
            (self.result)()
        }

        async fn intent_types(&self, agent_id: &str) -> Result<Vec<IntentType>, NluError> {
            if agent_id == "missing" {
                return Err(NluError::status("service returned 404 Not Found"));
            }
            Ok(vec![IntentType { name: "twin_greeting".to_string(), ..IntentType::default() }])
        }
    }

    fn fallback() -> (Intent, Vec<Entity>) {
        (Intent::new("default", 0.9999), Vec::new())
    }

    #[tokio::test]
    async fn passes_session_context_and_returns_service_result() {
        let client = ScriptedClient::new(|| {
            Ok(NluParse {
                intent: Some(RawIntent {
                    name: Some("twin_way".to_string()),
                    confidence: Some(0.77),
                }),
                entities: Some(vec![Entity::new("music_room", "музыкальный зал")]),
                text: None,
            })
        });
        let interpreter = Interpreter::new(client, "agent-42", "Europe/Moscow");

        let (intent, entities) = interpreter.parse("где музыкальный зал?").await;

        assert_eq!(intent, Intent::new("twin_way", 0.77));
        assert_eq!(entities, vec![Entity::new("music_room", "музыкальный зал")]);
        let seen = interpreter.client.seen.lock().map(|seen| seen.clone()).unwrap_or_default();
        assert_eq!(
            seen,
            vec![(
                "agent-42".to_string(),
                "Europe/Moscow".to_string(),
                "где музыкальный зал?".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn missing_fields_are_defaulted() {
        let client = ScriptedClient::new(|| Ok(NluParse::default()));
        let interpreter = Interpreter::new(client, "agent", "UTC");
        assert_eq!(interpreter.parse("...").await, fallback());

        let client = ScriptedClient::new(|| {
            Ok(NluParse {
                intent: Some(RawIntent { name: Some("twin_goodbye".to_string()), confidence: None }),
                entities: None,
                text: None,
            })
        });
        let interpreter = Interpreter::new(client, "agent", "UTC");
        assert_eq!(
            interpreter.parse("пока").await,
            (Intent::new("twin_goodbye", 0.9999), Vec::new())
        );
    }

    #[tokio::test]
    async fn every_client_failure_becomes_fallback_intent() {
        let failures: [fn() -> Result<NluParse, NluError>; 4] = [
            || Err(NluError::network("connection refused")),
            || Err(NluError::network("operation timed out")),
            || Err(NluError::decode("expected struct NluParse")),
            || Err(NluError::auth("service rejected the token (401 Unauthorized)")),
        ];

        for failure in failures {
            let interpreter = Interpreter::new(ScriptedClient::new(failure), "agent", "UTC");
            assert_eq!(interpreter.parse("привет").await, fallback());
        }
    }

    #[tokio::test]
    async fn session_context_comes_from_agent_config() {
        let agent = AgentConfig {
            id: "agent-9".to_string(),
            timezone: "Asia/Yekaterinburg".to_string(),
        };
        let interpreter =
            Interpreter::from_config(ScriptedClient::new(|| Ok(NluParse::default())), &agent);
        assert_eq!(interpreter.agent_id(), "agent-9");
        assert_eq!(interpreter.timezone(), "Asia/Yekaterinburg");

        interpreter.parse("привет").await;
        let seen = interpreter.client().seen.lock().map(|seen| seen.clone()).unwrap_or_default();
        assert_eq!(seen[0].0, "agent-9");
        assert_eq!(seen[0].1, "Asia/Yekaterinburg");
    }

    #[tokio::test]
    async fn intent_types_propagate_errors() {
        let client = ScriptedClient::new(|| Ok(NluParse::default()));
        let interpreter = Interpreter::new(client, "missing", "UTC");
        assert!(interpreter.intent_types().await.is_err());

        let client = ScriptedClient::new(|| Ok(NluParse::default()));
        let interpreter = Interpreter::new(client, "agent", "UTC");
        let listed = interpreter.intent_types().await.expect("listing should succeed");
        assert_eq!(listed[0].name, "twin_greeting");
    }
}
