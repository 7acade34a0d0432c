use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, RequestBuilder, Response, StatusCode, Url};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::debug;
use twinbot_core::config::NluConfig;
use twinbot_core::domain::IntentType;

use crate::{NluClient, NluError, NluParse};

/// Client for the twin NLU REST API.
#[derive(Clone, Debug)]
pub struct TwinNluClient {
    client: Client,
    base_url: String,
    token: SecretString,
}

impl TwinNluClient {
    pub fn new(
        base_url: impl Into<String>,
        token: SecretString,
        timeout: Duration,
    ) -> Result<Self, NluError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| NluError::client_setup(error.to_string()))?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = Self { client, base_url, token };
        client.endpoint(&[])?;
        Ok(client)
    }

    pub fn from_config(config: &NluConfig) -> Result<Self, NluError> {
        Self::new(
            config.base_url.clone(),
            config.token.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `base_url` extended by `segments`, each percent-encoded as one path
    /// segment. A trailing `""` segment yields a trailing slash.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, NluError> {
        let mut url = Url::parse(&self.base_url).map_err(|error| {
            NluError::client_setup(format!("invalid base url `{}`: {error}", self.base_url))
        })?;
        url.path_segments_mut()
            .map_err(|()| {
                NluError::client_setup(format!("base url `{}` cannot carry a path", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header(header::ACCEPT, "application/json")
            .header(header::AUTHORIZATION, format!("Token {}", self.token.expose_secret()))
    }
}

#[async_trait]
impl NluClient for TwinNluClient {
    async fn parse(
        &self,
        agent_id: &str,
        timezone: &str,
        query: &str,
    ) -> Result<NluParse, NluError> {
        let url = self.endpoint(&["rasa_nlu", "parse", ""])?;
        debug!(event_name = "nlu.parse.request", agent_id, timezone, "sending parse request");

        let form = [("agent_uuid", agent_id), ("timezone", timezone), ("query", query)];
        let response = self.authorized(self.client.post(url).form(&form)).send().await?;

        decode_json(response).await
    }

    async fn intent_types(&self, agent_id: &str) -> Result<Vec<IntentType>, NluError> {
        let url = self.endpoint(&["agents", agent_id, "intent_types", ""])?;
        debug!(event_name = "nlu.intent_types.request", agent_id, "listing intent types");

        let response = self.authorized(self.client.get(url)).send().await?;

        decode_json(response).await
    }
}

async fn decode_json<T>(response: Response) -> Result<T, NluError>
where
    T: DeserializeOwned,
{
    let status = response.status();
    let body = response.bytes().await?;

    if !status.is_success() {
        let snippet = String::from_utf8_lossy(&body).chars().take(200).collect::<String>();
        return Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                NluError::auth(format!("service rejected the token ({status}): {snippet}"))
            }
            _ => NluError::status(format!("service returned {status}: {snippet}")),
        });
    }

    serde_json::from_slice(&body).map_err(|error| NluError::decode(error.to_string()))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::{
        extract::Path,
        http::{HeaderMap, StatusCode},
        response::IntoResponse,
        routing::{get, post},
        Form, Json, Router,
    };
    use serde::Deserialize;
    use serde_json::json;
    use tokio::net::TcpListener;

    use super::TwinNluClient;
    use crate::{NluClient, NluErrorKind};

    const TOKEN: &str = "test-token";

    #[derive(Debug, Deserialize)]
    struct ParseForm {
        agent_uuid: String,
        timezone: String,
        query: String,
    }

    fn authorized(headers: &HeaderMap) -> bool {
        headers.get("authorization").and_then(|value| value.to_str().ok())
            == Some("Token test-token")
    }

    async fn parse_handler(headers: HeaderMap, Form(form): Form<ParseForm>) -> impl IntoResponse {
        if !authorized(&headers) {
            return (StatusCode::UNAUTHORIZED, Json(json!({"detail": "Invalid token."})));
        }
        if form.query == "broken" {
            return (StatusCode::OK, Json(json!("not an object")));
        }

        (
            StatusCode::OK,
            Json(json!({
                "text": form.query,
                "intent": {"name": "twin_way", "confidence": 0.87},
                "entities": [
                    {"entity": "swimming_pool", "value": "бассейн", "start": 10, "end": 17},
                    {"entity": "agent", "value": form.agent_uuid},
                    {"entity": "tz", "value": form.timezone}
                ]
            })),
        )
    }

    async fn intent_types_handler(
        headers: HeaderMap,
        Path(agent_id): Path<String>,
    ) -> impl IntoResponse {
        if !authorized(&headers) {
            return (StatusCode::FORBIDDEN, Json(json!({"detail": "forbidden"})));
        }

        (
            StatusCode::OK,
            Json(json!([
                {"id": 1, "name": "twin_greeting", "agent": agent_id},
                {"id": 2, "name": "twin_goodbye"},
                {"id": 3, "name": "twin_way", "description": "где находится"}
            ])),
        )
    }

    async fn spawn_stub() -> String {
        let app = Router::new()
            .route("/api/v1/rasa_nlu/parse/", post(parse_handler))
            .route("/api/v1/agents/{agent_id}/intent_types/", get(intent_types_handler))
            .route(
                "/broken/v1/rasa_nlu/parse/",
                post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded") }),
            );

        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind stub listener");
        let address = listener.local_addr().expect("stub address");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        format!("http://{address}")
    }

    fn client(base_url: String, token: &str) -> TwinNluClient {
        TwinNluClient::new(base_url, token.to_string().into(), Duration::from_secs(5))
            .expect("client should build")
    }

    #[tokio::test]
    async fn parse_posts_form_and_decodes_intent_with_entities() {
        let host = spawn_stub().await;
        let client = client(format!("{host}/api/v1/"), TOKEN);
        assert_eq!(client.base_url(), format!("{host}/api/v1"));

        let parsed = client
            .parse("agent-1", "UTC", "где бассейн?")
            .await
            .expect("parse should succeed against stub");

        let intent = parsed.intent.expect("intent should be present");
        assert_eq!(intent.name.as_deref(), Some("twin_way"));
        assert_eq!(intent.confidence, Some(0.87));

        let entities = parsed.entities.expect("entities should be present");
        assert_eq!(entities.len(), 3);
        assert_eq!(entities[0].entity, "swimming_pool");
        assert_eq!(entities[0].start, Some(10));
        assert_eq!(entities[1].value, "agent-1");
        assert_eq!(entities[2].value, "UTC");
        assert_eq!(parsed.text.as_deref(), Some("где бассейн?"));
    }

    #[tokio::test]
    async fn intent_types_are_listed_in_service_order() {
        let host = spawn_stub().await;
        let client = client(format!("{host}/api/v1"), TOKEN);

        let intent_types = client.intent_types("agent-7").await.expect("listing should succeed");
        let names: Vec<&str> = intent_types.iter().map(|item| item.name.as_str()).collect();

        assert_eq!(names, vec!["twin_greeting", "twin_goodbye", "twin_way"]);
        assert_eq!(intent_types[0].extra["agent"], "agent-7");
        assert_eq!(intent_types[2].description.as_deref(), Some("где находится"));
    }

    #[tokio::test]
    async fn agent_id_is_sent_as_a_single_path_segment() {
        let host = spawn_stub().await;
        let client = client(format!("{host}/api/v1"), TOKEN);

        let intent_types =
            client.intent_types("team/a?b#c").await.expect("listing should succeed");
        assert_eq!(intent_types[0].extra["agent"], "team/a?b#c");
    }

    #[test]
    fn base_url_without_scheme_is_rejected() {
        let error = TwinNluClient::new(
            "ai.twin24.ai/api/v1",
            "token".to_string().into(),
            Duration::from_secs(5),
        )
        .expect_err("relative base url");
        assert_eq!(error.kind, NluErrorKind::ClientSetup);
    }

    #[tokio::test]
    async fn rejected_token_is_classified_as_auth() {
        let host = spawn_stub().await;
        let client = client(format!("{host}/api/v1"), "wrong-token");

        let parse_error = client.parse("agent-1", "UTC", "привет").await.expect_err("401");
        assert_eq!(parse_error.kind, NluErrorKind::Auth);

        let listing_error = client.intent_types("agent-1").await.expect_err("403");
        assert_eq!(listing_error.kind, NluErrorKind::Auth);
    }

    #[tokio::test]
    async fn unexpected_payload_is_a_decode_error() {
        let host = spawn_stub().await;
        let client = client(format!("{host}/api/v1"), TOKEN);

        let error = client.parse("agent-1", "UTC", "broken").await.expect_err("bad payload");
        assert_eq!(error.kind, NluErrorKind::Decode);
    }

    #[tokio::test]
    async fn server_failure_is_a_status_error() {
        let host = spawn_stub().await;
        let client = client(format!("{host}/broken/v1"), TOKEN);

        let error = client.parse("agent-1", "UTC", "привет").await.expect_err("500");
        assert_eq!(error.kind, NluErrorKind::Status);
        assert!(error.message.contains("500"));
    }

    #[tokio::test]
    async fn unreachable_service_is_a_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind probe listener");
        let address = listener.local_addr().expect("probe address");
        drop(listener);

        let client = client(format!("http://{address}/api/v1"), TOKEN);
        let error = client.parse("agent-1", "UTC", "привет").await.expect_err("refused");
        assert_eq!(error.kind, NluErrorKind::Network);
    }
}
