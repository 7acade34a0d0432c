//! NLU Client - HTTP boundary to the remote classification service
//!
//! The service classifies an utterance for a given agent and returns the
//! intent plus extracted entities. This crate performs the requests and
//! decodes the payloads; it does not recover from failures. Callers that
//! need a total function (the dialog interpreter) catch `NluError` themselves.
//!
//! # Endpoints
//!
//! - `POST {base_url}/rasa_nlu/parse/` - form fields `agent_uuid`, `timezone`, `query`
//! - `GET {base_url}/agents/{agent_uuid}/intent_types/` - intent definitions
//!
//! Both carry `Authorization: Token <token>`.

pub mod client;
pub mod error;

use async_trait::async_trait;
use serde::Deserialize;
use twinbot_core::domain::{Entity, IntentType, RawIntent};

pub use client::TwinNluClient;
pub use error::{NluError, NluErrorKind};

/// Decoded parse response. Both fields are optional on the wire.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct NluParse {
    #[serde(default)]
    pub intent: Option<RawIntent>,
    #[serde(default)]
    pub entities: Option<Vec<Entity>>,
    #[serde(default)]
    pub text: Option<String>,
}

#[async_trait]
pub trait NluClient: Send + Sync {
    async fn parse(&self, agent_id: &str, timezone: &str, query: &str)
        -> Result<NluParse, NluError>;

    async fn intent_types(&self, agent_id: &str) -> Result<Vec<IntentType>, NluError>;
}
