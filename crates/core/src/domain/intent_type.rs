use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Intent definition registered for an agent on the NLU service.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct IntentType {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
