use serde::{Deserialize, Serialize};

pub const DEFAULT_INTENT_NAME: &str = "default";
pub const DEFAULT_INTENT_CONFIDENCE: f64 = 0.9999;

/// Classified purpose of an utterance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    pub name: String,
    pub confidence: f64,
}

impl Intent {
    pub fn new(name: impl Into<String>, confidence: f64) -> Self {
        Self { name: name.into(), confidence }
    }

    /// The intent substituted whenever the classifier gives nothing usable.
    pub fn fallback() -> Self {
        Self::new(DEFAULT_INTENT_NAME, DEFAULT_INTENT_CONFIDENCE)
    }

    pub fn normalized_name(&self) -> String {
        self.name.trim().to_lowercase()
    }
}

impl Default for Intent {
    fn default() -> Self {
        Self::fallback()
    }
}

/// Intent as it arrives on the wire, where either field may be missing.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct RawIntent {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
}

impl From<RawIntent> for Intent {
    fn from(raw: RawIntent) -> Self {
        Self {
            name: raw.name.unwrap_or_else(|| DEFAULT_INTENT_NAME.to_string()),
            confidence: raw.confidence.unwrap_or(DEFAULT_INTENT_CONFIDENCE),
        }
    }
}
