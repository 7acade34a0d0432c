pub mod entity;
pub mod intent;
pub mod intent_type;

use serde::{Deserialize, Serialize};

pub use entity::Entity;
pub use intent::{Intent, RawIntent};
pub use intent_type::IntentType;

/// One interpreted utterance: the classified intent plus its entities.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub intent: Intent,
    pub entities: Vec<Entity>,
}

impl Turn {
    pub fn new(intent: Intent, entities: Vec<Entity>) -> Self {
        Self { intent, entities }
    }
}
