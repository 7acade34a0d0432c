//! Shared domain types and configuration for the twinbot dialog handler.
//!
//! - `domain` - intents, entities, intent-type records and entity lookups
//! - `config` - layered configuration (defaults, file, env, overrides)
//! - `errors` - application error taxonomy used at the CLI edge

pub mod config;
pub mod domain;
pub mod errors;

pub use config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions};
pub use domain::entity::{find_all, find_first};
pub use domain::{Entity, Intent, IntentType, RawIntent, Turn};
pub use errors::ApplicationError;
