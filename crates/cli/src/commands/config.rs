use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::ExposeSecret;
use toml::Value;
use twinbot_core::config::{resolve_config_path, AppConfig, LoadOptions};

use crate::commands::{prepare, CommandResult};

pub fn run(options: &LoadOptions) -> CommandResult {
    let config = match prepare(options) {
        Ok(config) => config,
        Err(error) => return CommandResult::from_error("config", &error),
    };

    let config_file_path = resolve_config_path(options.config_path.as_deref());
    CommandResult::text(render(&config, config_file_path))
}

pub fn render(config: &AppConfig, config_file_path: Option<PathBuf>) -> String {
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key_path: &str, env_keys: &[&str]| {
        field_source(key_path, env_keys, config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let mut lines =
        vec!["effective config (source precedence: env > file > default):".to_string()];

    lines.push(render_line(
        "nlu.base_url",
        &config.nlu.base_url,
        source("nlu.base_url", &["TWINBOT_NLU_BASE_URL"]),
    ));
    lines.push(render_line(
        "nlu.token",
        &redact_token(config.nlu.token.expose_secret()),
        source("nlu.token", &["TWINBOT_NLU_TOKEN"]),
    ));
    lines.push(render_line(
        "nlu.timeout_secs",
        &config.nlu.timeout_secs.to_string(),
        source("nlu.timeout_secs", &["TWINBOT_NLU_TIMEOUT_SECS"]),
    ));
    lines.push(render_line("agent.id", &config.agent.id, source("agent.id", &["TWINBOT_AGENT_ID"])));
    lines.push(render_line(
        "agent.timezone",
        &config.agent.timezone,
        source("agent.timezone", &["TWINBOT_AGENT_TIMEZONE"]),
    ));
    lines.push(render_line(
        "dialog.confidence_threshold",
        &config.dialog.confidence_threshold.to_string(),
        source("dialog.confidence_threshold", &["TWINBOT_DIALOG_CONFIDENCE_THRESHOLD"]),
    ));
    lines.push(render_line(
        "logging.level",
        &config.logging.level,
        source("logging.level", &["TWINBOT_LOGGING_LEVEL", "TWINBOT_LOG_LEVEL"]),
    ));
    lines.push(render_line(
        "logging.format",
        &format!("{:?}", config.logging.format),
        source("logging.format", &["TWINBOT_LOGGING_FORMAT", "TWINBOT_LOG_FORMAT"]),
    ));

    lines.join("\n")
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

fn redact_token(token: &str) -> String {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    if trimmed.chars().count() > 8 {
        let prefix = trimmed.chars().take(4).collect::<String>();
        return format!("{prefix}***");
    }

    "<redacted>".to_string()
}
