use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_NLU_BASE_URL: &str = "https://ai.twin24.ai/api/v1";
pub const DEFAULT_AGENT_ID: &str = "398a5424-faf5-4aeb-b50d-51835c037970";
pub const DEFAULT_TIMEZONE: &str = "UTC";
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.5;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub nlu: NluConfig,
    pub agent: AgentConfig,
    pub dialog: DialogConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct NluConfig {
    pub base_url: String,
    pub token: SecretString,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct AgentConfig {
    pub id: String,
    pub timezone: String,
}

#[derive(Clone, Debug)]
pub struct DialogConfig {
    pub confidence_threshold: f64,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub nlu_base_url: Option<String>,
    pub nlu_token: Option<String>,
    pub agent_id: Option<String>,
    pub timezone: Option<String>,
    pub confidence_threshold: Option<f64>,
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            nlu: NluConfig {
                base_url: DEFAULT_NLU_BASE_URL.to_string(),
                token: String::new().into(),
                timeout_secs: 30,
            },
            agent: AgentConfig {
                id: DEFAULT_AGENT_ID.to_string(),
                timezone: DEFAULT_TIMEZONE.to_string(),
            },
            dialog: DialogConfig { confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD },
            logging: LoggingConfig { level: "warn".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("twinbot.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(nlu) = patch.nlu {
            if let Some(base_url) = nlu.base_url {
                self.nlu.base_url = base_url;
            }
            if let Some(token) = nlu.token {
                self.nlu.token = secret_value(token);
            }
            if let Some(timeout_secs) = nlu.timeout_secs {
                self.nlu.timeout_secs = timeout_secs;
            }
        }

        if let Some(agent) = patch.agent {
            if let Some(id) = agent.id {
                self.agent.id = id;
            }
            if let Some(timezone) = agent.timezone {
                self.agent.timezone = timezone;
            }
        }

        if let Some(dialog) = patch.dialog {
            if let Some(threshold) = dialog.confidence_threshold {
                self.dialog.confidence_threshold = threshold;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("TWINBOT_NLU_BASE_URL") {
            self.nlu.base_url = value;
        }
        if let Some(value) = read_env("TWINBOT_NLU_TOKEN") {
            self.nlu.token = secret_value(value);
        }
        if let Some(value) = read_env("TWINBOT_NLU_TIMEOUT_SECS") {
            self.nlu.timeout_secs = parse_u64("TWINBOT_NLU_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("TWINBOT_AGENT_ID") {
            self.agent.id = value;
        }
        if let Some(value) = read_env("TWINBOT_AGENT_TIMEZONE") {
            self.agent.timezone = value;
        }

        if let Some(value) = read_env("TWINBOT_DIALOG_CONFIDENCE_THRESHOLD") {
            self.dialog.confidence_threshold =
                parse_f64("TWINBOT_DIALOG_CONFIDENCE_THRESHOLD", &value)?;
        }

        let log_level =
            read_env("TWINBOT_LOGGING_LEVEL").or_else(|| read_env("TWINBOT_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("TWINBOT_LOGGING_FORMAT").or_else(|| read_env("TWINBOT_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(base_url) = overrides.nlu_base_url {
            self.nlu.base_url = base_url;
        }
        if let Some(token) = overrides.nlu_token {
            self.nlu.token = secret_value(token);
        }
        if let Some(agent_id) = overrides.agent_id {
            self.agent.id = agent_id;
        }
        if let Some(timezone) = overrides.timezone {
            self.agent.timezone = timezone;
        }
        if let Some(threshold) = overrides.confidence_threshold {
            self.dialog.confidence_threshold = threshold;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_nlu(&self.nlu)?;
        validate_agent(&self.agent)?;
        validate_dialog(&self.dialog)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

pub fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("twinbot.toml"), PathBuf::from("config/twinbot.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_nlu(nlu: &NluConfig) -> Result<(), ConfigError> {
    let base_url = nlu.base_url.trim();
    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err(ConfigError::Validation(
            "nlu.base_url must start with http:// or https://".to_string(),
        ));
    }

    if nlu.token.expose_secret().trim().is_empty() {
        return Err(ConfigError::Validation(
            "nlu.token is required. Set TWINBOT_NLU_TOKEN or `token` under [nlu] in twinbot.toml"
                .to_string(),
        ));
    }

    if nlu.timeout_secs == 0 || nlu.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "nlu.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_agent(agent: &AgentConfig) -> Result<(), ConfigError> {
    if agent.id.trim().is_empty() {
        return Err(ConfigError::Validation("agent.id must not be empty".to_string()));
    }

    if agent.timezone.trim().is_empty() {
        return Err(ConfigError::Validation("agent.timezone must not be empty".to_string()));
    }

    Ok(())
}

fn validate_dialog(dialog: &DialogConfig) -> Result<(), ConfigError> {
    let threshold = dialog.confidence_threshold;
    if !(0.0..=1.0).contains(&threshold) {
        return Err(ConfigError::Validation(format!(
            "dialog.confidence_threshold must be in range 0.0..=1.0 (got {threshold})"
        )));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_f64(key: &str, value: &str) -> Result<f64, ConfigError> {
    value.trim().parse::<f64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    nlu: Option<NluPatch>,
    agent: Option<AgentPatch>,
    dialog: Option<DialogPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct NluPatch {
    base_url: Option<String>,
    token: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct AgentPatch {
    id: Option<String>,
    timezone: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct DialogPatch {
    confidence_threshold: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
