use config::{Config, Environment};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use crate::stream::FramingMode;
use crate::transport::http::{HttpTransportConfig, DEFAULT_TIMEOUT_MS};

pub const ENV_PREFIX: &str = "FLOWCALL";
pub const RUN_PROCEDURE: &str = "runWorkflow";
pub const STREAM_PROCEDURE: &str = "streamWorkflow";

const REQUIRED_KEYS: &[&str] = &["endpoint.host"];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {env_var}")]
    MissingEnvVar { env_var: String },

    #[error("Configuration error: {0}")]
    Other(#[from] config::ConfigError),
}

/// Environment variable that sets a dotted settings key, e.g. `endpoint.host`
pub fn to_env_var(field: &str) -> String {
    format!(
        "{}_{}",
        ENV_PREFIX,
        field.to_uppercase().replace('.', "__")
    )
}

#[derive(Debug, Clone, Deserialize)]
pub struct EndpointSettings {
    pub host: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl EndpointSettings {
    pub fn transport_config(&self) -> HttpTransportConfig {
        HttpTransportConfig {
            host: self.host.clone(),
            api_key: self.api_key.clone(),
            timeout: Duration::from_millis(self.timeout_ms),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowSettings {
    #[serde(default = "default_run_procedure")]
    pub run_procedure: String,
    #[serde(default = "default_stream_procedure")]
    pub stream_procedure: String,
    #[serde(default)]
    pub framing: FramingMode,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            run_procedure: default_run_procedure(),
            stream_procedure: default_stream_procedure(),
            framing: FramingMode::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub endpoint: EndpointSettings,
    #[serde(default)]
    pub workflow: WorkflowSettings,
}

impl Settings {
    /// Load settings from `FLOWCALL_*` environment variables
    pub fn new() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .set_default("endpoint.timeout_ms", default_timeout_ms())?
            .set_default("workflow.run_procedure", default_run_procedure())?
            .set_default("workflow.stream_procedure", default_stream_procedure())?
            .set_default("workflow.framing", "buffered")?
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        // checked by full key so a missing value names its variable
        for key in REQUIRED_KEYS {
            config.get_string(key).map_err(map_missing_field)?;
        }

        match config.try_deserialize::<Self>() {
            Ok(settings) => Ok(settings),
            Err(err) => {
                tracing::debug!("Configuration error: {:?}", &err);
                Err(map_missing_field(err))
            }
        }
    }
}

fn map_missing_field(err: config::ConfigError) -> ConfigError {
    let message = err.to_string();
    if message.starts_with("missing field") {
        let field = message
            .trim_start_matches("missing field `")
            .split('`')
            .next()
            .unwrap_or_default();
        return ConfigError::MissingEnvVar {
            env_var: to_env_var(field),
        };
    }
    if let config::ConfigError::NotFound(field) = &err {
        return ConfigError::MissingEnvVar {
            env_var: to_env_var(field),
        };
    }
    ConfigError::Other(err)
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

fn default_run_procedure() -> String {
    RUN_PROCEDURE.to_string()
}

fn default_stream_procedure() -> String {
    STREAM_PROCEDURE.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    fn clean_env() {
        for (key, _) in env::vars() {
            if key.starts_with("FLOWCALL_") {
                env::remove_var(&key);
            }
        }
    }

    #[test]
    fn test_to_env_var() {
        assert_eq!(to_env_var("endpoint.host"), "FLOWCALL_ENDPOINT__HOST");
        assert_eq!(to_env_var("endpoint"), "FLOWCALL_ENDPOINT");
    }

    #[test]
    #[serial]
    fn test_default_settings() {
        clean_env();
        env::set_var("FLOWCALL_ENDPOINT__HOST", "https://functions.example.com");

        let settings = Settings::new().unwrap();
        assert_eq!(settings.endpoint.host, "https://functions.example.com");
        assert_eq!(settings.endpoint.api_key, None);
        assert_eq!(settings.endpoint.timeout_ms, 300_000);
        assert_eq!(settings.workflow.run_procedure, "runWorkflow");
        assert_eq!(settings.workflow.stream_procedure, "streamWorkflow");
        assert_eq!(settings.workflow.framing, FramingMode::Buffered);

        let transport = settings.endpoint.transport_config();
        assert_eq!(transport.timeout, Duration::from_secs(300));

        clean_env();
    }

    #[test]
    #[serial]
    fn test_environment_override() {
        clean_env();
        env::set_var("FLOWCALL_ENDPOINT__HOST", "http://localhost:5001/demo/us-central1");
        env::set_var("FLOWCALL_ENDPOINT__API_KEY", "secret");
        env::set_var("FLOWCALL_ENDPOINT__TIMEOUT_MS", "1500");
        env::set_var("FLOWCALL_WORKFLOW__STREAM_PROCEDURE", "streamWorkflowV2");
        env::set_var("FLOWCALL_WORKFLOW__FRAMING", "chunk_aligned");

        let settings = Settings::new().unwrap();
        assert_eq!(settings.endpoint.api_key.as_deref(), Some("secret"));
        assert_eq!(settings.endpoint.timeout_ms, 1500);
        assert_eq!(settings.workflow.run_procedure, "runWorkflow");
        assert_eq!(settings.workflow.stream_procedure, "streamWorkflowV2");
        assert_eq!(settings.workflow.framing, FramingMode::ChunkAligned);

        clean_env();
    }

    #[test]
    #[serial]
    fn test_missing_host_names_env_var() {
        clean_env();
        env::set_var("FLOWCALL_ENDPOINT__API_KEY", "secret");

        match Settings::new() {
            Err(ConfigError::MissingEnvVar { env_var }) => {
                assert_eq!(env_var, "FLOWCALL_ENDPOINT__HOST")
            }
            other => panic!("Expected MissingEnvVar, got {:?}", other),
        }

        clean_env();
    }
}
