//! Configuration file loader for pacu-console
//!
//! Priority (high to low):
//! 1. CLI overrides
//! 2. Environment variables (`PACU_CONSOLE_*`)
//! 3. Explicit config file (`--config`)
//! 4. Project config (`./.pacu-console.yaml`)
//! 5. Default values

use super::config::{ConsoleConfig, SessionFailurePolicy, Settings};
use crate::core::error::ConsoleError;
use regex::Regex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Configuration file name
const CONFIG_FILENAME: &str = ".pacu-console.yaml";

/// Environment variable pattern (${VAR_NAME})
const ENV_VAR_PATTERN: &str = r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}";

/// Configuration load options
#[derive(Debug, Clone, Default)]
pub struct ConfigLoadOptions {
    /// Directory searched for `.pacu-console.yaml`
    pub project_path: PathBuf,

    /// Config file given on the command line
    pub config_file: Option<PathBuf>,

    /// CLI arguments (highest priority)
    pub cli_args: Option<ConsoleConfig>,

    /// Environment variables
    pub env: HashMap<String, String>,
}

/// Configuration file loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load, merge, expand and validate configuration
    pub async fn load(options: ConfigLoadOptions) -> Result<Settings, ConsoleError> {
        let mut config = ConsoleConfig::default();

        if let Some(project_config) =
            Self::load_config_file(&options.project_path.join(CONFIG_FILENAME)).await?
        {
            config.merge(project_config);
        }

        if let Some(path) = &options.config_file {
            let explicit = Self::load_config_file(path).await?.ok_or_else(|| {
                ConsoleError::Config(format!("Config file not found: {}", path.display()))
            })?;
            config.merge(explicit);
        }

        config.merge(Self::load_env_config(&options.env)?);

        if let Some(cli_config) = options.cli_args {
            config.merge(cli_config);
        }

        let config = Self::expand_env_vars(config, &options.env);
        Self::validate(&config)?;

        Ok(config.resolve())
    }

    /// UTF-8 view of the process environment.
    ///
    /// Variables whose name or value is not valid UTF-8 are skipped; none of
    /// them can be a `PACU_CONSOLE_*` setting.
    pub fn process_env() -> HashMap<String, String> {
        std::env::vars_os()
            .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
            .collect()
    }

    /// Load configuration from a YAML file; `None` when the file is absent
    async fn load_config_file(file_path: &Path) -> Result<Option<ConsoleConfig>, ConsoleError> {
        if !file_path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(file_path).await.map_err(|e| {
            ConsoleError::Config(format!(
                "Failed to read config file {}: {}",
                file_path.display(),
                e
            ))
        })?;

        let config: ConsoleConfig = serde_yaml::from_str(&content).map_err(|e| {
            ConsoleError::Config(format!(
                "Failed to parse YAML config {}: {}",
                file_path.display(),
                e
            ))
        })?;

        tracing::debug!(path = %file_path.display(), "loaded config file");
        Ok(Some(config))
    }

    /// Load configuration from environment variables
    fn load_env_config(env: &HashMap<String, String>) -> Result<ConsoleConfig, ConsoleError> {
        let parse_secs = |key: &str| -> Result<Option<u64>, ConsoleError> {
            env.get(key)
                .map(|value| {
                    value.trim().parse::<u64>().map_err(|_| {
                        ConsoleError::Config(format!("{} must be a number of seconds", key))
                    })
                })
                .transpose()
        };

        let session_failure_policy = match env
            .get("PACU_CONSOLE_SESSION_FAILURE_POLICY")
            .map(|s| s.as_str())
        {
            Some("continue") => Some(SessionFailurePolicy::Continue),
            Some("abort") => Some(SessionFailurePolicy::Abort),
            Some(other) => {
                return Err(ConsoleError::Config(format!(
                    "PACU_CONSOLE_SESSION_FAILURE_POLICY must be continue or abort, got {}",
                    other
                )));
            }
            None => None,
        };

        Ok(ConsoleConfig {
            pacu_binary: env.get("PACU_CONSOLE_PACU_BINARY").cloned(),
            reports_dir: env.get("PACU_CONSOLE_REPORTS_DIR").map(PathBuf::from),
            module_timeout_secs: parse_secs("PACU_CONSOLE_MODULE_TIMEOUT")?,
            ollama_url: env.get("PACU_CONSOLE_OLLAMA_URL").cloned(),
            default_model: env.get("PACU_CONSOLE_MODEL").cloned(),
            request_timeout_secs: parse_secs("PACU_CONSOLE_REQUEST_TIMEOUT")?,
            session_name_prefix: env.get("PACU_CONSOLE_SESSION_PREFIX").cloned(),
            session_failure_policy,
        })
    }

    /// Expand `${VAR}` references in string settings
    fn expand_env_vars(mut config: ConsoleConfig, env: &HashMap<String, String>) -> ConsoleConfig {
        let regex = match Regex::new(ENV_VAR_PATTERN) {
            Ok(regex) => regex,
            Err(_) => return config,
        };

        let expand = |value: String| -> String {
            regex
                .replace_all(&value, |caps: &regex::Captures| match env.get(&caps[1]) {
                    Some(found) => found.clone(),
                    None => {
                        tracing::warn!(variable = &caps[1], "environment variable not found");
                        caps[0].to_string()
                    }
                })
                .into_owned()
        };

        config.pacu_binary = config.pacu_binary.map(&expand);
        config.ollama_url = config.ollama_url.map(&expand);
        config.default_model = config.default_model.map(&expand);
        config.reports_dir = config
            .reports_dir
            .map(|dir| PathBuf::from(expand(dir.to_string_lossy().into_owned())));

        config
    }

    /// Reject values that can never work
    pub fn validate(config: &ConsoleConfig) -> Result<(), ConsoleError> {
        if let Some(binary) = &config.pacu_binary
            && binary.trim().is_empty()
        {
            return Err(ConsoleError::Config("pacuBinary must not be empty".to_string()));
        }

        if config.module_timeout_secs == Some(0) {
            return Err(ConsoleError::Config(
                "moduleTimeoutSecs must be greater than zero".to_string(),
            ));
        }

        if config.request_timeout_secs == Some(0) {
            return Err(ConsoleError::Config(
                "requestTimeoutSecs must be greater than zero".to_string(),
            ));
        }

        if let Some(url) = &config.ollama_url
            && !(url.starts_with("http://") || url.starts_with("https://"))
        {
            return Err(ConsoleError::Config(format!(
                "ollamaUrl must be an http(s) URL, got {}",
                url
            )));
        }

        Ok(())
    }
}
