//! Configuration types.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Default persistence key of the "tour completed" flag.
pub const DEFAULT_TOUR_FLAG_KEY: &str = "tour_completed";

/// Log filter used when `RUST_LOG` is unset. Telemetry events log at `info`.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// What happens to an active tour when the questionnaire completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompletionPolicy {
    /// Jump to the first result beat (deactivate if the tour has none).
    #[default]
    AdvanceToResultBeat,
    /// Switch the tour off without marking it completed.
    Deactivate,
}

impl FromStr for CompletionPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "advance" => Ok(Self::AdvanceToResultBeat),
            "deactivate" => Ok(Self::Deactivate),
            other => Err(ConfigError::InvalidValue {
                key: "BLUEPRINT_TOUR_ON_COMPLETE".to_string(),
                message: format!("expected 'advance' or 'deactivate', got '{other}'"),
            }),
        }
    }
}

/// HTTP render endpoint settings.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub url: String,
    pub api_key: Option<SecretString>,
    pub timeout: Duration,
}

/// Flow configuration.
#[derive(Debug, Clone)]
pub struct FlowConfig {
    /// Delay before the first-run tour activates itself.
    pub tour_delay: Duration,
    pub completion_policy: CompletionPolicy,
    pub tour_flag_key: String,
    /// libSQL database holding the tour flag.
    pub db_path: PathBuf,
    /// Optional JSON catalog overriding the built-in questions and tour.
    pub catalog_path: Option<PathBuf>,
    /// Render endpoint; `None` means every render is unavailable.
    pub render: Option<RenderConfig>,
    /// Directory for rolling log files, in addition to stderr.
    pub log_dir: Option<PathBuf>,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            tour_delay: Duration::from_millis(1000),
            completion_policy: CompletionPolicy::default(),
            tour_flag_key: DEFAULT_TOUR_FLAG_KEY.to_string(),
            db_path: PathBuf::from("./data/blueprint-guide.db"),
            catalog_path: None,
            render: None,
            log_dir: None,
        }
    }
}

impl FlowConfig {
    /// Build from `BLUEPRINT_*` environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let tour_delay = var("BLUEPRINT_TOUR_DELAY_MS")
            .and_then(|s| s.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.tour_delay);

        let completion_policy = match var("BLUEPRINT_TOUR_ON_COMPLETE") {
            Some(value) => value.parse()?,
            None => defaults.completion_policy,
        };

        let tour_flag_key = var("BLUEPRINT_TOUR_FLAG_KEY")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(defaults.tour_flag_key);

        let db_path = var("BLUEPRINT_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.db_path);

        let render = var("BLUEPRINT_RENDER_URL")
            .filter(|s| !s.trim().is_empty())
            .map(|url| RenderConfig {
                url,
                api_key: var("BLUEPRINT_RENDER_API_KEY").map(SecretString::from),
                timeout: var("BLUEPRINT_RENDER_TIMEOUT_SECS")
                    .and_then(|s| s.parse().ok())
                    .map(Duration::from_secs)
                    .unwrap_or(Duration::from_secs(60)),
            });

        Ok(Self {
            tour_delay,
            completion_policy,
            tour_flag_key,
            db_path,
            catalog_path: var("BLUEPRINT_CATALOG_PATH").map(PathBuf::from),
            render,
            log_dir: var("BLUEPRINT_LOG_DIR").map(PathBuf::from),
        })
    }
}
