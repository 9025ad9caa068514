//! Hearth configuration
//!
//! Config is loaded with a two-layer resolution:
//! 1. An explicit `--config` path, else the override in the data dir
//!    (~/.local/share/hearth/config/hearth.toml)
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! Environment variables (`HEARTH_PRIVACY_PIN`, `HEARTH_AGENT_URL`) win over both.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::insights::{Filter, Period, SourceFilter, TimeRange, DEFAULT_DISPLAY_LIMIT};
use crate::privacy::PrivacyGate;

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/hearth.toml");

/// Environment variable overriding the privacy PIN
pub const PRIVACY_PIN_ENV: &str = "HEARTH_PRIVACY_PIN";
/// Environment variable overriding the categorization agent URL
pub const AGENT_URL_ENV: &str = "HEARTH_AGENT_URL";

#[derive(Debug, Clone)]
pub struct HearthConfig {
    /// Shared PIN that unlocks the privacy overlay
    pub privacy_pin: String,
    pub insights: InsightsConfig,
    pub agent: AgentConfig,
    /// File the config was read from (`None` = embedded defaults)
    pub source_path: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct InsightsConfig {
    pub default_range: TimeRange,
    pub drilldown_display_limit: usize,
    pub excluded_categories: Vec<String>,
    pub excluded_description_patterns: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Base URL of the categorization agent; `None` disables auto-categorization
    pub url: Option<String>,
    pub timeout: Duration,
}

impl Default for HearthConfig {
    fn default() -> Self {
        Self {
            privacy_pin: "0000".to_string(),
            insights: InsightsConfig {
                default_range: TimeRange::default(),
                drilldown_display_limit: DEFAULT_DISPLAY_LIMIT,
                excluded_categories: Vec::new(),
                excluded_description_patterns: Vec::new(),
            },
            agent: AgentConfig {
                url: None,
                timeout: Duration::from_secs(60),
            },
            source_path: None,
        }
    }
}

impl HearthConfig {
    /// Load config (override first, then default) and apply environment overrides
    pub fn load(override_path: Option<&Path>) -> Result<Self> {
        let path = match override_path {
            Some(path) => Some(path.to_path_buf()),
            None => default_config_path().filter(|p| p.exists()),
        };

        let mut config = match path {
            Some(path) if path.exists() => {
                let content = fs::read_to_string(&path).map_err(|e| {
                    Error::Config(format!("Failed to read {}: {}", path.display(), e))
                })?;
                let mut config = Self::parse(&content)?;
                config.source_path = Some(path);
                config
            }
            Some(path) => {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )))
            }
            None => Self::parse(DEFAULT_CONFIG)?,
        };

        config.apply_env(|key| std::env::var(key).ok());
        debug!(source = ?config.source_path, "Configuration loaded");
        Ok(config)
    }

    /// Parse config from TOML content, filling unspecified keys with defaults
    pub fn parse(content: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

        let mut config = Self::default();

        if let Some(privacy) = raw.privacy {
            if let Some(pin) = privacy.pin {
                config.privacy_pin = pin;
            }
        }

        if let Some(insights) = raw.insights {
            if let Some(range) = insights.default_range {
                config.insights.default_range = range
                    .parse()
                    .map_err(|e: String| Error::Config(format!("insights.default_range: {}", e)))?;
            }
            if let Some(limit) = insights.drilldown_display_limit {
                config.insights.drilldown_display_limit = limit;
            }
            if let Some(categories) = insights.excluded_categories {
                config.insights.excluded_categories = categories;
            }
            if let Some(patterns) = insights.excluded_description_patterns {
                config.insights.excluded_description_patterns = patterns;
            }
        }

        if let Some(agent) = raw.agent {
            config.agent.url = agent.url.filter(|u| !u.trim().is_empty());
            if let Some(timeout) = agent.timeout_secs {
                config.agent.timeout = Duration::from_secs(timeout);
            }
        }

        // Surface bad patterns at load time rather than on the first insights request
        Filter::new().with_exclusions(
            &config.insights.excluded_categories,
            &config.insights.excluded_description_patterns,
        )?;

        Ok(config)
    }

    fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(pin) = lookup(PRIVACY_PIN_ENV).filter(|p| !p.is_empty()) {
            self.privacy_pin = pin;
        }
        if let Some(url) = lookup(AGENT_URL_ENV).filter(|u| !u.is_empty()) {
            self.agent.url = Some(url);
        }
    }

    /// A fresh, locked privacy gate keyed by the configured PIN
    pub fn privacy_gate(&self) -> PrivacyGate {
        PrivacyGate::new(self.privacy_pin.clone())
    }

    /// Build an insight filter carrying the configured transfer/payment exclusions
    ///
    /// `range` falls back to `insights.default_range` when `None`.
    pub fn insight_filter(
        &self,
        range: Option<TimeRange>,
        month: Option<u32>,
        year: Option<i32>,
        source: SourceFilter,
        category: Option<&str>,
    ) -> Result<Filter> {
        let period = Period::resolve(
            month,
            year,
            range.unwrap_or(self.insights.default_range),
        )?;
        Filter::new()
            .period(period)
            .source(source)
            .category(category)
            .with_exclusions(
                &self.insights.excluded_categories,
                &self.insights.excluded_description_patterns,
            )
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("hearth").join("config").join("hearth.toml"))
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    privacy: Option<RawPrivacy>,
    insights: Option<RawInsights>,
    agent: Option<RawAgent>,
}

#[derive(Debug, Deserialize)]
struct RawPrivacy {
    pin: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawInsights {
    default_range: Option<String>,
    drilldown_display_limit: Option<usize>,
    excluded_categories: Option<Vec<String>>,
    excluded_description_patterns: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct RawAgent {
    url: Option<String>,
    timeout_secs: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_default_config() {
        let config = HearthConfig::parse(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.privacy_pin, "0000");
        assert_eq!(config.insights.default_range, TimeRange::TrailingDays(365));
        assert_eq!(config.insights.drilldown_display_limit, 50);
        assert!(config
            .insights
            .excluded_categories
            .contains(&"Transfer".to_string()));
        assert!(!config.insights.excluded_description_patterns.is_empty());
        assert!(config.agent.url.is_none());
        assert_eq!(config.agent.timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = HearthConfig::parse("[privacy]\npin = \"4321\"\n").unwrap();
        assert_eq!(config.privacy_pin, "4321");
        assert_eq!(config.insights.drilldown_display_limit, 50);
        assert!(config.insights.excluded_categories.is_empty());
    }

    #[test]
    fn test_invalid_range_rejected() {
        let err = HearthConfig::parse("[insights]\ndefault_range = \"fortnight\"\n");
        assert!(matches!(err, Err(Error::Config(_))));
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let result =
            HearthConfig::parse("[insights]\nexcluded_description_patterns = [\"(oops\"]\n");
        assert!(matches!(result, Err(Error::Regex(_))));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = HearthConfig::default();
        config.apply_env(|key| match key {
            PRIVACY_PIN_ENV => Some("2468".to_string()),
            AGENT_URL_ENV => Some("http://agent.local:8600".to_string()),
            _ => None,
        });
        assert_eq!(config.privacy_pin, "2468");
        assert_eq!(config.agent.url.as_deref(), Some("http://agent.local:8600"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[agent]\nurl = \"http://localhost:9999\"\ntimeout_secs = 5").unwrap();

        let config = HearthConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.source_path.as_deref(), Some(file.path()));
        assert_eq!(config.agent.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_load_missing_file_errors() {
        let result = HearthConfig::load(Some(Path::new("/nonexistent/hearth.toml")));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_insight_filter_uses_default_range_and_exclusions() {
        let config = HearthConfig::parse(DEFAULT_CONFIG).unwrap();
        let filter = config
            .insight_filter(None, None, None, SourceFilter::All, Some("All"))
            .unwrap();
        assert_eq!(filter.period, Period::Range(TimeRange::TrailingDays(365)));
        assert!(filter.category.is_none());
        assert_eq!(filter.excluded_categories.len(), 4);

        assert!(config
            .insight_filter(None, Some(2), None, SourceFilter::All, None)
            .is_err());
    }

    #[test]
    fn test_privacy_gate_starts_locked() {
        let config = HearthConfig::default();
        let mut gate = config.privacy_gate();
        assert!(!gate.is_unlocked());
        gate.unlock("0000").unwrap();
    }
}
