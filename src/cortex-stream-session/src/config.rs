//! Session configuration loading.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use cortex_stream_protocol::PhaseId;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::phase::default_label;

/// Default minimum duration used as the throughput divisor.
pub const DEFAULT_THROUGHPUT_EPSILON_MS: u64 = 1;

/// Session configuration.
///
/// ```toml
/// throughput_epsilon_ms = 5
///
/// [phase_labels]
/// retrieving = "Searching the knowledge base"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Label overrides keyed by phase id, used when a phase starts without
    /// an explicit name.
    pub phase_labels: HashMap<String, String>,
    /// Lower bound on the duration `tokens_per_second` divides by.
    pub throughput_epsilon_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            phase_labels: HashMap::new(),
            throughput_epsilon_ms: DEFAULT_THROUGHPUT_EPSILON_MS,
        }
    }
}

impl SessionConfig {
    /// Parse from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), "Loaded session config");
        Ok(config)
    }

    /// Add a label override.
    pub fn with_phase_label(mut self, phase: impl Into<String>, label: impl Into<String>) -> Self {
        self.phase_labels.insert(phase.into(), label.into());
        self
    }

    /// Display label for a phase started without a name.
    pub fn phase_label(&self, phase: &PhaseId) -> String {
        self.phase_labels
            .get(phase.as_str())
            .cloned()
            .unwrap_or_else(|| default_label(phase))
    }

    /// Throughput divisor floor. Never zero.
    pub fn throughput_epsilon(&self) -> Duration {
        Duration::from_millis(self.throughput_epsilon_ms).max(Duration::from_nanos(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = SessionConfig::default();
        assert!(config.phase_labels.is_empty());
        assert_eq!(config.throughput_epsilon(), Duration::from_millis(1));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = SessionConfig::from_toml_str(
            r#"
            [phase_labels]
            retrieving = "Searching the knowledge base"
            "#,
        )
        .expect("parse");

        assert_eq!(config.throughput_epsilon_ms, DEFAULT_THROUGHPUT_EPSILON_MS);
        assert_eq!(
            config.phase_label(&PhaseId::from("retrieving")),
            "Searching the knowledge base"
        );
        assert_eq!(config.phase_label(&PhaseId::from("routing")), "Routing");
    }

    #[test]
    fn test_zero_epsilon_is_clamped() {
        let config = SessionConfig::from_toml_str("throughput_epsilon_ms = 0").expect("parse");
        assert!(config.throughput_epsilon() > Duration::ZERO);
    }

    #[test]
    fn test_invalid_toml_is_rejected() {
        let err = SessionConfig::from_toml_str("throughput_epsilon_ms = \"fast\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "throughput_epsilon_ms = 10").expect("write");

        let config = SessionConfig::load(file.path()).expect("load");
        assert_eq!(config.throughput_epsilon(), Duration::from_millis(10));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = SessionConfig::load(&dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
