//! Configuration for the decision pipeline

use serde::{Deserialize, Serialize};

/// How account limits are configured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitMode {
    /// One limit shared by all four payment methods
    Shared,
    /// Four independent per-method limits
    PerMethod,
}

/// Decision pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Risk threshold τ: the risk stage's verdict for a transaction is
    /// `total_score > τ`
    pub risk_threshold: f64,

    /// Whether account limits are shared or per-method
    pub limit_mode: LimitMode,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            risk_threshold: 1.0,
            limit_mode: LimitMode::PerMethod,
        }
    }
}

impl PipelineConfig {
    /// Load from a TOML file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: PipelineConfig = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("failed to parse config: {}", e)))?;
        Ok(config)
    }

    /// Load from environment variables, falling back to defaults
    pub fn from_env() -> crate::Result<Self> {
        let mut config = PipelineConfig::default();

        if let Ok(threshold) = std::env::var("ARBITER_RISK_THRESHOLD") {
            config.risk_threshold = threshold
                .parse()
                .map_err(|_| crate::Error::Config(format!("bad risk threshold: {}", threshold)))?;
        }

        if let Ok(mode) = std::env::var("ARBITER_LIMIT_MODE") {
            config.limit_mode = match mode.as_str() {
                "shared" => LimitMode::Shared,
                "per_method" => LimitMode::PerMethod,
                other => {
                    return Err(crate::Error::Config(format!("bad limit mode: {}", other)))
                }
            };
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.risk_threshold, 1.0);
        assert_eq!(config.limit_mode, LimitMode::PerMethod);
    }

    #[test]
    fn test_parse_toml() {
        let config: PipelineConfig = toml::from_str(
            r#"
            risk_threshold = 1.5
            limit_mode = "shared"
            "#,
        )
        .unwrap();

        assert_eq!(config.risk_threshold, 1.5);
        assert_eq!(config.limit_mode, LimitMode::Shared);
    }
}
