//! Engine tuning constants, deserializable from TOML.
//!
//! All knobs that shape the cost model or bound work live here so that a
//! host can override them without recompiling. The config is plain data
//! passed to the converter constructor; there is no global instance.

use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("TOML parse error: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub cost: CostConfig,
    pub limits: LimitConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CostConfig {
    /// Word cost assigned to synthesized unknown-word nodes.
    pub unknown_word_cost: i16,
    /// Penalty added to an edge that opens a new phrase (bunsetsu).
    /// Discourages paths made of many short segments over paths with
    /// fewer, longer segments.
    pub segment_boundary_penalty: i32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LimitConfig {
    /// History segments are dropped wholesale when their concatenated
    /// reading exceeds this many bytes.
    pub max_history_key_bytes: usize,
    /// N-best queue expansion budget, as a multiple of the requested N.
    pub nbest_expansion_factor: usize,
    /// Candidate pool size generated for CONVERSION requests.
    pub default_conversion_candidates: usize,
    /// Upper bound on tokens accepted from a single dictionary lookup.
    pub max_nodes_per_lookup: usize,
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            unknown_word_cost: 10000,
            segment_boundary_penalty: 5000,
        }
    }
}

impl Default for LimitConfig {
    fn default() -> Self {
        Self {
            max_history_key_bytes: 500,
            nbest_expansion_factor: 10,
            default_conversion_candidates: 20,
            max_nodes_per_lookup: 128,
        }
    }
}

impl EngineConfig {
    /// Parse a config from TOML text. Missing sections and keys fall back
    /// to their defaults.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.cost.unknown_word_cost, 10000);
        assert_eq!(cfg.limits.max_history_key_bytes, 500);
    }

    #[test]
    fn test_from_toml_partial_override() {
        let cfg = EngineConfig::from_toml(
            r#"
            [limits]
            max_history_key_bytes = 256
            "#,
        )
        .unwrap();
        assert_eq!(cfg.limits.max_history_key_bytes, 256);
        // Untouched sections keep their defaults
        assert_eq!(cfg.cost.segment_boundary_penalty, 5000);
    }

    #[test]
    fn test_from_toml_invalid() {
        assert!(EngineConfig::from_toml("limits = 3").is_err());
    }
}
