// src/config.rs

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;

pub const RULES_OVERRIDE_ENV: &str = "UPLOAD_GUARD_RULES_OVERRIDE";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdPair {
    pub warn: f64,   // above this: warning only
    pub reject: f64, // above this: unsafe
}

impl ThresholdPair {
    pub const fn new(warn: f64, reject: f64) -> Self {
        ThresholdPair { warn, reject }
    }

    fn validate(&self, label: &str) -> Result<(), String> {
        let in_range = |v: f64| v.is_finite() && (0.0..=1.0).contains(&v);
        if !in_range(self.warn) || !in_range(self.reject) {
            return Err(format!("{} thresholds must lie within [0, 1]", label));
        }
        if self.warn > self.reject {
            return Err(format!(
                "{} warn threshold {} exceeds reject threshold {}",
                label, self.warn, self.reject
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageRules {
    pub thresholds: ThresholdPair,
    pub max_dimension: u32,      // Default: 5000 px per side
    pub oversize_penalty: f64,   // Default: 0.3
    pub bytes_per_pixel: u64,    // Default: 3 (uncompressed RGB)
    pub byte_ratio_limit: u64,   // Default: 2x the uncompressed estimate
    pub byte_ratio_penalty: f64, // Default: 0.2
}

/// What an image that cannot be decoded turns into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodeFailurePolicy {
    /// Moderate risk, still accepted, with a warning.
    FlagForReview,
    /// Maximum risk, rejected.
    Reject,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadLimits {
    pub max_file_size: u64,
    pub max_filename_len: usize,
    pub allowed_extensions: BTreeSet<String>,
}

impl UploadLimits {
    pub fn allows_extension(&self, extension: &str) -> bool {
        self.allowed_extensions
            .contains(extension.to_ascii_lowercase().as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardConfig {
    pub suspicious_terms: Vec<String>,
    pub term_weight: f64,
    pub text: ThresholdPair,
    pub image: ImageRules,
    pub decode_failure: DecodeFailurePolicy,
    pub upload: UploadLimits,
}

impl GuardConfig {
    pub fn validate(&self) -> Result<(), String> {
        self.text.validate("text")?;
        self.image.thresholds.validate("image")?;
        if !self.term_weight.is_finite() || self.term_weight < 0.0 {
            return Err("term_weight must be a non-negative number".into());
        }
        if self
            .suspicious_terms
            .iter()
            .any(|term| term.trim().is_empty())
        {
            return Err("suspicious_terms must not contain empty entries".into());
        }
        if self.image.max_dimension == 0 {
            return Err("image.max_dimension must be positive".into());
        }
        if self.upload.allowed_extensions.is_empty() {
            return Err("upload.allowed_extensions must not be empty".into());
        }
        Ok(())
    }

    pub fn with_decode_failure(mut self, policy: DecodeFailurePolicy) -> Self {
        self.decode_failure = policy;
        self
    }
}

impl Default for GuardConfig {
    fn default() -> Self {
        GuardConfig {
            suspicious_terms: ["hack", "malware", "virus", "attack", "exploit"]
                .iter()
                .map(|term| term.to_string())
                .collect(),
            term_weight: 0.2,
            text: ThresholdPair::new(0.4, 0.7),
            image: ImageRules {
                thresholds: ThresholdPair::new(0.3, 0.6),
                max_dimension: 5000,
                oversize_penalty: 0.3,
                bytes_per_pixel: 3,
                byte_ratio_limit: 2,
                byte_ratio_penalty: 0.2,
            },
            decode_failure: DecodeFailurePolicy::FlagForReview,
            upload: UploadLimits {
                max_file_size: 10 * 1024 * 1024,
                max_filename_len: 255,
                allowed_extensions: ["txt", "pdf", "png", "jpg", "jpeg", "gif", "md", "doc", "docx"]
                    .iter()
                    .map(|ext| ext.to_string())
                    .collect(),
            },
        }
    }
}

pub fn parse_config(raw: &str) -> Result<GuardConfig, String> {
    let mut config: GuardConfig =
        serde_json::from_str(raw).map_err(|e| format!("Failed to parse guard rules: {}", e))?;
    config.upload.allowed_extensions = config
        .upload
        .allowed_extensions
        .iter()
        .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
        .collect();
    config.validate()?;
    Ok(config)
}

// Load rules with error propagation; honours the override path when set
pub fn load_config_result() -> Result<GuardConfig, String> {
    if let Ok(path) = std::env::var(RULES_OVERRIDE_ENV) {
        if !path.trim().is_empty() {
            let raw = fs::read_to_string(&path)
                .map_err(|e| format!("Failed to read guard rules at {}: {}", path, e))?;
            return parse_config(&raw);
        }
    }
    parse_config(include_str!("../rules/guard_rules.json"))
}

// Load rules with default fallback
pub fn load_config() -> GuardConfig {
    load_config_result().unwrap_or_else(|err| {
        log::warn!("{}; falling back to built-in guard rules", err);
        GuardConfig::default()
    })
}

// Global configuration
lazy_static! {
    pub static ref GUARD_CONFIG: GuardConfig = load_config();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_rules_match_defaults() {
        let parsed = parse_config(include_str!("../rules/guard_rules.json")).unwrap();
        let defaults = GuardConfig::default();
        assert_eq!(parsed.suspicious_terms, defaults.suspicious_terms);
        assert_eq!(parsed.text, defaults.text);
        assert_eq!(parsed.image.thresholds, defaults.image.thresholds);
        assert_eq!(parsed.decode_failure, DecodeFailurePolicy::FlagForReview);
        assert_eq!(parsed.upload.max_file_size, 10 * 1024 * 1024);
        assert_eq!(
            parsed.upload.allowed_extensions,
            defaults.upload.allowed_extensions
        );
    }

    #[test]
    fn inverted_thresholds_are_rejected() {
        let mut config = GuardConfig::default();
        config.text = ThresholdPair::new(0.8, 0.5);
        let err = config.validate().unwrap_err();
        assert!(err.contains("text"), "unexpected error: {}", err);
    }

    #[test]
    fn out_of_range_thresholds_are_rejected() {
        let mut config = GuardConfig::default();
        config.image.thresholds = ThresholdPair::new(0.3, 1.5);
        assert!(config.validate().is_err());
    }

    #[test]
    fn extensions_are_normalised_on_parse() {
        let mut value = serde_json::to_value(GuardConfig::default()).unwrap();
        value["upload"]["allowed_extensions"] = serde_json::json!([".TXT", "Png"]);
        let config = parse_config(&value.to_string()).unwrap();
        assert!(config.upload.allows_extension("txt"));
        assert!(config.upload.allows_extension("PNG"));
        assert!(!config.upload.allows_extension("pdf"));
    }

    #[test]
    fn malformed_rules_report_parse_error() {
        let err = parse_config("{ not json").unwrap_err();
        assert!(err.starts_with("Failed to parse guard rules"));
    }
}
