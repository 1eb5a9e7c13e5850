use serde::{Deserialize, Serialize};

use super::safety::RiskLevel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    Text,
    Image,
    /// Allowed binary formats that are passed through uninspected.
    Document,
}

impl InputKind {
    pub fn from_extension(extension: &str) -> Self {
        match normalize_extension(extension).as_str() {
            "txt" | "md" => InputKind::Text,
            "png" | "jpg" | "jpeg" | "gif" => InputKind::Image,
            _ => InputKind::Document,
        }
    }
}

pub(crate) fn normalize_extension(extension: &str) -> String {
    extension.trim().trim_start_matches('.').to_ascii_lowercase()
}

#[derive(Debug, Clone)]
pub struct AnalysisInput {
    kind: InputKind,
    payload: Vec<u8>,
    declared_extension: String,
}

impl AnalysisInput {
    pub fn from_extension(extension: &str, payload: impl Into<Vec<u8>>) -> Self {
        let declared_extension = normalize_extension(extension);
        AnalysisInput {
            kind: InputKind::from_extension(&declared_extension),
            payload: payload.into(),
            declared_extension,
        }
    }

    pub fn kind(&self) -> InputKind {
        self.kind
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn declared_extension(&self) -> &str {
        &self.declared_extension
    }

    /// Payload decoded as UTF-8 with invalid sequences dropped, so a stray
    /// byte cannot split a word.
    pub fn text(&self) -> String {
        self.payload.utf8_chunks().map(|chunk| chunk.valid()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub risk_score: f64, // 0.0-1.0, higher is worse
    pub safe: bool,
    pub warnings: Vec<String>,
}

impl AnalysisResult {
    pub fn pass_through() -> Self {
        AnalysisResult {
            risk_score: 0.0,
            safe: true,
            warnings: Vec::new(),
        }
    }

    pub fn needs_review(&self) -> bool {
        self.safe && !self.warnings.is_empty()
    }

    pub fn level(&self) -> RiskLevel {
        if !self.safe {
            RiskLevel::Risky
        } else if self.warnings.is_empty() {
            RiskLevel::Safe
        } else {
            RiskLevel::Review
        }
    }
}
