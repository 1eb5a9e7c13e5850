use bytesize::ByteSize;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::content_safety::{AnalysisResult, RiskLevel};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadReceipt {
    pub id: String,
    pub filename: String,
    pub stored_path: String,
    pub size: u64,
    pub sha256: String,
    pub risk_score: f64,
    pub warnings: Vec<String>,
    pub accepted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadRejection {
    NoFileSelected,
    FileTypeNotAllowed,
    FilenameTooLong,
    InvalidFilename,
    FileTooLarge { max_bytes: u64 },
    EmptyFile,
    /// Content failed the safety assessment; carries its warnings.
    Rejected { details: Vec<String> },
    Storage(String),
}

impl UploadRejection {
    pub fn details(&self) -> &[String] {
        match self {
            UploadRejection::Rejected { details } => details,
            _ => &[],
        }
    }
}

fn human_limit(bytes: u64) -> String {
    const MIB: u64 = 1024 * 1024;
    if bytes >= MIB && bytes % MIB == 0 {
        format!("{}MB", bytes / MIB)
    } else {
        ByteSize(bytes).to_string()
    }
}

impl fmt::Display for UploadRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadRejection::NoFileSelected => write!(f, "No file selected"),
            UploadRejection::FileTypeNotAllowed => write!(f, "File type not allowed"),
            UploadRejection::FilenameTooLong => write!(f, "Filename too long"),
            UploadRejection::InvalidFilename => write!(f, "Invalid filename"),
            UploadRejection::FileTooLarge { max_bytes } => {
                write!(f, "File too large (max {})", human_limit(*max_bytes))
            }
            UploadRejection::EmptyFile => write!(f, "Empty file"),
            UploadRejection::Rejected { .. } => {
                write!(f, "File rejected due to security concerns")
            }
            UploadRejection::Storage(err) => write!(f, "Could not store file: {}", err),
        }
    }
}

impl std::error::Error for UploadRejection {}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub path: String,
    pub size: u64,
    pub result: Option<AnalysisResult>,
    pub error: Option<String>,
}

impl AuditEntry {
    pub fn level(&self) -> Option<RiskLevel> {
        self.result.as_ref().map(AnalysisResult::level)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditReport {
    pub scanned: usize,
    pub flagged: usize,
    pub needs_review: usize,
    pub failed: usize,
    pub entries: Vec<AuditEntry>,
}

impl AuditReport {
    pub fn flagged_paths(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|entry| entry.level() == Some(RiskLevel::Risky))
            .map(|entry| entry.path.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_limit_message_matches_service_wording() {
        let rejection = UploadRejection::FileTooLarge {
            max_bytes: 10 * 1024 * 1024,
        };
        assert_eq!(rejection.to_string(), "File too large (max 10MB)");
    }

    #[test]
    fn only_content_rejections_carry_details() {
        let rejected = UploadRejection::Rejected {
            details: vec!["High toxicity/threat level detected".into()],
        };
        assert_eq!(rejected.details().len(), 1);
        assert!(UploadRejection::EmptyFile.details().is_empty());
    }
}
