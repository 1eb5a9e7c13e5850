pub mod config;
mod content_safety;
mod upload;

pub use config::{
    load_config, load_config_result, DecodeFailurePolicy, GuardConfig, ImageRules, ThresholdPair,
    UploadLimits,
};
pub use content_safety::{
    AnalysisInput, AnalysisResult, AssessmentError, AssessmentTelemetry, InputKind, KeywordScorer,
    RiskAssessor, RiskLevel, ScoreUnavailable, TelemetrySnapshot, ToxicityScorer,
};
#[cfg(feature = "perspective")]
pub use content_safety::PerspectiveScorer;
pub use upload::{
    audit_directory, extension_of, is_allowed_mime, secure_filename, sniff_mime, AuditEntry,
    AuditReport, UploadGate, UploadReceipt, UploadRejection,
};
