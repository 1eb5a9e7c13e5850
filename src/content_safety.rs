mod assessor;
mod error;
mod safety;
pub mod scorer;
pub mod telemetry;
pub mod types;


pub use assessor::RiskAssessor;
pub use error::{AssessmentError, ScoreUnavailable};
pub use safety::RiskLevel;
pub use scorer::{KeywordScorer, ToxicityScorer};
#[cfg(feature = "perspective")]
pub use scorer::PerspectiveScorer;
pub use telemetry::{AssessmentTelemetry, TelemetrySnapshot};
pub use types::{AnalysisInput, AnalysisResult, InputKind};
