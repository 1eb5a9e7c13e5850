mod context;
mod policy;
mod risk;

pub(crate) use context::TextContext;
pub(crate) use policy::{SafetyPolicy, DECODE_FAILURE_WARNING};
pub use policy::RiskLevel;
pub(crate) use risk::{assess_image_risk, keyword_score};
