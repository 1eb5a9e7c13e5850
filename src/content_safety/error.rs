use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssessmentError {
    InvalidImage(String),
}

impl fmt::Display for AssessmentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssessmentError::InvalidImage(detail) => write!(f, "invalid image: {}", detail),
        }
    }
}

impl std::error::Error for AssessmentError {}

/// A toxicity scorer could not produce a score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreUnavailable(pub String);

impl ScoreUnavailable {
    pub fn new(reason: impl Into<String>) -> Self {
        ScoreUnavailable(reason.into())
    }
}

impl fmt::Display for ScoreUnavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "toxicity score unavailable: {}", self.0)
    }
}

impl std::error::Error for ScoreUnavailable {}
