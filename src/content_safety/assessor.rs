use image::ImageReader;
use std::io::Cursor;
use std::time::Instant;

use super::error::AssessmentError;
use super::safety::{assess_image_risk, SafetyPolicy, DECODE_FAILURE_WARNING};
use super::scorer::{KeywordScorer, ToxicityScorer};
use super::telemetry::{AssessmentTelemetry, TelemetrySnapshot};
use super::types::{AnalysisInput, AnalysisResult, InputKind};
use crate::config::{DecodeFailurePolicy, GuardConfig, GUARD_CONFIG};

const DECODE_FAILURE_SCORE: f64 = 0.5;

/// Maps one classified input to an accept/reject decision.
///
/// Every call is independent of every other; the only shared state is the
/// telemetry counters, which never influence a result. The scorer is chosen
/// by whoever builds the assessor, never inferred from configuration.
pub struct RiskAssessor {
    config: GuardConfig,
    text_policy: SafetyPolicy,
    image_policy: SafetyPolicy,
    scorer: Box<dyn ToxicityScorer>,
    telemetry: AssessmentTelemetry,
}

impl RiskAssessor {
    /// Assessor that scores text with the offline keyword heuristic.
    pub fn new(config: GuardConfig) -> Self {
        let fallback = KeywordScorer::from_config(&config);
        Self::with_scorer(config, fallback)
    }

    pub fn with_scorer(config: GuardConfig, scorer: impl ToxicityScorer + 'static) -> Self {
        Self::with_boxed_scorer(config, Box::new(scorer))
    }

    pub fn with_boxed_scorer(config: GuardConfig, scorer: Box<dyn ToxicityScorer>) -> Self {
        RiskAssessor {
            text_policy: SafetyPolicy::text(config.text),
            image_policy: SafetyPolicy::image(config.image.thresholds),
            config,
            scorer,
            telemetry: AssessmentTelemetry::new(),
        }
    }

    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    pub fn scorer_name(&self) -> &str {
        self.scorer.name()
    }

    pub fn telemetry(&self) -> &AssessmentTelemetry {
        &self.telemetry
    }

    pub fn telemetry_snapshot(&self) -> TelemetrySnapshot {
        self.telemetry.get_snapshot()
    }

    pub fn assess_text(&self, content: &str) -> AnalysisResult {
        let started = Instant::now();
        let result = self.text_result(content);
        self.telemetry.record(&result, started.elapsed());
        result
    }

    pub fn assess_image(
        &self,
        width: u32,
        height: u32,
        byte_size: u64,
    ) -> Result<AnalysisResult, AssessmentError> {
        let started = Instant::now();
        let result = self.image_result(width, height, byte_size)?;
        self.telemetry.record(&result, started.elapsed());
        Ok(result)
    }

    /// Reads the dimensions from an encoded png, jpeg or gif header.
    /// Undecodable payloads follow the configured decode-failure policy.
    pub fn assess_image_bytes(&self, bytes: &[u8]) -> Result<AnalysisResult, AssessmentError> {
        let started = Instant::now();
        let result = self.image_bytes_result(bytes)?;
        self.telemetry.record(&result, started.elapsed());
        Ok(result)
    }

    pub fn assess(&self, input: &AnalysisInput) -> Result<AnalysisResult, AssessmentError> {
        let started = Instant::now();
        let result = match input.kind() {
            InputKind::Text => self.text_result(&input.text()),
            InputKind::Image => self.image_bytes_result(input.payload())?,
            InputKind::Document => {
                // pdf/doc/docx carry no content inspection at all.
                log::debug!(
                    "No content inspection for .{} ({} bytes)",
                    input.declared_extension(),
                    input.payload().len()
                );
                AnalysisResult::pass_through()
            }
        };
        self.telemetry.record(&result, started.elapsed());
        Ok(result)
    }

    pub fn assess_file(
        &self,
        extension: &str,
        bytes: &[u8],
    ) -> Result<AnalysisResult, AssessmentError> {
        self.assess(&AnalysisInput::from_extension(extension, bytes))
    }

    fn text_score(&self, content: &str) -> f64 {
        match self.scorer.score(content) {
            Ok(score) if score.is_finite() => score.clamp(0.0, 1.0),
            Ok(score) => {
                log::warn!(
                    "Scorer {} returned non-finite score {}; treating as 0.0",
                    self.scorer.name(),
                    score
                );
                self.telemetry.track_scorer_failure();
                0.0
            }
            Err(err) => {
                log::warn!("{} (scorer {}); treating as 0.0", err, self.scorer.name());
                self.telemetry.track_scorer_failure();
                0.0
            }
        }
    }

    fn text_result(&self, content: &str) -> AnalysisResult {
        let score = self.text_score(content);
        self.text_policy.decide(score, Vec::new())
    }

    fn image_result(
        &self,
        width: u32,
        height: u32,
        byte_size: u64,
    ) -> Result<AnalysisResult, AssessmentError> {
        if width == 0 || height == 0 {
            return Err(AssessmentError::InvalidImage(format!(
                "dimensions must be positive, got {}x{}",
                width, height
            )));
        }
        let risk = assess_image_risk(width, height, byte_size, &self.config.image);
        if !risk.reasons.is_empty() {
            log::debug!(
                "Image {}x{} scored {:.2}: {}",
                width,
                height,
                risk.score,
                risk.reasons.join("; ")
            );
        }
        Ok(self.image_policy.decide(risk.score, Vec::new()))
    }

    fn image_bytes_result(&self, bytes: &[u8]) -> Result<AnalysisResult, AssessmentError> {
        match read_dimensions(bytes) {
            Ok((width, height)) => self.image_result(width, height, bytes.len() as u64),
            Err(reason) => {
                log::warn!("Error analyzing image ({} bytes): {}", bytes.len(), reason);
                let score = match self.config.decode_failure {
                    DecodeFailurePolicy::FlagForReview => DECODE_FAILURE_SCORE,
                    DecodeFailurePolicy::Reject => 1.0,
                };
                Ok(self
                    .image_policy
                    .decide(score, vec![DECODE_FAILURE_WARNING.to_string()]))
            }
        }
    }
}

impl Default for RiskAssessor {
    /// Process-wide rules with the keyword fallback.
    fn default() -> Self {
        Self::new(GUARD_CONFIG.clone())
    }
}

fn read_dimensions(bytes: &[u8]) -> Result<(u32, u32), String> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|err| err.to_string())?;
    if reader.format().is_none() {
        return Err("unrecognised image format".into());
    }
    reader.into_dimensions().map_err(|err| err.to_string())
}
