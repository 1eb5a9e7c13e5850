use super::context::TextContext;
use crate::config::ImageRules;

#[derive(Debug, Clone)]
struct Signal {
    penalty: f64,
    reason: String,
}

fn push_signal(target: &mut Vec<Signal>, penalty: f64, reason: impl Into<String>) {
    let candidate = reason.into();
    if let Some(existing) = target
        .iter_mut()
        .find(|signal| signal.reason.as_str() == candidate.as_str())
    {
        existing.penalty = existing.penalty.max(penalty);
    } else {
        target.push(Signal {
            penalty,
            reason: candidate,
        });
    }
}

fn total_penalty(signals: &[Signal]) -> f64 {
    signals
        .iter()
        .fold(0.0, |acc, signal| acc + signal.penalty)
        .clamp(0.0, 1.0)
}

#[derive(Debug, Clone)]
pub(crate) struct ImageRisk {
    pub score: f64,
    pub reasons: Vec<String>,
}

/// Offline heuristic: each distinct suspicious term present adds `weight`.
pub(crate) fn keyword_score(
    ctx: &TextContext<'_>,
    terms: &[String],
    weight: f64,
) -> (f64, Vec<String>) {
    if ctx.is_blank() {
        return (0.0, Vec::new());
    }
    let matched = ctx.matched_terms(terms);
    let score = (weight * matched.len() as f64).min(1.0);
    (score, matched.into_iter().map(str::to_string).collect())
}

pub(crate) fn assess_image_risk(
    width: u32,
    height: u32,
    byte_size: u64,
    rules: &ImageRules,
) -> ImageRisk {
    let mut signals: Vec<Signal> = Vec::new();

    if width > rules.max_dimension || height > rules.max_dimension {
        push_signal(
            &mut signals,
            rules.oversize_penalty,
            format!(
                "Dimensions {}x{} exceed {}px",
                width, height, rules.max_dimension
            ),
        );
    }

    let expected = u64::from(width)
        .saturating_mul(u64::from(height))
        .saturating_mul(rules.bytes_per_pixel);
    if byte_size > expected.saturating_mul(rules.byte_ratio_limit) {
        push_signal(
            &mut signals,
            rules.byte_ratio_penalty,
            format!(
                "File size {} exceeds {}x the uncompressed estimate of {}",
                byte_size, rules.byte_ratio_limit, expected
            ),
        );
    }

    ImageRisk {
        score: total_penalty(&signals),
        reasons: signals.into_iter().map(|signal| signal.reason).collect(),
    }
}
