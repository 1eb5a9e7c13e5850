use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use super::types::AnalysisResult;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct TelemetrySnapshot {
    pub total_assessments: u64,
    pub rejected: u64,
    pub flagged_for_review: u64,
    pub scorer_failures: u64,
    pub last_assessment_us: u64,
}

/// Counters only; nothing recorded here feeds back into a decision.
#[derive(Debug, Default)]
pub struct AssessmentTelemetry {
    snapshot: Mutex<TelemetrySnapshot>,
}

impl AssessmentTelemetry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, result: &AnalysisResult, elapsed: Duration) {
        self.update(|snapshot| {
            snapshot.total_assessments = snapshot.total_assessments.saturating_add(1);
            if !result.safe {
                snapshot.rejected = snapshot.rejected.saturating_add(1);
            } else if result.needs_review() {
                snapshot.flagged_for_review = snapshot.flagged_for_review.saturating_add(1);
            }
            snapshot.last_assessment_us = elapsed.as_micros().min(u64::MAX as u128) as u64;
        });
    }

    pub fn track_scorer_failure(&self) {
        self.update(|snapshot| {
            snapshot.scorer_failures = snapshot.scorer_failures.saturating_add(1);
        });
    }

    pub fn get_snapshot(&self) -> TelemetrySnapshot {
        match self.snapshot.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn persist(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(&self.get_snapshot())
            .unwrap_or_else(|_| b"{}".to_vec());
        fs::write(path, data)
    }

    fn update(&self, apply: impl FnOnce(&mut TelemetrySnapshot)) {
        let mut guard = match self.snapshot.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        apply(&mut guard);
    }
}
