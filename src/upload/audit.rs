#[cfg(feature = "parallel-scan")]
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::filename::extension_of;
use super::types::{AuditEntry, AuditReport};
use crate::content_safety::{RiskAssessor, RiskLevel};

const AUDIT_MAX_DEPTH: usize = 4;

/// Re-assesses every stored upload under `dir` with the current rules.
/// Unreadable files are reported, never fatal.
pub fn audit_directory(dir: &Path, assessor: &RiskAssessor) -> Result<AuditReport, String> {
    if !dir.is_dir() {
        return Err(format!("Audit target {} is not a directory", dir.display()));
    }

    let limits = &assessor.config().upload;
    let candidates: Vec<(PathBuf, String)> = WalkDir::new(dir)
        .max_depth(AUDIT_MAX_DEPTH)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                log::debug!("Skipping unreadable entry during audit: {}", err);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| {
            let name = entry.file_name().to_str()?.to_string();
            let ext = extension_of(&name)?;
            limits
                .allows_extension(&ext)
                .then(|| (entry.into_path(), ext))
        })
        .collect();

    #[cfg(feature = "parallel-scan")]
    let mut entries: Vec<AuditEntry> = candidates
        .par_iter()
        .map(|(path, ext)| audit_file(path, ext, assessor))
        .collect();
    #[cfg(not(feature = "parallel-scan"))]
    let mut entries: Vec<AuditEntry> = candidates
        .iter()
        .map(|(path, ext)| audit_file(path, ext, assessor))
        .collect();

    entries.sort_by(|a, b| a.path.cmp(&b.path));

    let mut report = AuditReport {
        scanned: entries.len(),
        ..AuditReport::default()
    };
    for entry in &entries {
        match entry.level() {
            Some(RiskLevel::Risky) => report.flagged += 1,
            Some(RiskLevel::Review) => report.needs_review += 1,
            Some(RiskLevel::Safe) => {}
            None => report.failed += 1,
        }
    }
    report.entries = entries;

    log::info!(
        "Audited {} file(s) in {}: {} flagged, {} for review, {} failed",
        report.scanned,
        dir.display(),
        report.flagged,
        report.needs_review,
        report.failed
    );
    Ok(report)
}

fn audit_file(path: &Path, ext: &str, assessor: &RiskAssessor) -> AuditEntry {
    let display = path.to_string_lossy().into_owned();
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) => {
            return AuditEntry {
                path: display,
                size: 0,
                result: None,
                error: Some(err.to_string()),
            }
        }
    };
    let size = bytes.len() as u64;
    match assessor.assess_file(ext, &bytes) {
        Ok(result) => AuditEntry {
            path: display,
            size,
            result: Some(result),
            error: None,
        },
        Err(err) => AuditEntry {
            path: display,
            size,
            result: None,
            error: Some(err.to_string()),
        },
    }
}
