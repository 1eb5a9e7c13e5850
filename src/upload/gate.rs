use bytesize::ByteSize;
use chrono::Utc;
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::filename::{create_unique, extension_of, secure_filename};
use super::sniff::{is_allowed_mime, sniff_mime};
use super::types::{UploadReceipt, UploadRejection};
use crate::content_safety::RiskAssessor;

/// Validates, assesses and stores uploaded files in one directory.
pub struct UploadGate {
    upload_dir: PathBuf,
    assessor: RiskAssessor,
}

impl UploadGate {
    pub fn new(upload_dir: impl Into<PathBuf>, assessor: RiskAssessor) -> Result<Self, String> {
        let upload_dir = upload_dir.into();
        fs::create_dir_all(&upload_dir).map_err(|e| {
            format!(
                "Failed to create upload directory {}: {}",
                upload_dir.display(),
                e
            )
        })?;
        Ok(UploadGate {
            upload_dir,
            assessor,
        })
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn assessor(&self) -> &RiskAssessor {
        &self.assessor
    }

    /// Nothing touches the disk unless every check passes.
    pub fn accept(&self, filename: &str, bytes: &[u8]) -> Result<UploadReceipt, UploadRejection> {
        let outcome = self.accept_inner(filename, bytes);
        if let Err(rejection) = &outcome {
            log::warn!(
                "Upload {:?} ({}) rejected: {}",
                filename,
                ByteSize(bytes.len() as u64),
                rejection
            );
        }
        outcome
    }

    fn accept_inner(&self, filename: &str, bytes: &[u8]) -> Result<UploadReceipt, UploadRejection> {
        let limits = &self.assessor.config().upload;

        if filename.is_empty() {
            return Err(UploadRejection::NoFileSelected);
        }
        match extension_of(filename) {
            Some(ext) if limits.allows_extension(&ext) => {}
            _ => return Err(UploadRejection::FileTypeNotAllowed),
        }
        if filename.chars().count() > limits.max_filename_len {
            return Err(UploadRejection::FilenameTooLong);
        }

        let sanitized = secure_filename(filename);
        let extension = match extension_of(&sanitized) {
            Some(ext) if limits.allows_extension(&ext) => ext,
            _ => return Err(UploadRejection::InvalidFilename),
        };

        let size = bytes.len() as u64;
        if size > limits.max_file_size {
            return Err(UploadRejection::FileTooLarge {
                max_bytes: limits.max_file_size,
            });
        }
        if size == 0 {
            return Err(UploadRejection::EmptyFile);
        }

        let mime = sniff_mime(bytes);
        if !is_allowed_mime(mime) {
            log::debug!("Sniffed {} for {}", mime, sanitized);
            return Err(UploadRejection::FileTypeNotAllowed);
        }

        let analysis = self
            .assessor
            .assess_file(&extension, bytes)
            .map_err(|err| UploadRejection::Rejected {
                details: vec![err.to_string()],
            })?;
        if !analysis.safe {
            return Err(UploadRejection::Rejected {
                details: analysis.warnings,
            });
        }

        let (stored_path, mut file) = create_unique(&self.upload_dir, &sanitized)
            .map_err(|err| UploadRejection::Storage(err.to_string()))?;
        if let Err(err) = file.write_all(bytes).and_then(|_| file.sync_all()) {
            drop(file);
            let _ = fs::remove_file(&stored_path);
            return Err(UploadRejection::Storage(err.to_string()));
        }

        let mut hasher = Sha256::new();
        hasher.update(bytes);
        let sha256 = format!("{:x}", hasher.finalize());

        let stored_name = stored_path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(sanitized.as_str())
            .to_string();

        log::info!(
            "Accepted {} ({}, risk {:.2}, {} warning(s))",
            stored_name,
            ByteSize(size),
            analysis.risk_score,
            analysis.warnings.len()
        );

        Ok(UploadReceipt {
            id: uuid::Uuid::new_v4().to_string(),
            filename: stored_name,
            stored_path: stored_path.to_string_lossy().into_owned(),
            size,
            sha256,
            risk_score: analysis.risk_score,
            warnings: analysis.warnings,
            accepted_at: Utc::now(),
        })
    }
}
