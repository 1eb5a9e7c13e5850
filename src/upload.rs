pub mod audit;
mod filename;
mod gate;
mod sniff;
pub mod types;

pub use audit::audit_directory;
pub use filename::{extension_of, secure_filename};
pub use gate::UploadGate;
pub use sniff::{is_allowed_mime, sniff_mime};
pub use types::{AuditEntry, AuditReport, UploadReceipt, UploadRejection};
