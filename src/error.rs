//! Error taxonomy for the audit database.
//!
//! Kept as a single flat enum rather than the boxed-kind pattern used
//! elsewhere for deeply user-facing validation errors — that extra
//! indirection earns its keep when a type needs to hide its variants behind
//! a stable API, which isn't the case here.

use camino::Utf8PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error")]
    Io(#[from] std::io::Error),

    #[error("malformed data file: {reason}")]
    MalformedData { reason: String },

    #[error("malformed tree file: {reason}")]
    MalformedTree { reason: String },

    #[error("tree file must be constructed but no verifier key was supplied")]
    MissingVerifierKey,

    #[error("leaf index {index} out of range for a tree with {len} leaves")]
    OutOfRange { index: u32, len: u32 },

    #[error("no leaf matches the queried hash")]
    HashNotFound,

    #[error("{path} already exists")]
    AlreadyExists { path: Utf8PathBuf },
}
