//! Error types for hashing operations

use thiserror::Error;

/// Errors that can occur while preparing identifier hashes
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HashError {
    /// Template has no `%u` conversion
    #[error("Name template has no %u conversion: {0}")]
    MissingConversion(String),

    /// Template has more than one conversion
    #[error("Name template has more than one conversion: {0}")]
    MultipleConversions(String),

    /// Template uses an unsupported conversion or flag
    #[error("Unsupported conversion in name template {template}: {reason}")]
    UnsupportedConversion {
        /// The offending template
        template: String,
        /// What was wrong with it
        reason: String,
    },
}
