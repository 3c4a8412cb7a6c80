//! Error types for multi collection codecs

use thiserror::Error;

/// Multi codec result type
pub type MultiResult<T> = Result<T, MultiError>;

/// Errors raised while decoding or encoding multi collections
#[derive(Debug, Error)]
pub enum MultiError {
    /// Binary record could not be read or written (usually truncated data)
    #[error("Binary format error: {0}")]
    BinRead(#[from] binrw::Error),

    /// A text field could not be parsed
    #[error("Invalid {field} value {value:?}: {reason}")]
    InvalidField {
        /// Field name
        field: &'static str,
        /// Offending text
        value: String,
        /// Parser message
        reason: String,
    },

    /// Component has more references than a modern record can count
    #[error("Component has {0} localization references, more than a record can hold")]
    TooManyReferences(usize),

    /// Collection has more components than a modern blob can count
    #[error("Collection has {0} components, more than a blob header can hold")]
    TooManyComponents(usize),
}
