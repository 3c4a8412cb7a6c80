//! Hashing primitives for UOP multi containers
//!
//! This crate provides the two hash functions every UOP container depends on,
//! plus the lookup structure used to turn stored identifiers back into ids.
//!
//! # Components
//!
//! - **Identifier hash**: 64-bit lookup3-style hash over an entry name
//!   (`build/multicollection/000042.bin`), stored in each directory entry
//! - **Block checksum**: Adler-style checksum over the stored blob bytes
//! - **Name templates**: printf-style `%u` templates used to derive entry names
//! - **Identifier registry**: reverse map from identifier hash to numeric id
//!
//! # Examples
//!
//! ## Identifier hashing
//!
//! ```
//! use uomulti_hash::identifier_hash;
//!
//! let hash = identifier_hash("build/multicollection/housing.bin");
//! assert_eq!(hash, 0x126D_1E99_DDED_EE0A);
//! ```
//!
//! ## Reverse lookup
//!
//! ```
//! use uomulti_hash::{IdentifierRegistry, NameTemplate, identifier_hash};
//!
//! let template = NameTemplate::parse("build/multicollection/%.6u.bin")?;
//! let registry = IdentifierRegistry::from_template(&template, 0..=10);
//!
//! let hash = identifier_hash("build/multicollection/000007.bin");
//! assert_eq!(registry.get(hash), Some(7));
//! # Ok::<(), uomulti_hash::HashError>(())
//! ```

#![warn(missing_docs)]

pub mod checksum;
pub mod error;
pub mod identifier;
pub mod registry;
pub mod template;

pub use checksum::{BlockChecksum, block_checksum, block_checksum_reader};
pub use error::HashError;
pub use identifier::identifier_hash;
pub use registry::IdentifierRegistry;
pub use template::NameTemplate;
