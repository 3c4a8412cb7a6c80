//! UOP container tables and multi collection codecs
//!
#![allow(clippy::cast_possible_truncation)] // Intentional for binary format parsing
#![allow(clippy::cast_possible_wrap)] // Intentional for binary operations
#![allow(clippy::cast_lossless)] // Sometimes clearer than From
#![allow(clippy::doc_markdown)] // Many UOP-specific terms don't need backticks
#![allow(clippy::module_name_repetitions)] // Clear naming is preferred
#![allow(clippy::similar_names)] // offset_x / offset_y / offset_z
#![allow(clippy::derive_partial_eq_without_eq)] // Binary format structs
#![allow(clippy::return_self_not_must_use)] // Builder patterns
//! This crate provides symmetric (parser and builder) implementations for the
//! two layers of an Ultima Online multi collection:
//!
//! - **UOP containers** ([`uop`]): the paged directory that maps identifier
//!   hashes to compressed blobs inside a single `.uop` file
//! - **Multi collections** ([`multi`]): the placement records stored inside
//!   each blob, in both the legacy `.mul` layout and the modern UOP layout,
//!   plus the editable text form
//!
//! # Design Principles
//!
//! - **Symmetric Operations**: Both parsing and building supported
//! - **Explicit Layout**: All records are read through `binrw` with fixed
//!   little-endian field widths, never by casting memory
//! - **Round-Trip Guarantee**: parse(build(data)) == data

#![warn(missing_docs)]

pub mod multi;
pub mod uop;
