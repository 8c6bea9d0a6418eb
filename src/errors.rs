//! Error Types
//!
//! Derivation itself never fails: a missing entry point or an absent
//! placeholder define is a silent no-op, and malformed shader text only
//! surfaces later when the GPU layer compiles it.
//!
//! The errors below are raised at *construction* time, when a caller builds
//! one of the inputs that the derivation rules rely on (purpose tags, pick
//! ids, metadata property descriptors). They describe programmer errors
//! rather than recoverable runtime conditions.
//!
//! ```rust,ignore
//! use shader_variants::errors::{VariantError, Result};
//! use shader_variants::renderer::PurposeTag;
//!
//! fn outline_tag() -> Result<PurposeTag> {
//!     PurposeTag::new("outline")
//! }
//! ```

use thiserror::Error;

/// The main error type for the shader-variant subsystem.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VariantError {
    // ========================================================================
    // Identity Errors
    // ========================================================================
    /// A purpose tag was empty or contained whitespace / control characters.
    #[error("Invalid purpose tag {tag:?}: {reason}")]
    InvalidPurposeTag {
        /// The rejected tag text
        tag: String,
        /// Why the tag was rejected
        reason: &'static str,
    },

    /// A pick id expression was empty or contained whitespace.
    #[error("Invalid pick id {0:?}")]
    InvalidPickId(String),

    // ========================================================================
    // Metadata Errors
    // ========================================================================
    /// The property cannot be packed into a single RGBA output.
    #[error("Metadata property '{property}' has {count} components (expected 1..=4)")]
    InvalidComponentCount {
        /// Property identifier
        property: String,
        /// Resolved component count (type arity or array length)
        count: u32,
    },

    /// A schema id, class name or property name was empty.
    #[error("Metadata {0} must not be empty")]
    EmptyMetadataName(&'static str),

    /// A name cannot be spliced into a purpose tag or shader text.
    #[error("Metadata {field} {value:?} {reason}")]
    InvalidMetadataName {
        /// Which field was rejected
        field: &'static str,
        /// The rejected value
        value: String,
        /// Which rule the value breaks
        reason: &'static str,
    },
}

/// Alias for `Result<T, VariantError>`.
pub type Result<T> = std::result::Result<T, VariantError>;
