//! Purpose tags.
//!
//! A purpose tag names the auxiliary pass a derived variant serves. Tags are
//! owned by the caches that key on them: per-drawable tags (pick ids,
//! picked metadata properties) are released when the owning
//! [`Context`](super::context::Context) is cleared.

use std::sync::Arc;

use crate::errors::{Result, VariantError};
use crate::resources::metadata::PickedMetadataInfo;

pub const DEPTH_ONLY: &str = "depthOnly";
pub const LOG_DEPTH: &str = "logDepth";
pub const HDR: &str = "HDR";

/// Validated purpose tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PurposeTag(Arc<str>);

fn validate(tag: &str) -> Result<()> {
    if tag.is_empty() {
        return Err(VariantError::InvalidPurposeTag {
            tag: tag.to_owned(),
            reason: "tag is empty",
        });
    }
    if tag.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(VariantError::InvalidPurposeTag {
            tag: tag.to_owned(),
            reason: "tag contains whitespace or control characters",
        });
    }
    Ok(())
}

impl PurposeTag {
    /// Creates a tag, rejecting empty text and text with whitespace or
    /// control characters.
    pub fn new(tag: &str) -> Result<Self> {
        validate(tag)?;
        Ok(Self(Arc::from(tag)))
    }

    /// For tags assembled from parts whose own constructors already
    /// exclude whitespace and control characters.
    fn assembled(tag: String) -> Self {
        debug_assert!(validate(&tag).is_ok(), "malformed assembled tag {tag:?}");
        Self(Arc::from(tag))
    }

    #[must_use]
    pub fn depth_only() -> Self {
        Self(Arc::from(DEPTH_ONLY))
    }

    #[must_use]
    pub fn log_depth() -> Self {
        Self(Arc::from(LOG_DEPTH))
    }

    #[must_use]
    pub fn hdr() -> Self {
        Self(Arc::from(HDR))
    }

    /// Pick variants differ by alpha-test policy and by the pick id
    /// expression baked into the new entry point.
    #[must_use]
    pub fn pick(picking_metadata: bool, pick_id: &str) -> Self {
        Self::assembled(format!("pick-pickingMetadata-{picking_metadata}-{pick_id}"))
    }

    /// Metadata pick variants are specific to one property of one class.
    ///
    /// Schema and class names never contain `-`, so the joined key is
    /// unambiguous.
    #[must_use]
    pub fn pick_metadata(info: &PickedMetadataInfo) -> Self {
        Self::assembled(format!(
            "pickMetadata-{}-{}-{}",
            info.schema_id(),
            info.class_name(),
            info.property_name()
        ))
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PurposeTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
