//! Shader Variant Cache
//!
//! Maps `(base ProgramId, PurposeTag)` to the derived program created for
//! that pair. The cache lives as long as the owning
//! [`Context`](super::context::Context); entries are only dropped by
//! [`ShaderCache::clear`].
//!
//! # Insert policy
//!
//! - [`ShaderCache::create`] always stores (last write wins). Callers are
//!   expected to [`get`](ShaderCache::get) first.
//! - [`ShaderCache::get_or_create`] never replaces an existing entry; the
//!   first variant stored for a pair is the one every later caller sees.
//!   This is the path the derivation facade uses.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use super::program::{AttributeLocations, ProgramId, ShaderProgram};
use super::purpose::PurposeTag;
use crate::resources::shader_source::ShaderSource;

/// Output of a derivation rule: everything needed to build a new program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedSources {
    pub vertex: ShaderSource,
    pub fragment: ShaderSource,
    pub attribute_locations: AttributeLocations,
}

impl DerivedSources {
    /// Sources identical to `program`'s.
    #[must_use]
    pub fn from_program(program: &ShaderProgram) -> Self {
        Self {
            vertex: program.vertex_source().clone(),
            fragment: program.fragment_source().clone(),
            attribute_locations: program.attribute_locations().clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShaderCacheStats {
    /// Programs created (each one is a GPU compilation downstream).
    pub created: u64,
    /// `get_or_create` calls answered from the cache.
    pub hits: u64,
    /// `get_or_create` calls that had to derive.
    pub misses: u64,
}

type VariantKey = (ProgramId, PurposeTag);

#[derive(Debug, Default)]
pub struct ShaderCache {
    derived: FxHashMap<VariantKey, Arc<ShaderProgram>>,
    stats: ShaderCacheStats,
}

impl ShaderCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the variant stored for `(base_id, tag)`, if any.
    #[must_use]
    pub fn get(&self, base_id: ProgramId, tag: &PurposeTag) -> Option<Arc<ShaderProgram>> {
        self.derived.get(&(base_id, tag.clone())).cloned()
    }

    /// Builds a program from `sources` and stores it as the `tag` variant of
    /// `base`, replacing any previous entry.
    pub fn create(
        &mut self,
        base: &ShaderProgram,
        tag: PurposeTag,
        sources: DerivedSources,
    ) -> Arc<ShaderProgram> {
        let program = ShaderProgram::shared(
            sources.vertex,
            sources.fragment,
            sources.attribute_locations,
        );
        self.stats.created += 1;

        log::debug!(
            "Created derived shader program {} ({tag}) from base {}",
            program.id(),
            base.id()
        );

        if self
            .derived
            .insert((base.id(), tag.clone()), program.clone())
            .is_some()
        {
            log::warn!(
                "Replaced existing derived shader program for base {} ({tag})",
                base.id()
            );
        }

        program
    }

    /// Returns the cached `tag` variant of `base`, deriving and storing it
    /// with `derive` on a miss.
    pub fn get_or_create<F>(
        &mut self,
        base: &ShaderProgram,
        tag: PurposeTag,
        derive: F,
    ) -> Arc<ShaderProgram>
    where
        F: FnOnce(&ShaderProgram) -> DerivedSources,
    {
        if let Some(program) = self.get(base.id(), &tag) {
            self.stats.hits += 1;
            return program;
        }

        self.stats.misses += 1;
        let sources = derive(base);
        self.create(base, tag, sources)
    }

    #[must_use]
    pub fn stats(&self) -> ShaderCacheStats {
        self.stats
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.derived.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.derived.is_empty()
    }

    /// Drops every cached variant and resets statistics.
    pub fn clear(&mut self) {
        self.derived.clear();
        self.stats = ShaderCacheStats::default();
    }
}
