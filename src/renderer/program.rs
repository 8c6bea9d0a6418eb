//! Shader programs and their content-derived identity.
//!
//! A [`ShaderProgram`] bundles the vertex and fragment [`ShaderSource`]s with
//! the vertex-attribute bindings. Its [`ProgramId`] is an xxh3-64 hash of
//! all three, so the id changes exactly when the effective program content
//! changes. Two programs built from the same sources share an id even when
//! they are distinct allocations.

use std::collections::BTreeMap;
use std::sync::Arc;

use xxhash_rust::xxh3::Xxh3;

use crate::resources::shader_source::ShaderSource;

/// Attribute name → binding slot. Ordered so hashing is deterministic.
pub type AttributeLocations = BTreeMap<String, u32>;

/// Content-derived identity of a [`ShaderProgram`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProgramId(pub(crate) u64);

impl ProgramId {
    #[inline]
    #[must_use]
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ProgramId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// A linked vertex + fragment program, as handed to the GPU layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderProgram {
    id: ProgramId,
    vertex: ShaderSource,
    fragment: ShaderSource,
    attribute_locations: AttributeLocations,
}

impl ShaderProgram {
    #[must_use]
    pub fn new(
        vertex: ShaderSource,
        fragment: ShaderSource,
        attribute_locations: AttributeLocations,
    ) -> Self {
        let id = compute_program_id(&vertex, &fragment, &attribute_locations);
        Self {
            id,
            vertex,
            fragment,
            attribute_locations,
        }
    }

    /// Convenience constructor returning a shared program.
    #[must_use]
    pub fn shared(
        vertex: ShaderSource,
        fragment: ShaderSource,
        attribute_locations: AttributeLocations,
    ) -> Arc<Self> {
        Arc::new(Self::new(vertex, fragment, attribute_locations))
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> ProgramId {
        self.id
    }

    #[inline]
    #[must_use]
    pub fn vertex_source(&self) -> &ShaderSource {
        &self.vertex
    }

    #[inline]
    #[must_use]
    pub fn fragment_source(&self) -> &ShaderSource {
        &self.fragment
    }

    #[inline]
    #[must_use]
    pub fn attribute_locations(&self) -> &AttributeLocations {
        &self.attribute_locations
    }
}

fn hash_stage(hasher: &mut Xxh3, stage: &ShaderSource) {
    // Length prefixes keep ["ab"] and ["a", "b"] apart.
    hasher.update(&(stage.defines().len() as u64).to_le_bytes());
    for token in stage.defines().iter() {
        hasher.update(&(token.len() as u64).to_le_bytes());
        hasher.update(token.as_bytes());
    }
    hasher.update(&(stage.fragments().len() as u64).to_le_bytes());
    for fragment in stage.fragments() {
        hasher.update(&(fragment.len() as u64).to_le_bytes());
        hasher.update(fragment.as_bytes());
    }
}

fn compute_program_id(
    vertex: &ShaderSource,
    fragment: &ShaderSource,
    attribute_locations: &AttributeLocations,
) -> ProgramId {
    let mut hasher = Xxh3::new();
    hash_stage(&mut hasher, vertex);
    hash_stage(&mut hasher, fragment);
    for (name, slot) in attribute_locations {
        hasher.update(&(name.len() as u64).to_le_bytes());
        hasher.update(name.as_bytes());
        hasher.update(&slot.to_le_bytes());
    }
    ProgramId(hasher.digest())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::ShaderDefines;

    fn attrs() -> AttributeLocations {
        AttributeLocations::from([("position".to_owned(), 0)])
    }

    #[test]
    fn test_equal_content_equal_id() {
        let a = ShaderProgram::new(
            ShaderSource::from_fragments(["void main() {}"]),
            ShaderSource::from_fragments(["void main() {}"]),
            attrs(),
        );
        let b = a.clone();
        assert_eq!(a.id(), b.id());
    }

    #[test]
    fn test_id_tracks_every_input() {
        let base = ShaderProgram::new(
            ShaderSource::from_fragments(["void main() {}"]),
            ShaderSource::from_fragments(["void main() {}"]),
            attrs(),
        );

        let other_fragment = ShaderProgram::new(
            base.vertex_source().clone(),
            ShaderSource::from_fragments(["void main() { discard; }"]),
            attrs(),
        );
        let other_define = ShaderProgram::new(
            base.vertex_source().clone(),
            base.fragment_source()
                .clone()
                .with_defines(ShaderDefines::from(&["HDR"][..])),
            attrs(),
        );
        let other_attrs = ShaderProgram::new(
            base.vertex_source().clone(),
            base.fragment_source().clone(),
            AttributeLocations::from([("position".to_owned(), 1)]),
        );

        assert_ne!(base.id(), other_fragment.id());
        assert_ne!(base.id(), other_define.id());
        assert_ne!(base.id(), other_attrs.id());
    }

    #[test]
    fn test_fragment_split_changes_id() {
        let joined = ShaderProgram::new(
            ShaderSource::default(),
            ShaderSource::from_fragments(["ab"]),
            AttributeLocations::new(),
        );
        let split = ShaderProgram::new(
            ShaderSource::default(),
            ShaderSource::from_fragments(["a", "b"]),
            AttributeLocations::new(),
        );
        assert_ne!(joined.id(), split.id());
    }

    #[test]
    fn test_stage_swap_changes_id() {
        let a = ShaderProgram::new(
            ShaderSource::from_fragments(["v"]),
            ShaderSource::from_fragments(["f"]),
            AttributeLocations::new(),
        );
        let b = ShaderProgram::new(
            ShaderSource::from_fragments(["f"]),
            ShaderSource::from_fragments(["v"]),
            AttributeLocations::new(),
        );
        assert_ne!(a.id(), b.id());
    }
}
