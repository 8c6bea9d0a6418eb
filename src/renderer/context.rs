//! Derivation Context
//!
//! Owns every cache shared across drawables: derived shader programs,
//! interned render states and their per-purpose variants. One context serves
//! one rendering device; derived entries live until [`Context::clear`].
//!
//! The context is `Send` but not shared: derivation entry points take
//! `&mut Context`, so concurrent use requires external synchronization.

use std::sync::Arc;

use super::settings::DerivationSettings;
use super::shader_cache::ShaderCache;
use super::state_cache::RenderStateVariantCache;
use crate::resources::render_state::{RenderState, RenderStateCache, RenderStateDescriptor};
use crate::utils::interner;

/// Per-frame flags consulted by the derivation facade.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameState {
    /// The current pick pass extracts metadata values instead of pick ids.
    pub picking_metadata: bool,
}

#[derive(Debug)]
pub struct Context {
    settings: DerivationSettings,
    shader_cache: ShaderCache,
    render_states: RenderStateCache,
    state_variants: RenderStateVariantCache,
}

impl Context {
    #[must_use]
    pub fn new(settings: DerivationSettings) -> Self {
        log::debug!("Creating derivation context with {settings:?}");
        interner::preload_common_tokens();
        Self {
            settings,
            shader_cache: ShaderCache::new(),
            render_states: RenderStateCache::new(),
            state_variants: RenderStateVariantCache::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn settings(&self) -> &DerivationSettings {
        &self.settings
    }

    #[inline]
    #[must_use]
    pub fn shader_cache(&self) -> &ShaderCache {
        &self.shader_cache
    }

    #[inline]
    pub fn shader_cache_mut(&mut self) -> &mut ShaderCache {
        &mut self.shader_cache
    }

    #[inline]
    #[must_use]
    pub fn render_states(&self) -> &RenderStateCache {
        &self.render_states
    }

    #[inline]
    #[must_use]
    pub fn state_variants(&self) -> &RenderStateVariantCache {
        &self.state_variants
    }

    /// Both render-state tables, borrowed together so variants can be
    /// interned while the variant map is being filled.
    pub fn render_state_caches_mut(
        &mut self,
    ) -> (&mut RenderStateCache, &mut RenderStateVariantCache) {
        (&mut self.render_states, &mut self.state_variants)
    }

    /// Interns a base render state for use in draw commands.
    pub fn intern_render_state(&mut self, descriptor: RenderStateDescriptor) -> Arc<RenderState> {
        self.render_states.intern(descriptor)
    }

    /// Drops every cached variant and interned state.
    ///
    /// Commands and [`DerivationResult`](super::derive::DerivationResult)
    /// slots keep their `Arc`s alive; slots re-resolve through the emptied
    /// caches only once their base program changes.
    pub fn clear(&mut self) {
        log::debug!(
            "Clearing derivation context ({} programs, {} render states)",
            self.shader_cache.len(),
            self.render_states.len()
        );
        self.shader_cache.clear();
        self.state_variants.clear();
        self.render_states.clear();
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new(DerivationSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::shader_source::ShaderSource;
    use crate::renderer::program::{AttributeLocations, ShaderProgram};
    use crate::renderer::purpose::PurposeTag;
    use crate::renderer::shader_cache::DerivedSources;
    use crate::renderer::state_cache::StatePurpose;

    fn assert_send<T: Send>() {}

    #[test]
    fn test_context_is_send() {
        assert_send::<Context>();
    }

    #[test]
    fn test_new_keeps_settings() {
        let settings = DerivationSettings {
            dump_derived_sources: true,
            ..Default::default()
        };
        let ctx = Context::new(settings);
        assert_eq!(*ctx.settings(), settings);
        assert!(ctx.shader_cache().is_empty());
        assert!(ctx.render_states().is_empty());
        assert!(interner::get("LOG_DEPTH_READ_ONLY").is_some());
    }

    #[test]
    fn test_clear_empties_every_table() {
        let mut ctx = Context::default();
        let base = ShaderProgram::shared(
            ShaderSource::from_fragments(["void main() {}"]),
            ShaderSource::from_fragments(["void main() { out_FragColor = vec4(1.0); }"]),
            AttributeLocations::new(),
        );
        ctx.shader_cache_mut()
            .get_or_create(&base, PurposeTag::hdr(), DerivedSources::from_program);

        let state = ctx.intern_render_state(RenderStateDescriptor::default());
        let (states, variants) = ctx.render_state_caches_mut();
        variants.get_or_create(states, &state, StatePurpose::Pick);

        assert_eq!(ctx.shader_cache().len(), 1);
        assert_eq!(ctx.render_states().len(), 2);
        assert!(!ctx.state_variants().is_empty());

        ctx.clear();

        assert!(ctx.shader_cache().is_empty());
        assert!(ctx.render_states().is_empty());
        assert!(ctx.state_variants().is_empty());
        assert_eq!(ctx.shader_cache().stats().created, 0);
    }
}
