//! Render-State Variant Cache
//!
//! Two independent maps, keyed by the *base* [`RenderStateId`]:
//!
//! | Purpose | Override |
//! |---------|----------|
//! | [`StatePurpose::DepthOnly`] | depth write on, all color channels off |
//! | [`StatePurpose::Pick`] | blending off, depth write on |
//!
//! Derived descriptors are re-interned through the context's
//! [`RenderStateCache`], so two bases whose overridden content coincides
//! share a single derived state.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::resources::render_state::{
    ColorMask, RenderState, RenderStateCache, RenderStateDescriptor, RenderStateId,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatePurpose {
    DepthOnly,
    Pick,
}

impl StatePurpose {
    /// Applies the purpose's fixed field overrides.
    pub fn apply(self, descriptor: &mut RenderStateDescriptor) {
        match self {
            Self::DepthOnly => {
                descriptor.depth_mask = true;
                descriptor.color_mask = ColorMask::NONE;
            }
            Self::Pick => {
                descriptor.blending.enabled = false;
                // Translucent geometry writes depth too, so overlapping
                // surfaces resolve to the nearest one in the pick buffer.
                descriptor.depth_mask = true;
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct RenderStateVariantCache {
    depth_only: FxHashMap<RenderStateId, Arc<RenderState>>,
    pick: FxHashMap<RenderStateId, Arc<RenderState>>,
}

impl RenderStateVariantCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn map(&self, purpose: StatePurpose) -> &FxHashMap<RenderStateId, Arc<RenderState>> {
        match purpose {
            StatePurpose::DepthOnly => &self.depth_only,
            StatePurpose::Pick => &self.pick,
        }
    }

    /// Returns the derived state for `base`, if one was created already.
    #[must_use]
    pub fn get(&self, base: &RenderState, purpose: StatePurpose) -> Option<Arc<RenderState>> {
        self.map(purpose).get(&base.id()).cloned()
    }

    /// Returns the `purpose` variant of `base`, creating and interning it on
    /// first use.
    pub fn get_or_create(
        &mut self,
        states: &mut RenderStateCache,
        base: &RenderState,
        purpose: StatePurpose,
    ) -> Arc<RenderState> {
        let map = match purpose {
            StatePurpose::DepthOnly => &mut self.depth_only,
            StatePurpose::Pick => &mut self.pick,
        };

        map.entry(base.id())
            .or_insert_with(|| {
                let mut descriptor = base.descriptor();
                purpose.apply(&mut descriptor);
                let derived = states.intern(descriptor);
                log::debug!(
                    "Created {purpose:?} render state {:?} from base {:?}",
                    derived.id(),
                    base.id()
                );
                derived
            })
            .clone()
    }

    #[must_use]
    pub fn len(&self, purpose: StatePurpose) -> usize {
        self.map(purpose).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.depth_only.is_empty() && self.pick.is_empty()
    }

    pub fn clear(&mut self) {
        self.depth_only.clear();
        self.pick.clear();
    }
}
