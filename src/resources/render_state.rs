//! Content-addressed render state.
//!
//! A [`RenderStateDescriptor`] is the plain, mutable configuration (depth,
//! color mask, blending, rasterization). [`RenderStateCache::intern`] turns a
//! descriptor into an immutable, shared [`RenderState`] whose
//! [`RenderStateId`] is a hash of the descriptor content: two descriptors
//! with equal content always intern to the same `Arc`.
//!
//! The fields reuse `wgpu` enums so the GPU layer can translate a state into
//! pipeline descriptors without a second mapping.

use std::hash::Hash;
use std::sync::Arc;

use rustc_hash::FxHashMap;

// ─── Hashable State Parts ─────────────────────────────────────────────────────

/// Hashable mirror of `wgpu::BlendComponent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlendComponent {
    pub src_factor: wgpu::BlendFactor,
    pub dst_factor: wgpu::BlendFactor,
    pub operation: wgpu::BlendOperation,
}

impl BlendComponent {
    pub const REPLACE: Self = Self {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::Zero,
        operation: wgpu::BlendOperation::Add,
    };

    pub const OVER: Self = Self {
        src_factor: wgpu::BlendFactor::SrcAlpha,
        dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
        operation: wgpu::BlendOperation::Add,
    };
}

impl From<wgpu::BlendComponent> for BlendComponent {
    fn from(b: wgpu::BlendComponent) -> Self {
        Self {
            src_factor: b.src_factor,
            dst_factor: b.dst_factor,
            operation: b.operation,
        }
    }
}

impl From<BlendComponent> for wgpu::BlendComponent {
    fn from(b: BlendComponent) -> Self {
        Self {
            src_factor: b.src_factor,
            dst_factor: b.dst_factor,
            operation: b.operation,
        }
    }
}

/// Blending configuration. Factors are kept when `enabled` is false so that
/// toggling blending off and on again restores the original equation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlendingState {
    pub enabled: bool,
    pub color: BlendComponent,
    pub alpha: BlendComponent,
}

impl Default for BlendingState {
    fn default() -> Self {
        Self {
            enabled: false,
            color: BlendComponent::REPLACE,
            alpha: BlendComponent::REPLACE,
        }
    }
}

impl BlendingState {
    /// Standard alpha blending.
    #[must_use]
    pub fn alpha_blend() -> Self {
        Self {
            enabled: true,
            color: BlendComponent::OVER,
            alpha: BlendComponent::OVER,
        }
    }

    /// The `wgpu` blend state, `None` when blending is disabled.
    #[must_use]
    pub fn to_wgpu(&self) -> Option<wgpu::BlendState> {
        self.enabled.then(|| wgpu::BlendState {
            color: self.color.into(),
            alpha: self.alpha.into(),
        })
    }
}

/// Per-channel color write mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorMask {
    pub red: bool,
    pub green: bool,
    pub blue: bool,
    pub alpha: bool,
}

impl ColorMask {
    pub const ALL: Self = Self {
        red: true,
        green: true,
        blue: true,
        alpha: true,
    };

    pub const NONE: Self = Self {
        red: false,
        green: false,
        blue: false,
        alpha: false,
    };

    #[must_use]
    pub fn to_wgpu(self) -> wgpu::ColorWrites {
        let mut writes = wgpu::ColorWrites::empty();
        if self.red {
            writes |= wgpu::ColorWrites::RED;
        }
        if self.green {
            writes |= wgpu::ColorWrites::GREEN;
        }
        if self.blue {
            writes |= wgpu::ColorWrites::BLUE;
        }
        if self.alpha {
            writes |= wgpu::ColorWrites::ALPHA;
        }
        writes
    }
}

impl Default for ColorMask {
    fn default() -> Self {
        Self::ALL
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DepthTestState {
    pub enabled: bool,
    pub compare: wgpu::CompareFunction,
}

impl Default for DepthTestState {
    fn default() -> Self {
        Self {
            enabled: false,
            compare: wgpu::CompareFunction::Less,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CullState {
    pub enabled: bool,
    pub face: wgpu::Face,
}

impl Default for CullState {
    fn default() -> Self {
        Self {
            enabled: false,
            face: wgpu::Face::Back,
        }
    }
}

// ─── Descriptor ───────────────────────────────────────────────────────────────

/// Mutable render-state configuration.
///
/// Defaults: no depth test, no depth write, all color channels written,
/// blending off, no culling, counter-clockwise front faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderStateDescriptor {
    pub depth_test: DepthTestState,
    pub depth_mask: bool,
    pub color_mask: ColorMask,
    pub blending: BlendingState,
    pub cull: CullState,
    pub front_face: wgpu::FrontFace,
}

impl Default for RenderStateDescriptor {
    fn default() -> Self {
        Self {
            depth_test: DepthTestState::default(),
            depth_mask: false,
            color_mask: ColorMask::ALL,
            blending: BlendingState::default(),
            cull: CullState::default(),
            front_face: wgpu::FrontFace::Ccw,
        }
    }
}

impl RenderStateDescriptor {
    /// Content hash of the descriptor.
    #[must_use]
    pub fn compute_id(&self) -> RenderStateId {
        use std::hash::BuildHasher;

        RenderStateId(rustc_hash::FxBuildHasher.hash_one(self))
    }
}

// ─── Interned State ───────────────────────────────────────────────────────────

/// Content-derived identity of a [`RenderState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RenderStateId(pub(crate) u64);

impl RenderStateId {
    #[inline]
    #[must_use]
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Immutable, interned render state. Obtain through [`RenderStateCache`].
#[derive(Debug, PartialEq, Eq)]
pub struct RenderState {
    id: RenderStateId,
    descriptor: RenderStateDescriptor,
}

impl RenderState {
    #[inline]
    #[must_use]
    pub fn id(&self) -> RenderStateId {
        self.id
    }

    /// Copy of the configuration, ready to be modified and re-interned.
    #[inline]
    #[must_use]
    pub fn descriptor(&self) -> RenderStateDescriptor {
        self.descriptor
    }
}

/// Interning table that owns every distinct [`RenderState`].
#[derive(Debug, Default)]
pub struct RenderStateCache {
    states: FxHashMap<RenderStateDescriptor, Arc<RenderState>>,
}

impl RenderStateCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the shared state for `descriptor`, creating it on first use.
    pub fn intern(&mut self, descriptor: RenderStateDescriptor) -> Arc<RenderState> {
        self.states
            .entry(descriptor)
            .or_insert_with(|| {
                Arc::new(RenderState {
                    id: descriptor.compute_id(),
                    descriptor,
                })
            })
            .clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Drops every interned state. States still referenced elsewhere stay
    /// alive but will no longer be shared with new interns.
    pub fn clear(&mut self) {
        self.states.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_shares_equal_content() {
        let mut cache = RenderStateCache::new();
        let a = cache.intern(RenderStateDescriptor::default());
        let b = cache.intern(RenderStateDescriptor::default());

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.id(), b.id());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_different_content_different_id() {
        let mut cache = RenderStateCache::new();
        let a = cache.intern(RenderStateDescriptor::default());
        let b = cache.intern(RenderStateDescriptor {
            depth_mask: true,
            ..Default::default()
        });

        assert_ne!(a.id(), b.id());
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_descriptor_round_trip() {
        let mut cache = RenderStateCache::new();
        let desc = RenderStateDescriptor {
            blending: BlendingState::alpha_blend(),
            cull: CullState {
                enabled: true,
                face: wgpu::Face::Front,
            },
            ..Default::default()
        };
        let state = cache.intern(desc);
        assert_eq!(state.descriptor(), desc);
        assert!(state.descriptor().blending.to_wgpu().is_some());
    }

    #[test]
    fn test_color_mask_to_wgpu() {
        assert_eq!(ColorMask::ALL.to_wgpu(), wgpu::ColorWrites::ALL);
        assert_eq!(ColorMask::NONE.to_wgpu(), wgpu::ColorWrites::empty());
        let rg = ColorMask {
            blue: false,
            alpha: false,
            ..ColorMask::ALL
        };
        assert_eq!(rg.to_wgpu(), wgpu::ColorWrites::RED | wgpu::ColorWrites::GREEN);
    }
}
