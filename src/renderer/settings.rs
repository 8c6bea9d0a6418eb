//! Derivation Settings
//!
//! Knobs that change what the derivation rules emit. Settings are owned by
//! the [`Context`](super::context::Context) and apply to every variant it
//! creates. Changing settings on a live context does not invalidate variants
//! that were already cached; call [`Context::clear`] after a change.
//!
//! ```rust,ignore
//! use shader_variants::renderer::{Context, DerivationSettings};
//!
//! let ctx = Context::new(DerivationSettings {
//!     dump_derived_sources: true,
//!     ..Default::default()
//! });
//! ```
//!
//! [`Context::clear`]: super::context::Context::clear

/// Configuration for derived shader generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerivationSettings {
    /// Replace the fragment stage of depth-only variants with a constant
    /// pass-through when the base shader neither writes depth nor discards.
    ///
    /// When `false`, depth-only variants always keep the base fragment
    /// source; color writes are still masked off by the render state.
    pub depth_only_pass_through: bool,

    /// Discard fully transparent fragments in (non-metadata) pick variants,
    /// so only visibly drawn pixels register as pickable.
    pub pick_discard_transparent: bool,

    /// Log the combined fragment text of every newly created variant at
    /// `debug` level.
    pub dump_derived_sources: bool,
}

impl Default for DerivationSettings {
    fn default() -> Self {
        Self {
            depth_only_pass_through: true,
            pick_discard_transparent: true,
            dump_derived_sources: false,
        }
    }
}
