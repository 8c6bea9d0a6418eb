//! Global String Interner
//!
//! Turns shader-template define tokens into compact integer [`Symbol`]s so
//! that define lists compare and hash as integers. Only the fixed template
//! vocabulary is interned; per-drawable strings are owned by their caches. Backed by a lasso
//! `ThreadedRodeo`, so interning is safe from any thread.

use std::sync::LazyLock;

use lasso::{Spur, ThreadedRodeo};

static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::new);

/// Compact integer handle for an interned string.
pub type Symbol = Spur;

/// Interns a string, returning the existing symbol when already present.
#[inline]
pub fn intern(s: &str) -> Symbol {
    INTERNER.get_or_intern(s)
}

/// Looks up a string without interning it.
#[inline]
pub fn get(s: &str) -> Option<Symbol> {
    INTERNER.get(s)
}

/// Resolves a symbol back to its string.
#[inline]
pub fn resolve(sym: Symbol) -> &'static str {
    INTERNER.resolve(&sym)
}

/// Pre-interns the define tokens pushed by the built-in derivation rules,
/// keeping the per-frame path free of interner writes.
pub fn preload_common_tokens() {
    let common = [
        // Log depth
        "LOG_DEPTH",
        "LOG_DEPTH_WRITE",
        "LOG_DEPTH_READ_ONLY",
        // HDR
        "HDR",
        // Metadata picking placeholders
        "METADATA_PICKING_ENABLED",
        "METADATA_PICKING_VALUE_TYPE",
        "METADATA_PICKING_VALUE_STRING",
        "METADATA_PICKING_VALUE_COMPONENT_X",
        "METADATA_PICKING_VALUE_COMPONENT_Y",
        "METADATA_PICKING_VALUE_COMPONENT_Z",
        "METADATA_PICKING_VALUE_COMPONENT_W",
    ];

    for name in common {
        intern(name);
    }
}
