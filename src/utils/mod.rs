//! Utility Module
//!
//! - [`interner`]: String interning for shader-template define tokens
//!
//! Interned strings (Symbols) compare in O(1), which keeps define
//! lists cheap to compare and hash every frame.
//!
//! ```rust,ignore
//! use shader_variants::utils::interner;
//!
//! let a = interner::intern("LOG_DEPTH");
//! let b = interner::intern("LOG_DEPTH");
//! assert_eq!(a, b);
//! ```

pub mod interner;

pub use interner::Symbol;
