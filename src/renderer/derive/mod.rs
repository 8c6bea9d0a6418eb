//! Command Derivation
//!
//! - [`rules`]: pure source-to-source rewrite rules, one per purpose
//! - [`facade`]: per-drawable memoized entry points over the shared caches

pub mod facade;
pub mod rules;

pub use facade::{DerivationResult, DerivedCommand, DerivedCommands};
