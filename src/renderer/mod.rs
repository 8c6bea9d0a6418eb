//! Renderer Module
//!
//! Derives auxiliary-pass variants of draw commands:
//!
//! - [`program`]: content-addressed shader programs
//! - [`command`]: the draw command consumed by every pass
//! - [`purpose`]: interned tags naming a derivation purpose
//! - [`shader_cache`]: `(base program, purpose)` to derived program
//! - [`state_cache`]: `(base render state, purpose)` to derived render state
//! - [`context`]: the owner of all shared caches
//! - [`derive`]: the rewrite rules and the memoizing facade
//!
//! ```rust,ignore
//! use shader_variants::renderer::{Context, DerivedCommand, DerivedCommands};
//!
//! let mut ctx = Context::default();
//! let mut slots = DerivedCommands::new();
//! let depth = DerivedCommand::create_depth_only_command(&mut ctx, &command, &mut slots.depth_only);
//! ```

pub mod command;
pub mod context;
pub mod derive;
pub mod program;
pub mod purpose;
pub mod settings;
pub mod shader_cache;
pub mod state_cache;

pub use command::{DrawCommand, PickId, VertexArrayId};
pub use context::{Context, FrameState};
pub use derive::{DerivationResult, DerivedCommand, DerivedCommands};
pub use program::{AttributeLocations, ProgramId, ShaderProgram};
pub use purpose::PurposeTag;
pub use settings::DerivationSettings;
pub use shader_cache::{DerivedSources, ShaderCache, ShaderCacheStats};
pub use state_cache::{RenderStateVariantCache, StatePurpose};
