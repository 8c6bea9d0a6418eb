//! Resource Module
//!
//! CPU-side descriptions that derivation operates on:
//!
//! - [`ShaderSource`] / [`ShaderDefines`]: one shader stage as text fragments
//!   plus define tokens
//! - [`shader_text`]: the fixed GLSL text patterns used by the rewrite rules
//! - [`RenderState`]: content-addressed render state and its interning cache
//! - [`metadata`]: metadata property descriptors and the RGBA packing codec

pub mod metadata;
pub mod render_state;
pub mod shader_defines;
pub mod shader_source;
pub mod shader_text;

pub use metadata::{MetadataClassProperty, MetadataPacking, MetadataType, PickedMetadataInfo};
pub use render_state::{
    BlendComponent, BlendingState, ColorMask, CullState, DepthTestState, RenderState, RenderStateCache,
    RenderStateDescriptor, RenderStateId,
};
pub use shader_defines::ShaderDefines;
pub use shader_source::ShaderSource;
