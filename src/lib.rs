#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod errors;
pub mod renderer;
pub mod resources;
pub mod utils;

pub use errors::{Result, VariantError};
pub use renderer::{
    Context, DerivationResult, DerivationSettings, DerivedCommand, DerivedCommands, DrawCommand,
    FrameState, PickId, ProgramId, PurposeTag, ShaderProgram,
};
pub use resources::{
    MetadataClassProperty, MetadataType, PickedMetadataInfo, RenderState, RenderStateDescriptor,
    ShaderDefines, ShaderSource,
};
pub use utils::interner;
