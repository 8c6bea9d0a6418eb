//! Draw commands.
//!
//! A [`DrawCommand`] references its program and render state through `Arc`s,
//! so cloning a command is shallow: the derived command of a pass shares
//! geometry and identity fields with its base and swaps only the program
//! and state.

use std::sync::Arc;

use crate::errors::{Result, VariantError};
use crate::resources::metadata::PickedMetadataInfo;
use crate::resources::render_state::RenderState;

use super::program::ShaderProgram;

/// Handle to a vertex array owned by the GPU layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexArrayId(pub u64);

/// GLSL expression producing the pick color of a drawable, typically the
/// name of a uniform or varying (`czm_pickColor`, `v_pickColor`) or a
/// literal `vec4(...)` built by [`PickId::from_key`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PickId(String);

impl PickId {
    /// The expression must be a single whitespace-free token.
    pub fn new(expression: impl Into<String>) -> Result<Self> {
        let expression = expression.into();
        if expression.is_empty() || expression.chars().any(|c| c.is_whitespace() || c.is_control())
        {
            return Err(VariantError::InvalidPickId(expression));
        }
        Ok(Self(expression))
    }

    /// Literal color encoding `key` as RGBA bytes (little-endian).
    #[must_use]
    pub fn from_key(key: u32) -> Self {
        let [r, g, b, a] = Self::key_to_rgba(key);
        let channel = |v: u8| f32::from(v) / 255.0;
        Self(format!(
            "vec4({:.6},{:.6},{:.6},{:.6})",
            channel(r),
            channel(g),
            channel(b),
            channel(a)
        ))
    }

    #[inline]
    #[must_use]
    pub fn key_to_rgba(key: u32) -> [u8; 4] {
        key.to_le_bytes()
    }

    /// Inverse of [`key_to_rgba`](Self::key_to_rgba), used when resolving a
    /// frame-buffer readback.
    #[inline]
    #[must_use]
    pub fn rgba_to_key(rgba: [u8; 4]) -> u32 {
        u32::from_le_bytes(rgba)
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for PickId {
    fn default() -> Self {
        Self("czm_pickColor".to_owned())
    }
}

/// One draw submission.
#[derive(Debug, Clone)]
pub struct DrawCommand {
    pub shader_program: Arc<ShaderProgram>,
    pub render_state: Arc<RenderState>,
    pub primitive_type: wgpu::PrimitiveTopology,
    pub vertex_array: Option<VertexArrayId>,
    pub offset: u32,
    /// `None` draws every vertex of the bound array.
    pub count: Option<u32>,
    pub instance_count: u32,
    pub cast_shadows: bool,
    pub receive_shadows: bool,
    pub pick_id: Option<PickId>,
    pub picked_metadata_info: Option<Arc<PickedMetadataInfo>>,
}

impl DrawCommand {
    #[must_use]
    pub fn new(shader_program: Arc<ShaderProgram>, render_state: Arc<RenderState>) -> Self {
        Self {
            shader_program,
            render_state,
            primitive_type: wgpu::PrimitiveTopology::TriangleList,
            vertex_array: None,
            offset: 0,
            count: None,
            instance_count: 1,
            cast_shadows: false,
            receive_shadows: false,
            pick_id: None,
            picked_metadata_info: None,
        }
    }

    #[must_use]
    pub fn with_pick_id(mut self, pick_id: PickId) -> Self {
        self.pick_id = Some(pick_id);
        self
    }

    #[must_use]
    pub fn with_picked_metadata(mut self, info: Arc<PickedMetadataInfo>) -> Self {
        self.picked_metadata_info = Some(info);
        self
    }
}
