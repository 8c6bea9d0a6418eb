//! Command Derivation Facade
//!
//! Per-purpose entry points that turn a base [`DrawCommand`] into the
//! command submitted by an auxiliary pass. All of them follow the same
//! contract:
//!
//! 1. The caller owns one [`DerivationResult`] slot per purpose per drawable
//!    (see [`DerivedCommands`]) and passes it in every frame.
//! 2. The base command is always cloned into the slot, so geometry and
//!    identity fields reflect the current frame.
//! 3. The slot is keyed by the base program id, the base render-state id and
//!    the purpose tag the variant was resolved for. The tag carries every
//!    other input a variant depends on (pick id, alpha-test policy, picked
//!    property). If any key part differs, or the purpose's trigger fires,
//!    the program and state are resolved through the shared caches and the
//!    new key is recorded.
//! 4. Otherwise the program and state stored in the slot are reused without
//!    touching any cache.
//!
//! With a stable base program, step 4 makes per-frame derivation O(1). When
//! the base changes to a program some other drawable already derived from,
//! step 3 costs one cache lookup and no compilation.

use std::sync::Arc;

use super::rules;
use crate::renderer::command::DrawCommand;
use crate::renderer::context::{Context, FrameState};
use crate::renderer::program::{ProgramId, ShaderProgram};
use crate::renderer::purpose::PurposeTag;
use crate::renderer::shader_cache::DerivedSources;
use crate::renderer::state_cache::StatePurpose;
use crate::resources::render_state::{RenderState, RenderStateId};

/// Caller-owned memo for one purpose of one drawable.
#[derive(Debug, Clone)]
pub struct DerivationResult {
    command: DrawCommand,
    source_program_id: ProgramId,
    source_render_state_id: RenderStateId,
    purpose: Option<PurposeTag>,
}

impl DerivationResult {
    /// The derived command, ready for submission.
    #[inline]
    #[must_use]
    pub fn command(&self) -> &DrawCommand {
        &self.command
    }

    /// Id of the base program the derived command was resolved from.
    #[inline]
    #[must_use]
    pub fn source_program_id(&self) -> ProgramId {
        self.source_program_id
    }

    /// Id of the base render state the derived command was resolved from.
    #[inline]
    #[must_use]
    pub fn source_render_state_id(&self) -> RenderStateId {
        self.source_render_state_id
    }

    /// Tag the program was resolved for; `None` when the base program is
    /// submitted unchanged.
    #[inline]
    #[must_use]
    pub fn purpose(&self) -> Option<&PurposeTag> {
        self.purpose.as_ref()
    }
}

/// All derivation slots of one drawable.
#[derive(Debug, Clone, Default)]
pub struct DerivedCommands {
    pub depth_only: Option<DerivationResult>,
    pub log_depth: Option<DerivationResult>,
    pub pick: Option<DerivationResult>,
    pub pick_metadata: Option<DerivationResult>,
    pub hdr: Option<DerivationResult>,
}

impl DerivedCommands {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Forgets every memoized command, forcing re-resolution next call.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// How a purpose treats the render state of the base command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StateMode {
    /// The derived command draws with the base state.
    Inherit,
    /// The derived command draws with a state from the variant cache.
    Override,
}

/// Resolved program plus, for [`StateMode::Override`], render state.
type Resolved = (Arc<ShaderProgram>, Option<Arc<RenderState>>);

/// Shared memoization step of every entry point.
fn memoize<'r, F>(
    result: &'r mut Option<DerivationResult>,
    command: &DrawCommand,
    purpose: Option<PurposeTag>,
    mode: StateMode,
    force: bool,
    resolve: F,
) -> &'r DrawCommand
where
    F: FnOnce() -> Resolved,
{
    let base_id = command.shader_program.id();
    let base_state_id = command.render_state.id();
    let mut derived = command.clone();

    match result.take() {
        Some(prev)
            if !force
                && prev.source_program_id == base_id
                && prev.source_render_state_id == base_state_id
                && prev.purpose == purpose =>
        {
            log::trace!("Reusing derived command for base program {base_id}");
            derived.shader_program = prev.command.shader_program;
            if mode == StateMode::Override {
                derived.render_state = prev.command.render_state;
            }
        }
        _ => {
            let (program, state) = resolve();
            derived.shader_program = program;
            if let Some(state) = state {
                derived.render_state = state;
            }
        }
    }

    &result
        .insert(DerivationResult {
            command: derived,
            source_program_id: base_id,
            source_render_state_id: base_state_id,
            purpose,
        })
        .command
}

/// Looks up or derives the `tag` variant of `base` with `rule`.
fn derived_program<F>(
    ctx: &mut Context,
    base: &ShaderProgram,
    tag: PurposeTag,
    rule: F,
) -> Arc<ShaderProgram>
where
    F: FnOnce(&ShaderProgram) -> DerivedSources,
{
    let dump = ctx.settings().dump_derived_sources;
    let label = dump.then(|| tag.clone());
    ctx.shader_cache_mut().get_or_create(base, tag, |program| {
        let sources = rule(program);
        if let Some(label) = label {
            log::debug!(
                "================= Derived Fragment Shader {label} ==================\n{}",
                sources.fragment.combined()
            );
        }
        sources
    })
}

fn derived_state(ctx: &mut Context, base: &RenderState, purpose: StatePurpose) -> Arc<RenderState> {
    let (states, variants) = ctx.render_state_caches_mut();
    variants.get_or_create(states, base, purpose)
}

/// Entry points, one per purpose.
pub struct DerivedCommand;

impl DerivedCommand {
    /// Depth-only pass: pass-through fragment stage (when safe), depth
    /// writes on, color writes off.
    pub fn create_depth_only_command<'r>(
        ctx: &mut Context,
        command: &DrawCommand,
        result: &'r mut Option<DerivationResult>,
    ) -> &'r DrawCommand {
        let tag = PurposeTag::depth_only();
        memoize(result, command, Some(tag.clone()), StateMode::Override, false, || {
            let settings = *ctx.settings();
            let program = derived_program(ctx, &command.shader_program, tag, |base| {
                rules::depth_only(base, &settings)
            });
            let state = derived_state(ctx, &command.render_state, StatePurpose::DepthOnly);
            (program, Some(state))
        })
    }

    /// Logarithmic-depth variant. The render state is the base command's.
    ///
    /// Programs whose fragment stage is read-only for depth are returned as
    /// the base program itself.
    pub fn create_log_depth_command<'r>(
        ctx: &mut Context,
        command: &DrawCommand,
        result: &'r mut Option<DerivationResult>,
    ) -> &'r DrawCommand {
        let base = &command.shader_program;
        let tag = (!rules::is_log_depth_read_only(base)).then(PurposeTag::log_depth);
        memoize(result, command, tag.clone(), StateMode::Inherit, false, || {
            let program = match tag {
                Some(tag) => derived_program(ctx, base, tag, |p| {
                    rules::log_depth(p).unwrap_or_else(|| DerivedSources::from_program(p))
                }),
                None => base.clone(),
            };
            (program, None)
        })
    }

    /// Pick pass: the color output is replaced by the command's pick id.
    ///
    /// The regular and metadata-frame variants differ in alpha testing, so a
    /// slot switches between them as [`FrameState::picking_metadata`]
    /// toggles. A changed pick id also selects a new variant.
    pub fn create_pick_command<'r>(
        ctx: &mut Context,
        frame: &FrameState,
        command: &DrawCommand,
        result: &'r mut Option<DerivationResult>,
    ) -> &'r DrawCommand {
        let picking_metadata = frame.picking_metadata;
        let pick_id = command.pick_id.clone().unwrap_or_default();
        let tag = PurposeTag::pick(picking_metadata, pick_id.as_str());
        memoize(
            result,
            command,
            Some(tag.clone()),
            StateMode::Override,
            picking_metadata,
            || {
                let discard_transparent = ctx.settings().pick_discard_transparent;
                let program = derived_program(ctx, &command.shader_program, tag, |base| {
                    rules::pick(base, &pick_id, picking_metadata, discard_transparent)
                });
                let state = derived_state(ctx, &command.render_state, StatePurpose::Pick);
                (program, Some(state))
            },
        )
    }

    /// Metadata pick pass: renders the picked property's value as RGBA.
    ///
    /// Re-resolved on every call while the frame is picking metadata. A
    /// command without picked metadata info keeps its base program.
    pub fn create_pick_metadata_command<'r>(
        ctx: &mut Context,
        frame: &FrameState,
        command: &DrawCommand,
        result: &'r mut Option<DerivationResult>,
    ) -> &'r DrawCommand {
        let info = command.picked_metadata_info.as_deref();
        let tag = info.map(PurposeTag::pick_metadata);
        memoize(
            result,
            command,
            tag.clone(),
            StateMode::Override,
            frame.picking_metadata,
            || {
                let base = &command.shader_program;
                let program = match (tag, info) {
                    (Some(tag), Some(info)) => {
                        derived_program(ctx, base, tag, |p| rules::pick_metadata(p, info))
                    }
                    _ => {
                        log::warn!(
                            "Metadata pick requested for program {} without picked metadata info",
                            base.id()
                        );
                        base.clone()
                    }
                };
                let state = derived_state(ctx, &command.render_state, StatePurpose::Pick);
                (program, Some(state))
            },
        )
    }

    /// HDR variant. The render state is the base command's.
    pub fn create_hdr_command<'r>(
        ctx: &mut Context,
        command: &DrawCommand,
        result: &'r mut Option<DerivationResult>,
    ) -> &'r DrawCommand {
        let tag = PurposeTag::hdr();
        memoize(result, command, Some(tag.clone()), StateMode::Inherit, false, || {
            let program = derived_program(ctx, &command.shader_program, tag, rules::hdr);
            (program, None)
        })
    }

    /// Refreshes every slot of `slots`: depth only, log depth, HDR and pick
    /// always, metadata pick only while the frame is picking metadata and the
    /// command carries picked metadata info.
    pub fn derive_all(
        ctx: &mut Context,
        frame: &FrameState,
        command: &DrawCommand,
        slots: &mut DerivedCommands,
    ) {
        Self::create_depth_only_command(ctx, command, &mut slots.depth_only);
        Self::create_log_depth_command(ctx, command, &mut slots.log_depth);
        Self::create_hdr_command(ctx, command, &mut slots.hdr);
        Self::create_pick_command(ctx, frame, command, &mut slots.pick);
        if frame.picking_metadata && command.picked_metadata_info.is_some() {
            Self::create_pick_metadata_command(ctx, frame, command, &mut slots.pick_metadata);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::program::AttributeLocations;
    use crate::resources::render_state::RenderStateDescriptor;
    use crate::resources::shader_source::ShaderSource;

    fn command(ctx: &mut Context, fs: &str) -> DrawCommand {
        let program = ShaderProgram::shared(
            ShaderSource::from_fragments(["void main() \n{\n    gl_Position = vec4(0.0);\n}\n"]),
            ShaderSource::from_fragments([fs]),
            AttributeLocations::new(),
        );
        let state = ctx.intern_render_state(RenderStateDescriptor::default());
        DrawCommand::new(program, state)
    }

    #[test]
    fn test_memoized_slot_skips_cache() {
        let mut ctx = Context::default();
        let cmd = command(&mut ctx, "void main() { out_FragColor = vec4(1.0); }");
        let mut slot = None;

        let first = DerivedCommand::create_hdr_command(&mut ctx, &cmd, &mut slot)
            .shader_program
            .clone();
        let second = DerivedCommand::create_hdr_command(&mut ctx, &cmd, &mut slot)
            .shader_program
            .clone();

        assert!(Arc::ptr_eq(&first, &second));
        let stats = ctx.shader_cache().stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 0);
        assert_eq!(
            slot.as_ref().map(DerivationResult::source_program_id),
            Some(cmd.shader_program.id())
        );
    }

    #[test]
    fn test_inherited_state_follows_base() {
        let mut ctx = Context::default();
        let mut cmd = command(&mut ctx, "void main() { out_FragColor = vec4(1.0); }");
        let mut slot = None;
        DerivedCommand::create_hdr_command(&mut ctx, &cmd, &mut slot);

        cmd.render_state = ctx.intern_render_state(RenderStateDescriptor {
            depth_mask: true,
            ..Default::default()
        });
        let derived = DerivedCommand::create_hdr_command(&mut ctx, &cmd, &mut slot);

        assert!(Arc::ptr_eq(&derived.render_state, &cmd.render_state));
    }

    #[test]
    fn test_geometry_fields_track_base() {
        let mut ctx = Context::default();
        let mut cmd = command(&mut ctx, "void main() { out_FragColor = vec4(1.0); }");
        let mut slot = None;
        DerivedCommand::create_depth_only_command(&mut ctx, &cmd, &mut slot);

        cmd.count = Some(36);
        cmd.instance_count = 4;
        let derived = DerivedCommand::create_depth_only_command(&mut ctx, &cmd, &mut slot);

        assert_eq!(derived.count, Some(36));
        assert_eq!(derived.instance_count, 4);
        assert!(derived.render_state.descriptor().depth_mask);
    }

    #[test]
    fn test_metadata_pick_without_info_keeps_base_program() {
        let mut ctx = Context::default();
        let cmd = command(&mut ctx, "void main() { out_FragColor = vec4(1.0); }");
        let frame = FrameState {
            picking_metadata: true,
        };
        let mut slot = None;

        let derived =
            DerivedCommand::create_pick_metadata_command(&mut ctx, &frame, &cmd, &mut slot);

        assert!(Arc::ptr_eq(&derived.shader_program, &cmd.shader_program));
        assert!(!derived.render_state.descriptor().blending.enabled);
        assert!(ctx.shader_cache().is_empty());
    }

    #[test]
    fn test_slot_records_purpose() {
        let mut ctx = Context::default();
        let cmd = command(&mut ctx, "void main() { out_FragColor = vec4(1.0); }");
        let mut slot = None;

        DerivedCommand::create_pick_command(&mut ctx, &FrameState::default(), &cmd, &mut slot);
        let regular = slot.as_ref().and_then(DerivationResult::purpose).cloned();

        let frame = FrameState {
            picking_metadata: true,
        };
        DerivedCommand::create_pick_command(&mut ctx, &frame, &cmd, &mut slot);
        let metadata = slot.as_ref().and_then(DerivationResult::purpose).cloned();

        assert_eq!(regular, Some(PurposeTag::pick(false, "czm_pickColor")));
        assert_eq!(metadata, Some(PurposeTag::pick(true, "czm_pickColor")));

        // Back to a regular frame: the slot re-resolves instead of reusing
        DerivedCommand::create_pick_command(&mut ctx, &FrameState::default(), &cmd, &mut slot);
        assert_eq!(slot.as_ref().and_then(DerivationResult::purpose), regular.as_ref());
        assert_eq!(ctx.shader_cache().stats().hits, 1);
    }

    #[test]
    fn test_reset_forces_resolution() {
        let mut ctx = Context::default();
        let cmd = command(&mut ctx, "void main() { out_FragColor = vec4(1.0); }");
        let mut slots = DerivedCommands::new();

        DerivedCommand::derive_all(&mut ctx, &FrameState::default(), &cmd, &mut slots);
        assert!(slots.depth_only.is_some());
        assert!(slots.pick.is_some());
        assert!(slots.pick_metadata.is_none());

        slots.reset();
        DerivedCommand::derive_all(&mut ctx, &FrameState::default(), &cmd, &mut slots);

        let stats = ctx.shader_cache().stats();
        assert_eq!(stats.created, 4);
        assert_eq!(stats.hits, 4);
    }
}
