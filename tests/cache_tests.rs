//! Shared Cache Tests
//!
//! Tests for:
//! - Program identity and variant sharing across drawables
//! - Render-state variant interning
//! - ShaderCache insert policies and statistics
//! - Context lifecycle (clear)

use std::sync::Arc;

use shader_variants::interner;
use shader_variants::renderer::program::AttributeLocations;
use shader_variants::renderer::{
    Context, DerivedCommand, DerivedSources, DrawCommand, FrameState, PickId, PurposeTag,
    ShaderCache, ShaderProgram, StatePurpose,
};
use shader_variants::resources::{
    BlendingState, CullState, RenderStateDescriptor, ShaderDefines, ShaderSource,
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn program(fs: &str) -> Arc<ShaderProgram> {
    ShaderProgram::shared(
        ShaderSource::from_fragments(["void main() \n{\n    gl_Position = vec4(0.0);\n}\n"]),
        ShaderSource::from_fragments([fs]),
        AttributeLocations::from([("position".to_owned(), 0)]),
    )
}

// ============================================================================
// Program Identity
// ============================================================================

#[test]
fn equal_sources_share_program_id() {
    let a = program("void main() { out_FragColor = u_color; }");
    let b = program("void main() { out_FragColor = u_color; }");
    let c = program("void main() { out_FragColor = u_tint; }");

    assert!(!Arc::ptr_eq(&a, &b));
    assert_eq!(a.id(), b.id());
    assert_ne!(a.id(), c.id());
}

#[test]
fn defines_and_attributes_affect_program_id() {
    let fs = ShaderSource::from_fragments(["void main() {}"]);
    let vs = ShaderSource::from_fragments(["void main() {}"]);

    let plain = ShaderProgram::new(vs.clone(), fs.clone(), AttributeLocations::new());
    let defined = ShaderProgram::new(
        vs.clone(),
        fs.clone().with_defines(ShaderDefines::from(&["HDR"][..])),
        AttributeLocations::new(),
    );
    let bound = ShaderProgram::new(
        vs,
        fs,
        AttributeLocations::from([("normal".to_owned(), 1)]),
    );

    assert_ne!(plain.id(), defined.id());
    assert_ne!(plain.id(), bound.id());
}

// ============================================================================
// Sharing Across Drawables
// ============================================================================

#[test]
fn drawables_share_derived_variants() {
    init_logger();
    let mut ctx = Context::default();
    let state = ctx.intern_render_state(RenderStateDescriptor::default());

    // Two drawables built independently from identical sources
    let a = DrawCommand::new(program("void main() { out_FragColor = u_color; }"), state.clone());
    let b = DrawCommand::new(program("void main() { out_FragColor = u_color; }"), state);

    let da = DerivedCommand::create_depth_only_command(&mut ctx, &a, &mut None).clone();
    let db = DerivedCommand::create_depth_only_command(&mut ctx, &b, &mut None).clone();

    assert!(Arc::ptr_eq(&da.shader_program, &db.shader_program));
    assert!(Arc::ptr_eq(&da.render_state, &db.render_state));

    let stats = ctx.shader_cache().stats();
    assert_eq!(stats.created, 1);
    assert_eq!(stats.hits, 1);
}

#[test]
fn switching_back_costs_no_compilation() {
    init_logger();
    let mut ctx = Context::default();
    let state = ctx.intern_render_state(RenderStateDescriptor::default());
    let first = program("void main() { out_FragColor = u_color; }");
    let second = program("void main() { out_FragColor = u_tint; }");
    let mut cmd = DrawCommand::new(first.clone(), state);
    let mut slot = None;

    for base in [&first, &second, &first, &second] {
        cmd.shader_program = (*base).clone();
        DerivedCommand::create_hdr_command(&mut ctx, &cmd, &mut slot);
    }

    let stats = ctx.shader_cache().stats();
    assert_eq!(stats.created, 2);
    assert_eq!(stats.misses, 2);
    assert_eq!(stats.hits, 2);
}

// ============================================================================
// Render-State Variants
// ============================================================================

#[test]
fn state_variants_preserve_unrelated_fields() {
    init_logger();
    let mut ctx = Context::default();
    let base = ctx.intern_render_state(RenderStateDescriptor {
        blending: BlendingState::alpha_blend(),
        cull: CullState {
            enabled: true,
            face: wgpu::Face::Front,
        },
        ..Default::default()
    });
    let cmd = DrawCommand::new(program("void main() { out_FragColor = u_color; }"), base.clone());

    let depth = DerivedCommand::create_depth_only_command(&mut ctx, &cmd, &mut None).clone();
    let pick = DerivedCommand::create_pick_command(&mut ctx, &FrameState::default(), &cmd, &mut None)
        .clone();

    assert_eq!(depth.render_state.descriptor().cull, base.descriptor().cull);
    assert_eq!(pick.render_state.descriptor().cull, base.descriptor().cull);
    assert!(depth.render_state.descriptor().blending.enabled);
    assert!(!pick.render_state.descriptor().blending.enabled);

    let variants = ctx.state_variants();
    assert_eq!(variants.len(StatePurpose::DepthOnly), 1);
    assert_eq!(variants.len(StatePurpose::Pick), 1);
    assert!(variants.get(&base, StatePurpose::Pick).is_some());
}

#[test]
fn base_state_change_rederives_state() {
    init_logger();
    let mut ctx = Context::default();
    let opaque = ctx.intern_render_state(RenderStateDescriptor::default());
    let culled = ctx.intern_render_state(RenderStateDescriptor {
        cull: CullState {
            enabled: true,
            face: wgpu::Face::Back,
        },
        ..Default::default()
    });
    let mut cmd = DrawCommand::new(program("void main() { out_FragColor = u_color; }"), opaque);
    let mut slot = None;

    DerivedCommand::create_depth_only_command(&mut ctx, &cmd, &mut slot);
    cmd.render_state = culled;
    let derived = DerivedCommand::create_depth_only_command(&mut ctx, &cmd, &mut slot);

    assert!(derived.render_state.descriptor().cull.enabled);
    assert_eq!(ctx.shader_cache().stats().created, 1);
}

// ============================================================================
// ShaderCache Policies
// ============================================================================

#[test]
fn create_replaces_existing_entry() {
    init_logger();
    let mut cache = ShaderCache::new();
    let base = program("void main() { out_FragColor = u_color; }");
    let tag = PurposeTag::new("outline").unwrap();

    let mut sources = DerivedSources::from_program(&base);
    sources.fragment.defines_mut().push("OUTLINE");
    let first = cache.create(&base, tag.clone(), sources.clone());
    sources.fragment.defines_mut().push("WIDE");
    let second = cache.create(&base, tag.clone(), sources);

    assert_ne!(first.id(), second.id());
    assert_eq!(cache.get(base.id(), &tag).map(|p| p.id()), Some(second.id()));
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.stats().created, 2);
}

#[test]
fn get_or_create_keeps_first_winner() {
    let mut cache = ShaderCache::new();
    let base = program("void main() { out_FragColor = u_color; }");
    let tag = PurposeTag::new("outline").unwrap();

    let first = cache.get_or_create(&base, tag.clone(), DerivedSources::from_program);
    let second = cache.get_or_create(&base, tag, |_| unreachable!("cached variant expected"));

    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn get_does_not_touch_stats() {
    let cache = ShaderCache::new();
    let base = program("void main() {}");
    assert!(cache.get(base.id(), &PurposeTag::hdr()).is_none());
    assert_eq!(cache.stats().hits + cache.stats().misses, 0);
}

// ============================================================================
// Lifecycle
// ============================================================================

#[test]
fn clear_drops_variants_but_not_live_commands() {
    init_logger();
    let mut ctx = Context::default();
    let state = ctx.intern_render_state(RenderStateDescriptor::default());
    let cmd = DrawCommand::new(program("void main() { out_FragColor = u_color; }"), state);
    let mut slot = None;

    let before = DerivedCommand::create_hdr_command(&mut ctx, &cmd, &mut slot)
        .shader_program
        .clone();
    ctx.clear();
    assert!(ctx.shader_cache().is_empty());

    // Slot still memoizes the old variant
    let kept = DerivedCommand::create_hdr_command(&mut ctx, &cmd, &mut slot)
        .shader_program
        .clone();
    assert!(Arc::ptr_eq(&before, &kept));

    // A fresh slot re-derives an equal program
    let fresh = DerivedCommand::create_hdr_command(&mut ctx, &cmd, &mut None)
        .shader_program
        .clone();
    assert!(!Arc::ptr_eq(&before, &fresh));
    assert_eq!(before.id(), fresh.id());
    assert_eq!(ctx.shader_cache().stats().created, 1);
}

#[test]
fn per_drawable_tags_are_released_by_clear() {
    init_logger();
    let mut ctx = Context::default();
    let state = ctx.intern_render_state(RenderStateDescriptor::default());
    let base = program("void main() { out_FragColor = u_color; }");
    let frame = FrameState::default();

    for key in 0..100 {
        let cmd = DrawCommand::new(base.clone(), state.clone()).with_pick_id(PickId::from_key(key));
        DerivedCommand::create_pick_command(&mut ctx, &frame, &cmd, &mut None);
    }
    assert_eq!(ctx.shader_cache().len(), 100);

    let tag = PurposeTag::pick(false, PickId::from_key(42).as_str());
    assert!(ctx.shader_cache().get(base.id(), &tag).is_some());
    assert!(interner::get(tag.as_str()).is_none());

    ctx.clear();
    assert!(ctx.shader_cache().get(base.id(), &tag).is_none());
    assert!(ctx.shader_cache().is_empty());
}
