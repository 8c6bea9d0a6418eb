//! Derivation Rules
//!
//! Pure functions from a base [`ShaderProgram`] to the sources of one
//! derived variant. Every rule starts from the *base* program; variants never
//! stack on top of each other.
//!
//! | Rule | Vertex | Fragment |
//! |------|--------|----------|
//! | [`depth_only`] | unchanged | constant pass-through, or unchanged if it writes depth / discards |
//! | [`log_depth`] | `LOG_DEPTH`, wrapped `main` | `LOG_DEPTH`, wrapped `main` |
//! | [`pick`] | unchanged | wrapped `main` overwriting the color output with the pick id |
//! | [`pick_metadata`] | unchanged | placeholder defines filled in |
//! | [`hdr`] | `HDR` | `HDR` |

use crate::renderer::command::PickId;
use crate::renderer::program::ShaderProgram;
use crate::renderer::settings::DerivationSettings;
use crate::renderer::shader_cache::DerivedSources;
use crate::resources::metadata::{
    METADATA_PICKING_ENABLED, METADATA_PICKING_VALUE_COMPONENTS, METADATA_PICKING_VALUE_STRING,
    METADATA_PICKING_VALUE_TYPE, MetadataPacking, PickedMetadataInfo,
};
use crate::resources::shader_defines::ShaderDefines;
use crate::resources::shader_source::ShaderSource;

// ─── Shader Vocabulary ────────────────────────────────────────────────────────

pub const LOG_DEPTH: &str = "LOG_DEPTH";
/// The fragment stage writes log depth by other means; don't wrap it.
pub const LOG_DEPTH_WRITE: &str = "LOG_DEPTH_WRITE";
/// The fragment stage only reads depth; log-depth derivation is a no-op.
pub const LOG_DEPTH_READ_ONLY: &str = "LOG_DEPTH_READ_ONLY";
pub const HDR: &str = "HDR";

const FRAG_DEPTH: &str = "gl_FragDepth";
const DISCARD: &str = "discard";
const VERTEX_LOG_DEPTH_CALL: &str = "czm_vertexLogDepth";
const WRITE_LOG_DEPTH_CALL: &str = "czm_writeLogDepth";
const LOG_DEPTH_MAIN: &str = "czm_log_depth_main";
const NON_PICK_MAIN: &str = "czm_non_pick_main";
const FRAG_DATA: &str = "out_FragData";
const FRAG_DATA_0: &str = "out_FragData_0";
const FRAG_COLOR: &str = "out_FragColor";

const DEPTH_ONLY_PASS_THROUGH: &str = "void main() \n{ \n    out_FragColor = vec4(1.0); \n} \n";

const DEPTH_ONLY_PASS_THROUGH_LOG_DEPTH: &str = "void main() \n{ \n    out_FragColor = vec4(1.0); \n    czm_writeLogDepth(); \n} \n";

const LOG_DEPTH_VERTEX_MAIN: &str = "\n\nvoid main() \n{ \n    czm_log_depth_main(); \n    czm_vertexLogDepth(); \n} \n";

const LOG_DEPTH_FRAGMENT_MAIN: &str = "\nvoid main() \n{ \n    czm_log_depth_main(); \n    czm_writeLogDepth(); \n} \n";

// ─── Rules ────────────────────────────────────────────────────────────────────

/// Depth-only variant.
///
/// A fragment stage that neither writes `gl_FragDepth` nor discards is
/// replaced by a constant-color pass-through, which also writes log depth
/// when either stage declares `LOG_DEPTH`. Otherwise the base fragment
/// source is kept: its depth logic must stay intact.
#[must_use]
pub fn depth_only(program: &ShaderProgram, settings: &DerivationSettings) -> DerivedSources {
    let fs = program.fragment_source();

    let writes_depth_or_discards =
        fs.any_fragment_contains_word(FRAG_DEPTH) || fs.any_fragment_contains_word(DISCARD);

    let uses_log_depth =
        fs.defines().contains(LOG_DEPTH) || program.vertex_source().defines().contains(LOG_DEPTH);

    let fragment = if writes_depth_or_discards || !settings.depth_only_pass_through {
        fs.clone()
    } else if uses_log_depth {
        ShaderSource::from_fragments([DEPTH_ONLY_PASS_THROUGH_LOG_DEPTH])
            .with_defines(ShaderDefines::from(&[LOG_DEPTH][..]))
    } else {
        ShaderSource::from_fragments([DEPTH_ONLY_PASS_THROUGH])
    };

    DerivedSources {
        vertex: program.vertex_source().clone(),
        fragment,
        attribute_locations: program.attribute_locations().clone(),
    }
}

/// `true` when the fragment stage declares `LOG_DEPTH_READ_ONLY`.
#[must_use]
pub fn is_log_depth_read_only(program: &ShaderProgram) -> bool {
    program.fragment_source().defines().contains(LOG_DEPTH_READ_ONLY)
}

/// Logarithmic-depth variant, or `None` when the fragment stage declares
/// `LOG_DEPTH_READ_ONLY` (the base program is used as is).
///
/// Both stages gain `LOG_DEPTH`. A stage whose own code does not already
/// call the log-depth write routine has its `main` renamed and wrapped by a
/// new `main` that calls it.
#[must_use]
pub fn log_depth(program: &ShaderProgram) -> Option<DerivedSources> {
    if is_log_depth_read_only(program) {
        return None;
    }

    let mut vs = program.vertex_source().clone();
    let mut fs = program.fragment_source().clone();
    vs.defines_mut().push(LOG_DEPTH);
    fs.defines_mut().push(LOG_DEPTH);

    if !vs.any_fragment_calls(VERTEX_LOG_DEPTH_CALL) {
        vs.rename_entry_point_in_place(LOG_DEPTH_MAIN);
        vs.append_fragment(LOG_DEPTH_VERTEX_MAIN);
    }

    let writes_log_depth =
        fs.any_fragment_calls(WRITE_LOG_DEPTH_CALL) || fs.defines().contains(LOG_DEPTH_WRITE);

    if writes_log_depth {
        // Keep the fragment count stable across both branches.
        fs.append_fragment("");
    } else {
        fs.rename_entry_point_in_place(LOG_DEPTH_MAIN);
        fs.append_fragment(LOG_DEPTH_FRAGMENT_MAIN);
    }

    Some(DerivedSources {
        vertex: vs,
        fragment: fs,
        attribute_locations: program.attribute_locations().clone(),
    })
}

/// Name of the fragment output a pick variant overwrites.
#[must_use]
pub fn pick_output(fragment: &ShaderSource) -> &'static str {
    if fragment.fragments().iter().any(|f| f.contains(FRAG_DATA)) {
        FRAG_DATA_0
    } else {
        FRAG_COLOR
    }
}

/// Pick variant: the base `main` runs first, then the color output is
/// overwritten with `pick_id`.
///
/// Fully transparent fragments are discarded beforehand unless the pick
/// serves metadata extraction (which wants full coverage) or
/// `discard_transparent` is off.
#[must_use]
pub fn pick(
    program: &ShaderProgram,
    pick_id: &PickId,
    picking_metadata: bool,
    discard_transparent: bool,
) -> DerivedSources {
    let base_fs = program.fragment_source();
    let output = pick_output(base_fs);
    let pick_id = pick_id.as_str();

    let new_main = if picking_metadata || !discard_transparent {
        format!("void main () \n{{ \n    {NON_PICK_MAIN}(); \n    {output} = {pick_id}; \n}} ")
    } else {
        format!(
            "void main () \n{{ \n    {NON_PICK_MAIN}(); \n    if ({output}.a == 0.0) {{ \n        discard; \n    }} \n    {output} = {pick_id}; \n}} "
        )
    };

    let mut fragments = base_fs.rename_entry_point(NON_PICK_MAIN);
    fragments.push(new_main);

    DerivedSources {
        vertex: program.vertex_source().clone(),
        fragment: ShaderSource::new(fragments, base_fs.defines().clone()),
        attribute_locations: program.attribute_locations().clone(),
    }
}

/// Metadata pick variant: enables the metadata picking template and fills
/// its placeholder defines for the picked property. Fragment text is
/// untouched.
#[must_use]
pub fn pick_metadata(program: &ShaderProgram, info: &PickedMetadataInfo) -> DerivedSources {
    let property = info.class_property();
    let channels = MetadataPacking::channel_expressions(property);

    let mut fs = program.fragment_source().clone();
    fs.defines_mut().push(METADATA_PICKING_ENABLED);
    fs.replace_define(
        METADATA_PICKING_VALUE_TYPE,
        MetadataPacking::glsl_type(property),
    );
    fs.replace_define(
        METADATA_PICKING_VALUE_STRING,
        &MetadataPacking::value_access(info),
    );
    for (name, expression) in METADATA_PICKING_VALUE_COMPONENTS.iter().zip(&channels) {
        fs.replace_define(name, expression);
    }

    DerivedSources {
        vertex: program.vertex_source().clone(),
        fragment: fs,
        attribute_locations: program.attribute_locations().clone(),
    }
}

/// HDR variant: `HDR` defined in both stages.
#[must_use]
pub fn hdr(program: &ShaderProgram) -> DerivedSources {
    let mut sources = DerivedSources::from_program(program);
    sources.vertex.defines_mut().push(HDR);
    sources.fragment.defines_mut().push(HDR);
    sources
}
