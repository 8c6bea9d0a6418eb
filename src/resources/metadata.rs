//! Metadata picking: property descriptors and the RGBA packing codec.
//!
//! Metadata picking renders the value of one typed property into the color
//! output instead of a pick id. The fragment template already declares a set
//! of placeholder defines ([`METADATA_PICKING_VALUE_TYPE`] and friends); the
//! codec computes what to substitute into them:
//!
//! - the GLSL type of the property value (`float`, `vecN`, `int`, `ivecN`)
//! - the access expression (`metadata.<property>`)
//! - one `float` expression per RGBA channel
//!
//! Values that are not already normalized are divided by 255 so that the
//! 8-bit channel read back from the frame buffer is the original integer.

use crate::errors::{Result, VariantError};

pub const METADATA_PICKING_ENABLED: &str = "METADATA_PICKING_ENABLED";
pub const METADATA_PICKING_VALUE_TYPE: &str = "METADATA_PICKING_VALUE_TYPE";
pub const METADATA_PICKING_VALUE_STRING: &str = "METADATA_PICKING_VALUE_STRING";
pub const METADATA_PICKING_VALUE_COMPONENT_X: &str = "METADATA_PICKING_VALUE_COMPONENT_X";
pub const METADATA_PICKING_VALUE_COMPONENT_Y: &str = "METADATA_PICKING_VALUE_COMPONENT_Y";
pub const METADATA_PICKING_VALUE_COMPONENT_Z: &str = "METADATA_PICKING_VALUE_COMPONENT_Z";
pub const METADATA_PICKING_VALUE_COMPONENT_W: &str = "METADATA_PICKING_VALUE_COMPONENT_W";

/// Channel placeholders in `x, y, z, w` order.
pub const METADATA_PICKING_VALUE_COMPONENTS: [&str; 4] = [
    METADATA_PICKING_VALUE_COMPONENT_X,
    METADATA_PICKING_VALUE_COMPONENT_Y,
    METADATA_PICKING_VALUE_COMPONENT_Z,
    METADATA_PICKING_VALUE_COMPONENT_W,
];

const UNUSED_CHANNEL: &str = "0.0";
const SWIZZLE: [char; 4] = ['x', 'y', 'z', 'w'];

/// Element type of a metadata property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetadataType {
    Scalar,
    Vec2,
    Vec3,
    Vec4,
    Mat2,
    Mat3,
    Mat4,
    Boolean,
    String,
    Enum,
}

impl MetadataType {
    #[must_use]
    pub const fn component_count(self) -> u32 {
        match self {
            Self::Scalar | Self::Boolean | Self::String | Self::Enum => 1,
            Self::Vec2 => 2,
            Self::Vec3 => 3,
            Self::Vec4 | Self::Mat2 => 4,
            Self::Mat3 => 9,
            Self::Mat4 => 16,
        }
    }
}

/// One property of a metadata class, restricted to shapes that fit in a
/// single RGBA output (1 to 4 components).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MetadataClassProperty {
    id: String,
    kind: MetadataType,
    normalized: bool,
    array_length: Option<u32>,
}

impl MetadataClassProperty {
    /// A non-array property.
    pub fn new(id: impl Into<String>, kind: MetadataType, normalized: bool) -> Result<Self> {
        Self::validated(id.into(), kind, normalized, None)
    }

    /// A fixed-length array property. The array length is the component
    /// count, regardless of the element type.
    pub fn array(
        id: impl Into<String>,
        kind: MetadataType,
        length: u32,
        normalized: bool,
    ) -> Result<Self> {
        Self::validated(id.into(), kind, normalized, Some(length))
    }

    fn validated(
        id: String,
        kind: MetadataType,
        normalized: bool,
        array_length: Option<u32>,
    ) -> Result<Self> {
        let count = array_length.unwrap_or_else(|| kind.component_count());
        if !(1..=4).contains(&count) {
            return Err(VariantError::InvalidComponentCount { property: id, count });
        }
        Ok(Self {
            id,
            kind,
            normalized,
            array_length,
        })
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn kind(&self) -> MetadataType {
        self.kind
    }

    #[must_use]
    pub fn is_normalized(&self) -> bool {
        self.normalized
    }

    #[must_use]
    pub fn is_array(&self) -> bool {
        self.array_length.is_some()
    }

    /// Component count in `1..=4`.
    #[must_use]
    pub fn component_count(&self) -> usize {
        self.array_length
            .unwrap_or_else(|| self.kind.component_count()) as usize
    }
}

/// Identifies the property whose values are rendered by a metadata pick.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PickedMetadataInfo {
    schema_id: String,
    class_name: String,
    property_name: String,
    class_property: MetadataClassProperty,
}

impl PickedMetadataInfo {
    pub fn new(
        schema_id: impl Into<String>,
        class_name: impl Into<String>,
        property_name: impl Into<String>,
        class_property: MetadataClassProperty,
    ) -> Result<Self> {
        let schema_id = validate_name("schema id", schema_id.into())?;
        let class_name = validate_name("class name", class_name.into())?;
        let property_name = validate_identifier("property name", property_name.into())?;
        Ok(Self {
            schema_id,
            class_name,
            property_name,
            class_property,
        })
    }

    #[must_use]
    pub fn schema_id(&self) -> &str {
        &self.schema_id
    }

    #[must_use]
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    #[must_use]
    pub fn property_name(&self) -> &str {
        &self.property_name
    }

    #[must_use]
    pub fn class_property(&self) -> &MetadataClassProperty {
        &self.class_property
    }
}

/// Schema and class names become `-`-separated parts of a purpose tag.
fn validate_name(field: &'static str, value: String) -> Result<String> {
    if value.is_empty() {
        return Err(VariantError::EmptyMetadataName(field));
    }
    if value
        .chars()
        .any(|c| c == '-' || c.is_whitespace() || c.is_control())
    {
        return Err(VariantError::InvalidMetadataName {
            field,
            value,
            reason: "must not contain '-', whitespace or control characters",
        });
    }
    Ok(value)
}

/// Property names are spliced into `metadata.<name>` in shader text.
fn validate_identifier(field: &'static str, value: String) -> Result<String> {
    if value.is_empty() {
        return Err(VariantError::EmptyMetadataName(field));
    }
    let mut chars = value.chars();
    let leading_ok = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if !leading_ok || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(VariantError::InvalidMetadataName {
            field,
            value,
            reason: "must be a GLSL identifier",
        });
    }
    Ok(value)
}

// ─── Packing Codec ────────────────────────────────────────────────────────────

/// Computes the define values that make a fragment template write a
/// property value into RGBA.
pub struct MetadataPacking;

impl MetadataPacking {
    /// GLSL type of the property value as seen by the template.
    #[must_use]
    pub fn glsl_type(property: &MetadataClassProperty) -> &'static str {
        match (property.is_normalized(), property.component_count()) {
            (true, 1) => "float",
            (true, 2) => "vec2",
            (true, 3) => "vec3",
            (true, _) => "vec4",
            (false, 1) => "int",
            (false, 2) => "ivec2",
            (false, 3) => "ivec3",
            (false, _) => "ivec4",
        }
    }

    /// Expression that reads the property inside the template.
    #[must_use]
    pub fn value_access(info: &PickedMetadataInfo) -> String {
        format!("metadata.{}", info.property_name())
    }

    /// Per-channel `float` expressions in `x, y, z, w` order.
    ///
    /// Scalars read `value`, vectors and arrays read `value.x` etc. Channels
    /// beyond the component count are the literal `0.0`.
    #[must_use]
    pub fn channel_expressions(property: &MetadataClassProperty) -> [String; 4] {
        let count = property.component_count();
        let mut channels: [String; 4] = std::array::from_fn(|_| UNUSED_CHANNEL.to_owned());

        for (i, channel) in channels.iter_mut().enumerate().take(count) {
            let source = if count == 1 {
                "float(value)".to_owned()
            } else {
                format!("float(value.{})", SWIZZLE[i])
            };
            *channel = if property.is_normalized() {
                source
            } else {
                format!("{source} / 255.0")
            };
        }

        channels
    }

    /// CPU evaluation of [`channel_expressions`](Self::channel_expressions)
    /// for the given component values. Missing values read as zero.
    #[must_use]
    pub fn pack(property: &MetadataClassProperty, values: &[f64]) -> [f32; 4] {
        let count = property.component_count();
        let mut out = [0.0; 4];
        for (i, slot) in out.iter_mut().enumerate().take(count) {
            let value = values.get(i).copied().unwrap_or(0.0);
            let value = if property.is_normalized() {
                value
            } else {
                value / 255.0
            };
            *slot = value as f32;
        }
        out
    }
}
