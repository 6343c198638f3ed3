//! GLX frame buffer configuration records
//!
//! One `FbConfigAttr` per configuration, as reported by the server. Lists of
//! records follow the driver convention of ending at the first record whose
//! configuration ID is zero.

use serde::{Deserialize, Serialize};

// GLX enumerants
pub const GLX_NONE: i32 = 0x8000;
pub const GLX_SLOW_CONFIG: i32 = 0x8001;
pub const GLX_TRUE_COLOR: i32 = 0x8002;
pub const GLX_DIRECT_COLOR: i32 = 0x8003;
pub const GLX_PSEUDO_COLOR: i32 = 0x8004;
pub const GLX_STATIC_COLOR: i32 = 0x8005;
pub const GLX_GRAY_SCALE: i32 = 0x8006;
pub const GLX_STATIC_GRAY: i32 = 0x8007;
pub const GLX_TRANSPARENT_RGB: i32 = 0x8008;
pub const GLX_TRANSPARENT_INDEX: i32 = 0x8009;
pub const GLX_NON_CONFORMANT_CONFIG: i32 = 0x800D;
pub const GLX_RGBA_BIT: i32 = 0x1;
pub const GLX_COLOR_INDEX_BIT: i32 = 0x2;

// GLX attribute tokens found in GetFBConfigs property lists
const GLX_BUFFER_SIZE: u32 = 2;
const GLX_LEVEL: u32 = 3;
const GLX_DOUBLEBUFFER: u32 = 5;
const GLX_STEREO: u32 = 6;
const GLX_AUX_BUFFERS: u32 = 7;
const GLX_RED_SIZE: u32 = 8;
const GLX_GREEN_SIZE: u32 = 9;
const GLX_BLUE_SIZE: u32 = 10;
const GLX_ALPHA_SIZE: u32 = 11;
const GLX_DEPTH_SIZE: u32 = 12;
const GLX_STENCIL_SIZE: u32 = 13;
const GLX_ACCUM_RED_SIZE: u32 = 14;
const GLX_ACCUM_GREEN_SIZE: u32 = 15;
const GLX_ACCUM_BLUE_SIZE: u32 = 16;
const GLX_ACCUM_ALPHA_SIZE: u32 = 17;
const GLX_CONFIG_CAVEAT: u32 = 0x20;
const GLX_X_VISUAL_TYPE: u32 = 0x22;
const GLX_TRANSPARENT_TYPE: u32 = 0x23;
const GLX_TRANSPARENT_INDEX_VALUE: u32 = 0x24;
const GLX_TRANSPARENT_RED_VALUE: u32 = 0x25;
const GLX_TRANSPARENT_GREEN_VALUE: u32 = 0x26;
const GLX_TRANSPARENT_BLUE_VALUE: u32 = 0x27;
const GLX_TRANSPARENT_ALPHA_VALUE: u32 = 0x28;
const GLX_COLOR_SAMPLES_NV: u32 = 0x20B3;
const GLX_VISUAL_ID: u32 = 0x800B;
const GLX_RENDER_TYPE: u32 = 0x8011;
const GLX_FBCONFIG_ID: u32 = 0x8013;
const GLX_MAX_PBUFFER_WIDTH: u32 = 0x8016;
const GLX_MAX_PBUFFER_HEIGHT: u32 = 0x8017;
const GLX_MAX_PBUFFER_PIXELS: u32 = 0x8018;
const GLX_SAMPLE_BUFFERS: u32 = 100_000;
const GLX_SAMPLES: u32 = 100_001;

/// Attributes of a single GLX frame buffer configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FbConfigAttr {
    pub fbconfig_id: u32,
    pub visual_id: u32,
    pub x_visual_type: i32,
    pub buffer_size: i32,
    pub level: i32,
    pub render_type: i32,
    pub doublebuffer: bool,
    pub stereo: bool,
    pub red_size: i32,
    pub green_size: i32,
    pub blue_size: i32,
    pub alpha_size: i32,
    pub aux_buffers: i32,
    pub depth_size: i32,
    pub stencil_size: i32,
    pub accum_red_size: i32,
    pub accum_green_size: i32,
    pub accum_blue_size: i32,
    pub accum_alpha_size: i32,
    pub multi_sample_valid: bool,
    pub multi_samples: i32,
    pub multi_sample_buffers: i32,
    pub multi_sample_coverage_valid: bool,
    pub multi_samples_color: i32,
    pub config_caveat: i32,
    pub pbuffer_width: u32,
    pub pbuffer_height: u32,
    pub pbuffer_max: u32,
    pub transparent_type: i32,
    pub transparent_red_value: i32,
    pub transparent_green_value: i32,
    pub transparent_blue_value: i32,
    pub transparent_alpha_value: i32,
    pub transparent_index_value: i32,
}

impl FbConfigAttr {
    /// A zero configuration ID marks the end of a record list.
    pub fn is_sentinel(&self) -> bool {
        self.fbconfig_id == 0
    }

    pub fn visual_type(&self) -> VisualType {
        VisualType::from_glx(self.x_visual_type)
    }

    pub fn render(&self) -> RenderType {
        RenderType::from_glx(self.render_type)
    }

    pub fn caveat(&self) -> Caveat {
        Caveat::from_glx(self.config_caveat)
    }

    pub fn transparency(&self) -> TransparentType {
        TransparentType::from_glx(self.transparent_type)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisualType {
    TrueColor,
    DirectColor,
    PseudoColor,
    StaticColor,
    GrayScale,
    StaticGray,
    None,
    Other(i32),
}

impl VisualType {
    pub fn from_glx(value: i32) -> Self {
        match value {
            GLX_TRUE_COLOR => Self::TrueColor,
            GLX_DIRECT_COLOR => Self::DirectColor,
            GLX_PSEUDO_COLOR => Self::PseudoColor,
            GLX_STATIC_COLOR => Self::StaticColor,
            GLX_GRAY_SCALE => Self::GrayScale,
            GLX_STATIC_GRAY => Self::StaticGray,
            GLX_NONE => Self::None,
            other => Self::Other(other),
        }
    }

    pub fn abbrev(self) -> &'static str {
        match self {
            Self::TrueColor => "tc",
            Self::DirectColor => "dc",
            Self::PseudoColor => "pc",
            Self::StaticColor => "sc",
            Self::GrayScale => "gs",
            Self::StaticGray => "sg",
            Self::None | Self::Other(_) => ".",
        }
    }
}

/// `GLX_RENDER_TYPE` bitmask
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderType {
    Rgba,
    ColorIndex,
    Any,
    Other(i32),
}

impl RenderType {
    pub fn from_glx(value: i32) -> Self {
        match value {
            GLX_RGBA_BIT => Self::Rgba,
            GLX_COLOR_INDEX_BIT => Self::ColorIndex,
            v if v == GLX_RGBA_BIT | GLX_COLOR_INDEX_BIT => Self::Any,
            other => Self::Other(other),
        }
    }

    pub fn abbrev(self) -> &'static str {
        match self {
            Self::Rgba => "rgb",
            Self::ColorIndex => "ci",
            Self::Any => "any",
            Self::Other(_) => ".",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Caveat {
    None,
    Slow,
    NonConformant,
    Other(i32),
}

impl Caveat {
    pub fn from_glx(value: i32) -> Self {
        match value {
            GLX_NONE => Self::None,
            GLX_SLOW_CONFIG => Self::Slow,
            GLX_NON_CONFORMANT_CONFIG => Self::NonConformant,
            other => Self::Other(other),
        }
    }

    pub fn abbrev(self) -> &'static str {
        match self {
            Self::None => "-",
            Self::Slow => "Slow",
            Self::NonConformant => "NonC",
            Self::Other(_) => ".",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransparentType {
    None,
    Rgb,
    Index,
    Other(i32),
}

impl TransparentType {
    pub fn from_glx(value: i32) -> Self {
        match value {
            GLX_NONE => Self::None,
            GLX_TRANSPARENT_RGB => Self::Rgb,
            GLX_TRANSPARENT_INDEX => Self::Index,
            other => Self::Other(other),
        }
    }

    pub fn abbrev(self) -> &'static str {
        match self {
            Self::Rgb => "rgb",
            Self::Index => "ci",
            Self::None | Self::Other(_) => ".",
        }
    }
}

/// Decode the flat `(attribute, value)` property list of a GetFBConfigs
/// reply. Each configuration occupies `num_properties` pairs; trailing
/// partial configurations are dropped.
pub fn decode_property_list(
    props: &[u32],
    num_configs: usize,
    num_properties: usize,
) -> Vec<FbConfigAttr> {
    if num_properties == 0 {
        return Vec::new();
    }

    props
        .chunks_exact(num_properties * 2)
        .take(num_configs)
        .map(decode_config)
        .collect()
}

fn decode_config(props: &[u32]) -> FbConfigAttr {
    let mut attr = FbConfigAttr {
        x_visual_type: GLX_NONE,
        config_caveat: GLX_NONE,
        transparent_type: GLX_NONE,
        ..Default::default()
    };

    for pair in props.chunks_exact(2) {
        let (tag, raw) = (pair[0], pair[1]);
        let val = raw as i32;

        match tag {
            GLX_FBCONFIG_ID => attr.fbconfig_id = raw,
            GLX_VISUAL_ID => attr.visual_id = raw,
            GLX_X_VISUAL_TYPE => attr.x_visual_type = val,
            GLX_BUFFER_SIZE => attr.buffer_size = val,
            GLX_LEVEL => attr.level = val,
            GLX_RENDER_TYPE => attr.render_type = val,
            GLX_DOUBLEBUFFER => attr.doublebuffer = raw != 0,
            GLX_STEREO => attr.stereo = raw != 0,
            GLX_RED_SIZE => attr.red_size = val,
            GLX_GREEN_SIZE => attr.green_size = val,
            GLX_BLUE_SIZE => attr.blue_size = val,
            GLX_ALPHA_SIZE => attr.alpha_size = val,
            GLX_AUX_BUFFERS => attr.aux_buffers = val,
            GLX_DEPTH_SIZE => attr.depth_size = val,
            GLX_STENCIL_SIZE => attr.stencil_size = val,
            GLX_ACCUM_RED_SIZE => attr.accum_red_size = val,
            GLX_ACCUM_GREEN_SIZE => attr.accum_green_size = val,
            GLX_ACCUM_BLUE_SIZE => attr.accum_blue_size = val,
            GLX_ACCUM_ALPHA_SIZE => attr.accum_alpha_size = val,
            GLX_SAMPLE_BUFFERS => {
                attr.multi_sample_valid = true;
                attr.multi_sample_buffers = val;
            }
            // Coverage sample count when GLX_NV_multisample_coverage is present
            GLX_SAMPLES => {
                attr.multi_sample_valid = true;
                attr.multi_samples = val;
            }
            GLX_COLOR_SAMPLES_NV => {
                attr.multi_sample_coverage_valid = true;
                attr.multi_samples_color = val;
            }
            GLX_CONFIG_CAVEAT => attr.config_caveat = val,
            GLX_MAX_PBUFFER_WIDTH => attr.pbuffer_width = raw,
            GLX_MAX_PBUFFER_HEIGHT => attr.pbuffer_height = raw,
            GLX_MAX_PBUFFER_PIXELS => attr.pbuffer_max = raw,
            GLX_TRANSPARENT_TYPE => attr.transparent_type = val,
            GLX_TRANSPARENT_RED_VALUE => attr.transparent_red_value = val,
            GLX_TRANSPARENT_GREEN_VALUE => attr.transparent_green_value = val,
            GLX_TRANSPARENT_BLUE_VALUE => attr.transparent_blue_value = val,
            GLX_TRANSPARENT_ALPHA_VALUE => attr.transparent_alpha_value = val,
            GLX_TRANSPARENT_INDEX_VALUE => attr.transparent_index_value = val,
            _ => {}
        }
    }

    attr
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visual_type_abbrev() {
        let codes: Vec<&str> = [
            GLX_TRUE_COLOR,
            GLX_DIRECT_COLOR,
            GLX_PSEUDO_COLOR,
            GLX_STATIC_COLOR,
            GLX_GRAY_SCALE,
            GLX_STATIC_GRAY,
            GLX_NONE,
            0,
        ]
        .iter()
        .map(|v| VisualType::from_glx(*v).abbrev())
        .collect();

        assert_eq!(codes, vec!["tc", "dc", "pc", "sc", "gs", "sg", ".", "."]);
    }

    #[test]
    fn test_render_type_abbrev() {
        assert_eq!(RenderType::from_glx(GLX_RGBA_BIT).abbrev(), "rgb");
        assert_eq!(RenderType::from_glx(GLX_COLOR_INDEX_BIT).abbrev(), "ci");
        assert_eq!(RenderType::from_glx(3).abbrev(), "any");
        assert_eq!(RenderType::from_glx(8).abbrev(), ".");
    }

    #[test]
    fn test_caveat_and_transparency_abbrev() {
        assert_eq!(Caveat::from_glx(GLX_NONE).abbrev(), "-");
        assert_eq!(Caveat::from_glx(GLX_SLOW_CONFIG).abbrev(), "Slow");
        assert_eq!(Caveat::from_glx(GLX_NON_CONFORMANT_CONFIG).abbrev(), "NonC");
        assert_eq!(Caveat::from_glx(0).abbrev(), ".");

        assert_eq!(TransparentType::from_glx(GLX_NONE).abbrev(), ".");
        assert_eq!(TransparentType::from_glx(GLX_TRANSPARENT_RGB).abbrev(), "rgb");
        assert_eq!(TransparentType::from_glx(GLX_TRANSPARENT_INDEX).abbrev(), "ci");
    }

    #[test]
    fn test_decode_property_list() {
        // two configs, four pairs each
        #[rustfmt::skip]
        let props = [
            GLX_FBCONFIG_ID, 0x21,
            GLX_VISUAL_ID, 0x2b,
            GLX_DOUBLEBUFFER, 1,
            GLX_SAMPLES, 4,
            GLX_FBCONFIG_ID, 0x22,
            GLX_LEVEL, (-1i32) as u32,
            GLX_COLOR_SAMPLES_NV, 8,
            0xdead, 7,
        ];

        let configs = decode_property_list(&props, 2, 4);
        assert_eq!(configs.len(), 2);

        assert_eq!(configs[0].fbconfig_id, 0x21);
        assert_eq!(configs[0].visual_id, 0x2b);
        assert!(configs[0].doublebuffer);
        assert!(configs[0].multi_sample_valid);
        assert!(!configs[0].multi_sample_coverage_valid);
        assert_eq!(configs[0].multi_samples, 4);
        assert_eq!(configs[0].caveat(), Caveat::None);

        assert_eq!(configs[1].level, -1);
        assert!(configs[1].multi_sample_coverage_valid);
        assert_eq!(configs[1].multi_samples_color, 8);
        assert_eq!(configs[1].visual_type(), VisualType::None);
    }

    #[test]
    fn test_decode_drops_truncated_config() {
        #[rustfmt::skip]
        let props = [
            GLX_FBCONFIG_ID, 1,
            GLX_STEREO, 1,
            GLX_FBCONFIG_ID, 2,
        ];
        let configs = decode_property_list(&props, 2, 2);
        assert_eq!(configs.len(), 1);
        assert!(configs[0].stereo);

        assert!(decode_property_list(&props, 2, 0).is_empty());
    }
}
