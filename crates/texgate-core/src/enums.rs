//! GL enum vocabulary
//!
//! Typed views of the raw enum values accepted at the API boundary. Every typed enum decodes
//! from its raw `u32` with `TryFrom`, and an unrecognized value is an `InvalidEnum` error.

use serde::{Deserialize, Serialize};

use crate::{GlError, GlResult};

/// Raw GL enum values
pub mod gl {
    pub const INVALID_ENUM: u32 = 0x0500;
    pub const INVALID_VALUE: u32 = 0x0501;
    pub const INVALID_OPERATION: u32 = 0x0502;

    pub const TEXTURE_2D: u32 = 0x0DE1;
    pub const TEXTURE_3D: u32 = 0x806F;
    pub const TEXTURE_2D_ARRAY: u32 = 0x8C1A;
    pub const TEXTURE_CUBE_MAP: u32 = 0x8513;
    pub const TEXTURE_2D_MULTISAMPLE: u32 = 0x9100;
    pub const TEXTURE_2D_MULTISAMPLE_ARRAY: u32 = 0x9102;

    pub const TEXTURE_MAG_FILTER: u32 = 0x2800;
    pub const TEXTURE_MIN_FILTER: u32 = 0x2801;
    pub const TEXTURE_WRAP_S: u32 = 0x2802;
    pub const TEXTURE_WRAP_T: u32 = 0x2803;
    pub const TEXTURE_WRAP_R: u32 = 0x8072;
    pub const TEXTURE_MIN_LOD: u32 = 0x813A;
    pub const TEXTURE_MAX_LOD: u32 = 0x813B;
    pub const TEXTURE_BASE_LEVEL: u32 = 0x813C;
    pub const TEXTURE_MAX_LEVEL: u32 = 0x813D;
    pub const TEXTURE_COMPARE_MODE: u32 = 0x884C;
    pub const TEXTURE_COMPARE_FUNC: u32 = 0x884D;
    pub const TEXTURE_IMMUTABLE_FORMAT: u32 = 0x912F;

    pub const TEXTURE_WIDTH: u32 = 0x1000;
    pub const TEXTURE_HEIGHT: u32 = 0x1001;
    pub const TEXTURE_INTERNAL_FORMAT: u32 = 0x1003;
    pub const TEXTURE_DEPTH: u32 = 0x8071;
    pub const TEXTURE_SAMPLES: u32 = 0x9106;
    pub const TEXTURE_FIXED_SAMPLE_LOCATIONS: u32 = 0x9107;

    pub const NONE: u32 = 0;
    pub const NEAREST: u32 = 0x2600;
    pub const LINEAR: u32 = 0x2601;
    pub const NEAREST_MIPMAP_NEAREST: u32 = 0x2700;
    pub const LINEAR_MIPMAP_NEAREST: u32 = 0x2701;
    pub const NEAREST_MIPMAP_LINEAR: u32 = 0x2702;
    pub const LINEAR_MIPMAP_LINEAR: u32 = 0x2703;
    pub const REPEAT: u32 = 0x2901;
    pub const CLAMP_TO_EDGE: u32 = 0x812F;
    pub const MIRRORED_REPEAT: u32 = 0x8370;
    pub const COMPARE_REF_TO_TEXTURE: u32 = 0x884E;
    pub const NEVER: u32 = 0x0200;
    pub const LEQUAL: u32 = 0x0203;
    pub const ALWAYS: u32 = 0x0207;

    pub const MAX_TEXTURE_SIZE: u32 = 0x0D33;
    pub const MAX_3D_TEXTURE_SIZE: u32 = 0x8073;
    pub const MAX_ARRAY_TEXTURE_LAYERS: u32 = 0x88FF;
    pub const MAX_COLOR_ATTACHMENTS: u32 = 0x8CDF;
    pub const MAX_SAMPLES: u32 = 0x8D57;
    pub const MAX_COLOR_TEXTURE_SAMPLES: u32 = 0x910E;
    pub const MAX_DEPTH_TEXTURE_SAMPLES: u32 = 0x910F;
    pub const MAX_INTEGER_SAMPLES: u32 = 0x9110;

    pub const COLOR_ATTACHMENT0: u32 = 0x8CE0;
    pub const COLOR_ATTACHMENT15: u32 = 0x8CEF;
    pub const DEPTH_ATTACHMENT: u32 = 0x8D00;
    pub const STENCIL_ATTACHMENT: u32 = 0x8D20;
    pub const DEPTH_STENCIL_ATTACHMENT: u32 = 0x821A;

    pub const FRAMEBUFFER_COMPLETE: u32 = 0x8CD5;
    pub const FRAMEBUFFER_INCOMPLETE_ATTACHMENT: u32 = 0x8CD6;
    pub const FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT: u32 = 0x8CD7;
}

/// Declares a fieldless enum backed by raw GL values, with `raw()` and `TryFrom<u32>`.
macro_rules! gl_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $raw:expr, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, ::serde::Serialize, ::serde::Deserialize,
        )]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
        }

        impl $name {
            /// Raw GL value
            pub fn raw(self) -> u32 {
                match self {
                    $( $name::$variant => $raw, )+
                }
            }
        }

        impl TryFrom<u32> for $name {
            type Error = $crate::GlError;

            fn try_from(raw: u32) -> $crate::GlResult<Self> {
                match raw {
                    $( r if r == $raw => Ok($name::$variant), )+
                    other => Err($crate::GlError::invalid_enum(format!(
                        "0x{:04X} is not a valid {}",
                        other,
                        stringify!($name)
                    ))),
                }
            }
        }
    };
}

pub(crate) use gl_enum;

gl_enum! {
    /// Texture binding targets
    pub enum TextureTarget {
        Texture2D = gl::TEXTURE_2D,
        Texture3D = gl::TEXTURE_3D,
        Texture2DArray = gl::TEXTURE_2D_ARRAY,
        CubeMap = gl::TEXTURE_CUBE_MAP,
        Texture2DMultisample = gl::TEXTURE_2D_MULTISAMPLE,
        Texture2DMultisampleArray = gl::TEXTURE_2D_MULTISAMPLE_ARRAY,
    }
}

impl TextureTarget {
    /// Whether objects of this target hold unresolved samples
    pub fn is_multisample(self) -> bool {
        matches!(
            self,
            TextureTarget::Texture2DMultisample | TextureTarget::Texture2DMultisampleArray
        )
    }

    /// Whether attachments of this target select a layer
    pub fn is_layered(self) -> bool {
        matches!(
            self,
            TextureTarget::Texture3D
                | TextureTarget::Texture2DArray
                | TextureTarget::Texture2DMultisampleArray
        )
    }

    /// Whether `tex_image_3d` may specify images for this target
    pub fn accepts_image_3d(self) -> bool {
        matches!(self, TextureTarget::Texture3D | TextureTarget::Texture2DArray)
    }
}

gl_enum! {
    /// Settable and queryable texture parameters
    pub enum TextureParameter {
        MinFilter = gl::TEXTURE_MIN_FILTER,
        MagFilter = gl::TEXTURE_MAG_FILTER,
        WrapS = gl::TEXTURE_WRAP_S,
        WrapT = gl::TEXTURE_WRAP_T,
        WrapR = gl::TEXTURE_WRAP_R,
        MinLod = gl::TEXTURE_MIN_LOD,
        MaxLod = gl::TEXTURE_MAX_LOD,
        CompareMode = gl::TEXTURE_COMPARE_MODE,
        CompareFunc = gl::TEXTURE_COMPARE_FUNC,
        BaseLevel = gl::TEXTURE_BASE_LEVEL,
        MaxLevel = gl::TEXTURE_MAX_LEVEL,
        /// Query only
        ImmutableFormat = gl::TEXTURE_IMMUTABLE_FORMAT,
    }
}

impl TextureParameter {
    /// Parameters that configure sampling; multisample targets have no such state
    pub fn is_sampler_state(self) -> bool {
        matches!(
            self,
            TextureParameter::MinFilter
                | TextureParameter::MagFilter
                | TextureParameter::WrapS
                | TextureParameter::WrapT
                | TextureParameter::WrapR
                | TextureParameter::MinLod
                | TextureParameter::MaxLod
                | TextureParameter::CompareMode
                | TextureParameter::CompareFunc
        )
    }
}

gl_enum! {
    /// Per-level texture queries
    pub enum LevelParameter {
        Width = gl::TEXTURE_WIDTH,
        Height = gl::TEXTURE_HEIGHT,
        Depth = gl::TEXTURE_DEPTH,
        Samples = gl::TEXTURE_SAMPLES,
        FixedSampleLocations = gl::TEXTURE_FIXED_SAMPLE_LOCATIONS,
        InternalFormat = gl::TEXTURE_INTERNAL_FORMAT,
    }
}

gl_enum! {
    /// Integer implementation limits
    pub enum IntegerCap {
        MaxSamples = gl::MAX_SAMPLES,
        MaxIntegerSamples = gl::MAX_INTEGER_SAMPLES,
        MaxColorTextureSamples = gl::MAX_COLOR_TEXTURE_SAMPLES,
        MaxDepthTextureSamples = gl::MAX_DEPTH_TEXTURE_SAMPLES,
        MaxArrayTextureLayers = gl::MAX_ARRAY_TEXTURE_LAYERS,
        MaxTextureSize = gl::MAX_TEXTURE_SIZE,
        Max3DTextureSize = gl::MAX_3D_TEXTURE_SIZE,
        MaxColorAttachments = gl::MAX_COLOR_ATTACHMENTS,
    }
}

impl IntegerCap {
    /// Caps introduced together with multisample textures
    pub fn requires_multisample_textures(self) -> bool {
        matches!(
            self,
            IntegerCap::MaxIntegerSamples
                | IntegerCap::MaxColorTextureSamples
                | IntegerCap::MaxDepthTextureSamples
        )
    }
}

/// Framebuffer attachment points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AttachmentPoint {
    Color(u8),
    Depth,
    Stencil,
    DepthStencil,
}

impl AttachmentPoint {
    /// Raw GL value
    pub fn raw(self) -> u32 {
        match self {
            AttachmentPoint::Color(index) => gl::COLOR_ATTACHMENT0 + u32::from(index),
            AttachmentPoint::Depth => gl::DEPTH_ATTACHMENT,
            AttachmentPoint::Stencil => gl::STENCIL_ATTACHMENT,
            AttachmentPoint::DepthStencil => gl::DEPTH_STENCIL_ATTACHMENT,
        }
    }
}

impl TryFrom<u32> for AttachmentPoint {
    type Error = GlError;

    fn try_from(raw: u32) -> GlResult<Self> {
        match raw {
            gl::COLOR_ATTACHMENT0..=gl::COLOR_ATTACHMENT15 => {
                Ok(AttachmentPoint::Color((raw - gl::COLOR_ATTACHMENT0) as u8))
            }
            gl::DEPTH_ATTACHMENT => Ok(AttachmentPoint::Depth),
            gl::STENCIL_ATTACHMENT => Ok(AttachmentPoint::Stencil),
            gl::DEPTH_STENCIL_ATTACHMENT => Ok(AttachmentPoint::DepthStencil),
            other => Err(GlError::invalid_enum(format!(
                "0x{:04X} is not a valid AttachmentPoint",
                other
            ))),
        }
    }
}
