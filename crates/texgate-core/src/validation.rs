//! Validation engine
//!
//! Every entry point is checked here against a read-only view of the context. Checks run in
//! a fixed order and the first failure is the only error reported:
//!
//! 1. extension and version gate for the target or enum
//! 2. enum validity for the entry point
//! 3. a texture must be bound to the target
//! 4. numeric bounds
//! 5. format sizedness
//! 6. immutability
//!
//! A successful check returns the exact change to commit, so the caller either applies all of
//! it or, on error, nothing.

use ahash::{AHashMap, AHashSet};

use crate::caps::CapabilityTable;
use crate::config::Limits;
use crate::enums::{
    gl, AttachmentPoint, IntegerCap, LevelParameter, TextureParameter, TextureTarget,
};
use crate::extensions::{Extension, ExtensionGate};
use crate::format::InternalFormat;
use crate::framebuffer::{Attachment, Framebuffer, FramebufferId, FramebufferStatus};
use crate::texture::{Texture, TextureId, TextureStorage};
use crate::{GlError, GlResult};

/// Storage allocation entry points
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageEntry {
    /// `TexStorage2DMultisample`
    Storage2D,
    /// `TexStorage3DMultisample`
    Storage3D,
}

impl StorageEntry {
    fn expected_target(self) -> TextureTarget {
        match self {
            StorageEntry::Storage2D => TextureTarget::Texture2DMultisample,
            StorageEntry::Storage3D => TextureTarget::Texture2DMultisampleArray,
        }
    }
}

/// Framebuffer attachment entry points
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachEntry {
    /// `FramebufferTexture2D`: whole level of a non-layered texture
    Texture,
    /// `FramebufferTextureLayer`: one layer of a layered texture
    TextureLayer { layer: i32 },
}

/// Arguments shared by the storage allocation calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageArgs {
    pub samples: i32,
    pub internal_format: InternalFormat,
    pub width: i32,
    pub height: i32,
    /// Layer count for the array call, 1 for the 2D call
    pub depth: i32,
    pub fixed_sample_locations: bool,
}

/// A validated storage allocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoragePlan {
    pub texture: TextureId,
    pub storage: TextureStorage,
}

/// A validated mutable image specification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImagePlan {
    pub texture: TextureId,
    pub level: u32,
    pub storage: TextureStorage,
}

/// A validated parameter change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterPlan {
    pub texture: TextureId,
    pub pname: TextureParameter,
    pub value: i32,
}

/// A validated attachment change; `attachment == None` detaches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttachPlan {
    pub framebuffer: FramebufferId,
    pub point: AttachmentPoint,
    pub attachment: Option<Attachment>,
}

/// What a successful bind does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindPlan {
    Unbind,
    /// Bind an object that already exists with this target
    Bind(TextureId),
    /// First bind of a generated name: create the object
    Create(TextureId),
}

/// Read-only view of the state validation depends on
pub struct Validator<'a> {
    pub limits: &'a Limits,
    pub caps: &'a CapabilityTable,
    pub gate: &'a ExtensionGate,
    pub texture_names: &'a AHashSet<TextureId>,
    pub textures: &'a AHashMap<TextureId, Texture>,
    pub bindings: &'a AHashMap<TextureTarget, TextureId>,
    pub framebuffers: &'a AHashMap<FramebufferId, Framebuffer>,
}

impl<'a> Validator<'a> {
    /// Texture bound to `target`
    pub fn bound_texture(&self, target: TextureTarget) -> GlResult<&'a Texture> {
        self.bindings
            .get(&target)
            .and_then(|id| self.textures.get(id))
            .ok_or_else(|| {
                GlError::invalid_operation(format!("no texture is bound to {:?}", target))
            })
    }

    /// Largest mip level for a target
    pub fn max_level(&self, target: TextureTarget) -> u32 {
        if target.is_multisample() {
            return 0;
        }
        let size = match target {
            TextureTarget::Texture3D => self.limits.max_3d_texture_size,
            _ => self.limits.max_texture_size,
        };
        31 - size.max(1).leading_zeros()
    }

    /// `GetInternalformativ(target, format, SAMPLES)`
    pub fn sample_counts(
        &self,
        target: TextureTarget,
        internal_format: InternalFormat,
    ) -> GlResult<&'a [u32]> {
        self.gate.check_target(target)?;
        if !target.is_multisample() {
            return Err(GlError::invalid_enum(format!(
                "{:?} has no sample-count capabilities",
                target
            )));
        }
        self.caps.query(target, internal_format).ok_or_else(|| {
            GlError::invalid_enum(format!(
                "{:?} is not a renderable sized format",
                internal_format
            ))
        })
    }

    /// `GetIntegerv` for implementation limits
    pub fn integer_cap(&self, cap: IntegerCap) -> GlResult<i32> {
        self.gate.check_integer_cap(cap)?;
        let limits = self.limits;
        let value = match cap {
            IntegerCap::MaxSamples => limits.max_samples,
            IntegerCap::MaxIntegerSamples => limits.max_integer_samples,
            IntegerCap::MaxColorTextureSamples => limits.max_color_texture_samples,
            IntegerCap::MaxDepthTextureSamples => limits.max_depth_texture_samples,
            IntegerCap::MaxArrayTextureLayers => limits.max_array_texture_layers,
            IntegerCap::MaxTextureSize => limits.max_texture_size,
            IntegerCap::Max3DTextureSize => limits.max_3d_texture_size,
            IntegerCap::MaxColorAttachments => limits.max_color_attachments,
        };
        // Limits are validated below i32::MAX at context creation
        Ok(value as i32)
    }

    /// `BindTexture`
    pub fn bind_texture(&self, target: TextureTarget, id: Option<TextureId>) -> GlResult<BindPlan> {
        self.gate.check_target(target)?;

        let Some(id) = id else {
            return Ok(BindPlan::Unbind);
        };
        if !self.texture_names.contains(&id) {
            return Err(GlError::invalid_operation(format!(
                "texture {} was not generated or has been deleted",
                id.raw()
            )));
        }
        match self.textures.get(&id) {
            Some(texture) if texture.target() != target => {
                Err(GlError::invalid_operation(format!(
                    "texture {} was created as {:?}, not {:?}",
                    id.raw(),
                    texture.target(),
                    target
                )))
            }
            Some(_) => Ok(BindPlan::Bind(id)),
            None => Ok(BindPlan::Create(id)),
        }
    }

    /// `TexStorage2DMultisample` / `TexStorage3DMultisample`
    pub fn tex_storage_multisample(
        &self,
        entry: StorageEntry,
        target: TextureTarget,
        args: StorageArgs,
    ) -> GlResult<StoragePlan> {
        // 1. gate: the array entry point only exists with its extension
        if entry == StorageEntry::Storage3D
            && !self.gate.is_enabled(Extension::TextureMultisampleArray)
        {
            return Err(GlError::invalid_enum(format!(
                "{} is not enabled",
                Extension::TextureMultisampleArray.name()
            )));
        }
        self.gate.check_target(target)?;

        // 2. target
        if target != entry.expected_target() {
            return Err(GlError::invalid_enum(format!(
                "{:?} is not a valid target for {:?}",
                target, entry
            )));
        }

        // 3. bound object
        let texture = self.bound_texture(target)?;

        // 4. numeric bounds
        if args.samples < 1 {
            return Err(GlError::invalid_value("samples must be at least 1"));
        }
        let max_size = self.limits.max_texture_size as i64;
        for (name, value) in [("width", args.width), ("height", args.height)] {
            if value < 1 || i64::from(value) > max_size {
                return Err(GlError::invalid_value(format!(
                    "{name} {value} is outside [1, {max_size}]"
                )));
            }
        }
        if entry == StorageEntry::Storage3D {
            let max_layers = self.limits.max_array_texture_layers as i64;
            if args.depth < 1 || i64::from(args.depth) >= max_layers {
                return Err(GlError::invalid_value(format!(
                    "layer count {} is outside [1, {})",
                    args.depth, max_layers
                )));
            }
        }
        if let Some(max_samples) = self.caps.max_samples(target, args.internal_format) {
            if args.samples as u32 > max_samples {
                return Err(GlError::invalid_operation(format!(
                    "{} samples exceed the {} supported for {:?}",
                    args.samples, max_samples, args.internal_format
                )));
            }
        }

        // 5. format
        if !args.internal_format.is_sized() {
            return Err(GlError::invalid_value(format!(
                "{:?} is not a sized internal format",
                args.internal_format
            )));
        }
        if self.caps.query(target, args.internal_format).is_none() {
            return Err(GlError::invalid_enum(format!(
                "{:?} is not renderable",
                args.internal_format
            )));
        }

        // 6. immutability
        if texture.is_immutable() {
            return Err(GlError::invalid_operation(format!(
                "texture {} already has immutable storage",
                texture.id().raw()
            )));
        }

        Ok(StoragePlan {
            texture: texture.id(),
            storage: TextureStorage {
                internal_format: args.internal_format,
                width: args.width as u32,
                height: args.height as u32,
                depth: args.depth.max(1) as u32,
                samples: args.samples as u32,
                fixed_sample_locations: args.fixed_sample_locations,
            },
        })
    }

    /// `TexImage3D`
    pub fn tex_image_3d(
        &self,
        target: TextureTarget,
        level: i32,
        internal_format: InternalFormat,
        width: i32,
        height: i32,
        depth: i32,
    ) -> GlResult<ImagePlan> {
        self.gate.check_target(target)?;
        if !target.accepts_image_3d() {
            return Err(GlError::invalid_enum(format!(
                "{:?} is not a valid target for TexImage3D",
                target
            )));
        }

        let texture = self.bound_texture(target)?;

        if level < 0 || level as u32 > self.max_level(target) {
            return Err(GlError::invalid_value(format!("level {level} is out of range")));
        }
        let (max_size, max_depth) = match target {
            TextureTarget::Texture3D => (
                self.limits.max_3d_texture_size,
                self.limits.max_3d_texture_size,
            ),
            _ => (
                self.limits.max_texture_size,
                self.limits.max_array_texture_layers - 1,
            ),
        };
        for (name, value, max) in [
            ("width", width, max_size),
            ("height", height, max_size),
            ("depth", depth, max_depth),
        ] {
            if value < 1 || value as u32 > max {
                return Err(GlError::invalid_value(format!(
                    "{name} {value} is outside [1, {max}]"
                )));
            }
        }

        if !internal_format.is_sized() {
            return Err(GlError::invalid_value(format!(
                "{:?} is not a sized internal format",
                internal_format
            )));
        }

        if texture.is_immutable() {
            return Err(GlError::invalid_operation(format!(
                "texture {} has immutable storage",
                texture.id().raw()
            )));
        }

        Ok(ImagePlan {
            texture: texture.id(),
            level: level as u32,
            storage: TextureStorage {
                internal_format,
                width: width as u32,
                height: height as u32,
                depth: depth as u32,
                samples: 0,
                fixed_sample_locations: true,
            },
        })
    }

    /// `TexParameteri`
    pub fn set_texture_parameter(
        &self,
        target: TextureTarget,
        pname: TextureParameter,
        value: i32,
    ) -> GlResult<ParameterPlan> {
        self.gate.check_target(target)?;

        if pname == TextureParameter::ImmutableFormat {
            return Err(GlError::invalid_enum("TEXTURE_IMMUTABLE_FORMAT is read-only"));
        }
        if target.is_multisample() && pname.is_sampler_state() {
            return Err(GlError::invalid_enum(format!(
                "{:?} has no sampler state; {:?} cannot be set",
                target, pname
            )));
        }

        let texture = self.bound_texture(target)?;

        match pname {
            TextureParameter::BaseLevel | TextureParameter::MaxLevel if value < 0 => {
                return Err(GlError::invalid_value(format!(
                    "{:?} must not be negative",
                    pname
                )));
            }
            TextureParameter::BaseLevel if target.is_multisample() && value != 0 => {
                return Err(GlError::invalid_operation(format!(
                    "base level of {:?} must be 0",
                    target
                )));
            }
            _ => {}
        }

        let allowed: &[u32] = match pname {
            TextureParameter::MinFilter => &[
                gl::NEAREST,
                gl::LINEAR,
                gl::NEAREST_MIPMAP_NEAREST,
                gl::LINEAR_MIPMAP_NEAREST,
                gl::NEAREST_MIPMAP_LINEAR,
                gl::LINEAR_MIPMAP_LINEAR,
            ],
            TextureParameter::MagFilter => &[gl::NEAREST, gl::LINEAR],
            TextureParameter::WrapS | TextureParameter::WrapT | TextureParameter::WrapR => {
                &[gl::REPEAT, gl::CLAMP_TO_EDGE, gl::MIRRORED_REPEAT]
            }
            TextureParameter::CompareMode => &[gl::NONE, gl::COMPARE_REF_TO_TEXTURE],
            _ => &[],
        };
        let enum_valued = !allowed.is_empty() || pname == TextureParameter::CompareFunc;
        if enum_valued {
            let valid = match pname {
                TextureParameter::CompareFunc => {
                    (gl::NEVER as i32..=gl::ALWAYS as i32).contains(&value)
                }
                _ => allowed.iter().any(|&v| v as i32 == value),
            };
            if !valid {
                return Err(GlError::invalid_enum(format!(
                    "0x{:04X} is not a valid value for {:?}",
                    value, pname
                )));
            }
        }

        Ok(ParameterPlan {
            texture: texture.id(),
            pname,
            value,
        })
    }

    /// `GetTexParameteriv`
    pub fn texture_parameter(&self, target: TextureTarget, pname: TextureParameter) -> GlResult<i32> {
        self.gate.check_target(target)?;
        if target.is_multisample() && pname.is_sampler_state() {
            return Err(GlError::invalid_enum(format!(
                "{:?} has no sampler state",
                target
            )));
        }
        let texture = self.bound_texture(target)?;
        Ok(texture.parameter(pname))
    }

    /// `GetTexLevelParameteriv`
    pub fn texture_level_parameter(
        &self,
        target: TextureTarget,
        level: i32,
        pname: LevelParameter,
    ) -> GlResult<i32> {
        self.gate.check_target(target)?;
        let texture = self.bound_texture(target)?;

        if level < 0 || level as u32 > self.max_level(target) {
            return Err(GlError::invalid_value(format!("level {level} is out of range")));
        }

        // Levels without an image report the initial values
        let Some(image) = texture.image(level as u32) else {
            return Ok(match pname {
                LevelParameter::InternalFormat => InternalFormat::Rgba.raw() as i32,
                LevelParameter::FixedSampleLocations => 1,
                _ => 0,
            });
        };

        Ok(match pname {
            LevelParameter::Width => image.width as i32,
            LevelParameter::Height => image.height as i32,
            LevelParameter::Depth => image.depth as i32,
            LevelParameter::Samples => image.samples as i32,
            LevelParameter::FixedSampleLocations => i32::from(image.fixed_sample_locations),
            LevelParameter::InternalFormat => image.internal_format.raw() as i32,
        })
    }

    fn framebuffer(&self, id: FramebufferId) -> GlResult<&'a Framebuffer> {
        self.framebuffers.get(&id).ok_or_else(|| {
            GlError::invalid_operation(format!(
                "framebuffer {} does not exist",
                id.raw()
            ))
        })
    }

    /// `FramebufferTexture2D` / `FramebufferTextureLayer`
    pub fn attach_texture(
        &self,
        entry: AttachEntry,
        framebuffer: FramebufferId,
        point: AttachmentPoint,
        texture: Option<TextureId>,
        level: i32,
    ) -> GlResult<AttachPlan> {
        self.framebuffer(framebuffer)?;

        if let AttachmentPoint::Color(index) = point {
            if u32::from(index) >= self.limits.max_color_attachments {
                return Err(GlError::invalid_operation(format!(
                    "color attachment {} exceeds MAX_COLOR_ATTACHMENTS",
                    index
                )));
            }
        }

        let Some(id) = texture else {
            return Ok(AttachPlan {
                framebuffer,
                point,
                attachment: None,
            });
        };

        let texture = self.textures.get(&id).ok_or_else(|| {
            GlError::invalid_operation(format!(
                "texture {} is not an existing texture object",
                id.raw()
            ))
        })?;
        let target = texture.target();
        self.gate.check_target(target)?;

        let compatible = match entry {
            AttachEntry::Texture => matches!(
                target,
                TextureTarget::Texture2D | TextureTarget::Texture2DMultisample
            ),
            AttachEntry::TextureLayer { .. } => target.is_layered(),
        };
        if !compatible {
            return Err(GlError::invalid_operation(format!(
                "texture {} ({:?}) cannot be attached with {:?}",
                id.raw(),
                target,
                entry
            )));
        }

        if level < 0 {
            return Err(GlError::invalid_value(format!("level {level} is negative")));
        }
        if target.is_multisample() && level != 0 {
            return Err(GlError::invalid_value(format!(
                "level of a {:?} attachment must be 0",
                target
            )));
        }
        if level as u32 > self.max_level(target) {
            return Err(GlError::invalid_value(format!("level {level} is out of range")));
        }

        let layer = match entry {
            AttachEntry::Texture => None,
            AttachEntry::TextureLayer { layer } => {
                let max_layers = match target {
                    TextureTarget::Texture3D => self.limits.max_3d_texture_size,
                    _ => self.limits.max_array_texture_layers,
                };
                if layer < 0 || layer as u32 >= max_layers {
                    return Err(GlError::invalid_value(format!(
                        "layer {layer} is outside [0, {max_layers})"
                    )));
                }
                Some(layer as u32)
            }
        };

        Ok(AttachPlan {
            framebuffer,
            point,
            attachment: Some(Attachment {
                texture: id,
                level: level as u32,
                layer,
            }),
        })
    }

    /// Completeness of an existing framebuffer
    pub fn framebuffer_status(&self, framebuffer: FramebufferId) -> GlResult<FramebufferStatus> {
        Ok(self.framebuffer(framebuffer)?.check_completeness(self.textures))
    }

    /// Sample count of the draw framebuffer, which must be complete
    pub fn draw_samples(
        &self,
        draw_framebuffer: Option<FramebufferId>,
        default_samples: u32,
    ) -> GlResult<u32> {
        let Some(id) = draw_framebuffer else {
            return Ok(default_samples);
        };
        let framebuffer = self.framebuffer(id)?;
        if !framebuffer.check_completeness(self.textures).is_complete() {
            return Err(GlError::invalid_operation(format!(
                "framebuffer {} is incomplete",
                id.raw()
            )));
        }
        Ok(framebuffer.samples(self.textures).unwrap_or(0))
    }
}
