//! Texture objects
//!
//! Per-object state. Multisample objects move from `Uninitialized` to `Immutable` exactly
//! once, on a successful storage allocation; after that their format, geometry and sample
//! count never change. Objects of the ordinary targets keep mutable per-level images.

use std::collections::BTreeMap;
use std::num::NonZeroU32;

use crate::enums::{gl, TextureParameter, TextureTarget};
use crate::format::InternalFormat;
use crate::{GlError, GlResult};

/// Texture name. Name 0 ("no texture") is `None` wherever a texture is optional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(NonZeroU32);

impl TextureId {
    /// `None` for the reserved name 0
    pub fn new(raw: u32) -> Option<Self> {
        NonZeroU32::new(raw).map(Self)
    }

    pub fn raw(self) -> u32 {
        self.0.get()
    }
}

/// Format, geometry and sample layout of one image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureStorage {
    pub internal_format: InternalFormat,
    pub width: u32,
    pub height: u32,
    /// Depth for 3D images, layer count for arrays, 1 otherwise
    pub depth: u32,
    /// 0 for single-sampled images
    pub samples: u32,
    pub fixed_sample_locations: bool,
}

/// Format state of a texture object
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextureState {
    Uninitialized,
    Immutable(TextureStorage),
}

/// Sampling and mip range parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplerParams {
    pub min_filter: u32,
    pub mag_filter: u32,
    pub wrap_s: u32,
    pub wrap_t: u32,
    pub wrap_r: u32,
    pub min_lod: i32,
    pub max_lod: i32,
    pub compare_mode: u32,
    pub compare_func: u32,
    pub base_level: i32,
    pub max_level: i32,
}

impl Default for SamplerParams {
    fn default() -> Self {
        Self {
            min_filter: gl::NEAREST_MIPMAP_LINEAR,
            mag_filter: gl::LINEAR,
            wrap_s: gl::REPEAT,
            wrap_t: gl::REPEAT,
            wrap_r: gl::REPEAT,
            min_lod: -1000,
            max_lod: 1000,
            compare_mode: gl::NONE,
            compare_func: gl::LEQUAL,
            base_level: 0,
            max_level: 1000,
        }
    }
}

/// A texture object
#[derive(Debug, Clone)]
pub struct Texture {
    id: TextureId,
    target: TextureTarget,
    state: TextureState,
    params: SamplerParams,
    /// Mutable images by level, ordinary targets only
    images: BTreeMap<u32, TextureStorage>,
}

impl Texture {
    /// Create an object on first bind
    pub fn new(id: TextureId, target: TextureTarget) -> Self {
        Self {
            id,
            target,
            state: TextureState::Uninitialized,
            params: SamplerParams::default(),
            images: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> TextureId {
        self.id
    }

    pub fn target(&self) -> TextureTarget {
        self.target
    }

    pub fn state(&self) -> &TextureState {
        &self.state
    }

    pub fn params(&self) -> &SamplerParams {
        &self.params
    }

    /// `TEXTURE_IMMUTABLE_FORMAT`
    pub fn is_immutable(&self) -> bool {
        matches!(self.state, TextureState::Immutable(_))
    }

    /// Image backing `level`, if any
    pub fn image(&self, level: u32) -> Option<&TextureStorage> {
        match &self.state {
            TextureState::Immutable(storage) if level == 0 => Some(storage),
            TextureState::Immutable(_) => None,
            TextureState::Uninitialized => self.images.get(&level),
        }
    }

    /// Commit validated storage: the one `Uninitialized -> Immutable` transition
    pub fn commit_storage(&mut self, storage: TextureStorage) -> GlResult<()> {
        if self.is_immutable() {
            return Err(GlError::invalid_operation(format!(
                "texture {} already has immutable storage",
                self.id.raw()
            )));
        }
        self.state = TextureState::Immutable(storage);
        log::debug!(
            "Texture {} is now immutable: {:?} {}x{}x{} samples={}",
            self.id.raw(),
            storage.internal_format,
            storage.width,
            storage.height,
            storage.depth,
            storage.samples
        );
        Ok(())
    }

    /// Replace the mutable image at `level`
    pub fn set_image(&mut self, level: u32, storage: TextureStorage) -> GlResult<()> {
        if self.is_immutable() || self.target.is_multisample() {
            return Err(GlError::invalid_operation(format!(
                "texture {} does not accept mutable images",
                self.id.raw()
            )));
        }
        self.images.insert(level, storage);
        Ok(())
    }

    /// Store a validated parameter value
    pub fn set_parameter(&mut self, pname: TextureParameter, value: i32) {
        let params = &mut self.params;
        match pname {
            TextureParameter::MinFilter => params.min_filter = value as u32,
            TextureParameter::MagFilter => params.mag_filter = value as u32,
            TextureParameter::WrapS => params.wrap_s = value as u32,
            TextureParameter::WrapT => params.wrap_t = value as u32,
            TextureParameter::WrapR => params.wrap_r = value as u32,
            TextureParameter::MinLod => params.min_lod = value,
            TextureParameter::MaxLod => params.max_lod = value,
            TextureParameter::CompareMode => params.compare_mode = value as u32,
            TextureParameter::CompareFunc => params.compare_func = value as u32,
            TextureParameter::BaseLevel => params.base_level = value,
            TextureParameter::MaxLevel => params.max_level = value,
            TextureParameter::ImmutableFormat => {}
        }
    }

    /// Current parameter value
    pub fn parameter(&self, pname: TextureParameter) -> i32 {
        let params = &self.params;
        match pname {
            TextureParameter::MinFilter => params.min_filter as i32,
            TextureParameter::MagFilter => params.mag_filter as i32,
            TextureParameter::WrapS => params.wrap_s as i32,
            TextureParameter::WrapT => params.wrap_t as i32,
            TextureParameter::WrapR => params.wrap_r as i32,
            TextureParameter::MinLod => params.min_lod,
            TextureParameter::MaxLod => params.max_lod,
            TextureParameter::CompareMode => params.compare_mode as i32,
            TextureParameter::CompareFunc => params.compare_func as i32,
            TextureParameter::BaseLevel => params.base_level,
            TextureParameter::MaxLevel => params.max_level,
            TextureParameter::ImmutableFormat => i32::from(self.is_immutable()),
        }
    }
}
