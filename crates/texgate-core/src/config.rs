//! Context configuration
//!
//! Everything a context needs to know about the implementation it fronts: client version,
//! integer limits, supported extensions and optional per-format sample-count data. Profiles
//! are plain serde data so they can be loaded from JSON.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::enums::TextureTarget;
use crate::extensions::Extension;
use crate::format::InternalFormat;
use crate::sample_pattern::MAX_PATTERN_SAMPLES;

/// Configuration errors, raised at context construction only
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Limit {0} must be at least 1")]
    ZeroLimit(&'static str),

    #[error("Limit {0} holds the integer-maximum sentinel")]
    SentinelLimit(&'static str),

    #[error("Limit {name} = {value} exceeds the {max}-sample standard pattern")]
    SampleCapTooLarge {
        name: &'static str,
        value: u32,
        max: u32,
    },

    #[error("Invalid sample count override for {target:?}/{format:?}: {reason}")]
    InvalidOverride {
        target: TextureTarget,
        format: InternalFormat,
        reason: String,
    },

    #[error("Default framebuffer samples {0} exceed MAX_SAMPLES")]
    DefaultFramebufferSamples(u32),
}

/// Result type for configuration
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Client API version
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ApiVersion {
    pub major: u32,
    pub minor: u32,
}

impl ApiVersion {
    pub const ES_3_0: Self = Self::new(3, 0);
    pub const ES_3_1: Self = Self::new(3, 1);

    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Is at least version
    pub const fn is_at_least(&self, major: u32, minor: u32) -> bool {
        self.major > major || (self.major == major && self.minor >= minor)
    }

    /// Whether `TEXTURE_2D_MULTISAMPLE` and its caps are part of the core API
    pub const fn has_multisample_textures(&self) -> bool {
        self.is_at_least(3, 1)
    }
}

impl std::fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ES {}.{}", self.major, self.minor)
    }
}

/// Integer implementation limits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limits {
    pub max_texture_size: u32,
    pub max_3d_texture_size: u32,
    pub max_array_texture_layers: u32,
    pub max_color_attachments: u32,
    pub max_samples: u32,
    pub max_integer_samples: u32,
    pub max_color_texture_samples: u32,
    pub max_depth_texture_samples: u32,
}

impl Limits {
    /// Limits of a typical D3D11 feature level 11 device
    pub fn d3d11() -> Self {
        Self {
            max_texture_size: 16384,
            max_3d_texture_size: 2048,
            max_array_texture_layers: 2048,
            max_color_attachments: 8,
            max_samples: 8,
            max_integer_samples: 4,
            max_color_texture_samples: 8,
            max_depth_texture_samples: 8,
        }
    }

    /// Limits of a typical desktop GL driver
    pub fn desktop_gl() -> Self {
        Self {
            max_texture_size: 16384,
            max_3d_texture_size: 2048,
            max_array_texture_layers: 2048,
            max_color_attachments: 8,
            max_samples: 16,
            max_integer_samples: 8,
            max_color_texture_samples: 16,
            max_depth_texture_samples: 16,
        }
    }

    fn named(&self) -> [(&'static str, u32); 8] {
        [
            ("MAX_TEXTURE_SIZE", self.max_texture_size),
            ("MAX_3D_TEXTURE_SIZE", self.max_3d_texture_size),
            ("MAX_ARRAY_TEXTURE_LAYERS", self.max_array_texture_layers),
            ("MAX_COLOR_ATTACHMENTS", self.max_color_attachments),
            ("MAX_SAMPLES", self.max_samples),
            ("MAX_INTEGER_SAMPLES", self.max_integer_samples),
            ("MAX_COLOR_TEXTURE_SAMPLES", self.max_color_texture_samples),
            ("MAX_DEPTH_TEXTURE_SAMPLES", self.max_depth_texture_samples),
        ]
    }

    /// Check floors, sentinels and sample caps
    pub fn validate(&self) -> ConfigResult<()> {
        for (name, value) in self.named() {
            if value == 0 {
                return Err(ConfigError::ZeroLimit(name));
            }
            if value >= i32::MAX as u32 {
                return Err(ConfigError::SentinelLimit(name));
            }
        }

        let sample_caps = [
            ("MAX_SAMPLES", self.max_samples),
            ("MAX_INTEGER_SAMPLES", self.max_integer_samples),
            ("MAX_COLOR_TEXTURE_SAMPLES", self.max_color_texture_samples),
            ("MAX_DEPTH_TEXTURE_SAMPLES", self.max_depth_texture_samples),
        ];
        for (name, value) in sample_caps {
            if value > MAX_PATTERN_SAMPLES {
                return Err(ConfigError::SampleCapTooLarge {
                    name,
                    value,
                    max: MAX_PATTERN_SAMPLES,
                });
            }
        }

        Ok(())
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self::d3d11()
    }
}

/// Driver-reported sample counts for one (target, format) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleCountOverride {
    pub target: TextureTarget,
    pub format: InternalFormat,
    /// Descending sample counts
    pub counts: Vec<u32>,
}

impl SampleCountOverride {
    pub fn validate(&self) -> ConfigResult<()> {
        let fail = |reason: &str| ConfigError::InvalidOverride {
            target: self.target,
            format: self.format,
            reason: reason.to_string(),
        };

        if !self.target.is_multisample() {
            return Err(fail("target is not a multisample target"));
        }
        if !self.format.is_renderable() {
            return Err(fail("format is not renderable"));
        }
        if self.counts.is_empty() {
            return Err(fail("no sample counts"));
        }
        if self.counts.windows(2).any(|pair| pair[0] <= pair[1]) {
            return Err(fail("sample counts are not strictly descending"));
        }
        if self.counts.iter().any(|&count| count == 0) {
            return Err(fail("sample count 0"));
        }
        if self.counts[0] > MAX_PATTERN_SAMPLES {
            return Err(fail("sample count exceeds the standard pattern"));
        }
        Ok(())
    }
}

/// Context configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextConfig {
    /// Client API version
    pub client_version: ApiVersion,
    /// WebGL compatibility: extensions must be requested before use
    #[serde(default)]
    pub webgl_compatibility: bool,
    /// Integer limits
    pub limits: Limits,
    /// Extensions the implementation can expose
    #[serde(default)]
    pub supported_extensions: Vec<Extension>,
    /// Replacements for generated sample-count entries
    #[serde(default)]
    pub sample_count_overrides: Vec<SampleCountOverride>,
    /// Sample count of the default framebuffer
    #[serde(default)]
    pub default_framebuffer_samples: u32,
}

impl ContextConfig {
    /// ES 3.1 on D3D11
    pub fn es31_d3d11() -> Self {
        Self {
            client_version: ApiVersion::ES_3_1,
            webgl_compatibility: false,
            limits: Limits::d3d11(),
            supported_extensions: vec![Extension::TextureMultisampleArray],
            sample_count_overrides: Vec::new(),
            default_framebuffer_samples: 0,
        }
    }

    /// ES 3.1 on desktop GL
    pub fn es31_opengl() -> Self {
        Self {
            limits: Limits::desktop_gl(),
            ..Self::es31_d3d11()
        }
    }

    /// ES 3.0 on desktop GL; multisample textures are not exposed
    pub fn es3_opengl() -> Self {
        Self {
            client_version: ApiVersion::ES_3_0,
            supported_extensions: Vec::new(),
            ..Self::es31_opengl()
        }
    }

    /// ES 3.1 on D3D11 in WebGL compatibility mode
    pub fn es31_webgl() -> Self {
        Self {
            webgl_compatibility: true,
            ..Self::es31_d3d11()
        }
    }

    /// Look up a preset by name
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "es31-d3d11" => Some(Self::es31_d3d11()),
            "es31-opengl" => Some(Self::es31_opengl()),
            "es3-opengl" => Some(Self::es3_opengl()),
            "es31-webgl" => Some(Self::es31_webgl()),
            _ => None,
        }
    }

    /// Preset names accepted by [`ContextConfig::preset`]
    pub const PRESETS: [&'static str; 4] = ["es31-d3d11", "es31-opengl", "es3-opengl", "es31-webgl"];

    /// Validate limits and overrides
    pub fn validate(&self) -> ConfigResult<()> {
        self.limits.validate()?;
        for entry in &self.sample_count_overrides {
            entry.validate()?;
        }
        if self.default_framebuffer_samples > self.limits.max_samples {
            return Err(ConfigError::DefaultFramebufferSamples(
                self.default_framebuffer_samples,
            ));
        }
        Ok(())
    }
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self::es31_d3d11()
    }
}
