//! Extension gate
//!
//! Tri-state extension flags plus the version gating of core multisample enums. Any call that
//! names a gated target or enum is rejected with `InvalidEnum` here, before its other
//! arguments are looked at.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::config::ApiVersion;
use crate::enums::{IntegerCap, TextureTarget};
use crate::{GlError, GlResult};

/// Optional extensions known to this implementation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Extension {
    /// `TEXTURE_2D_MULTISAMPLE_ARRAY` textures
    TextureMultisampleArray,
}

impl Extension {
    pub const ALL: [Extension; 1] = [Extension::TextureMultisampleArray];

    /// Extension string
    pub fn name(self) -> &'static str {
        match self {
            Extension::TextureMultisampleArray => "GL_ANGLE_texture_multisample_array",
        }
    }

    /// Look up an extension by its string
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|ext| ext.name() == name)
    }

    /// Oldest client version the extension can be exposed on
    pub fn min_version(self) -> ApiVersion {
        match self {
            Extension::TextureMultisampleArray => ApiVersion::ES_3_1,
        }
    }
}

/// Extension availability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtensionState {
    /// Not offered by this context
    Unsupported,
    /// Offered, but must be requested first
    Requestable,
    /// Usable
    Enabled,
}

/// Gate for optional targets and enums
#[derive(Debug, Clone)]
pub struct ExtensionGate {
    version: ApiVersion,
    states: AHashMap<Extension, ExtensionState>,
}

impl ExtensionGate {
    /// Create a gate. In WebGL compatibility mode supported extensions start out requestable,
    /// otherwise they start enabled.
    pub fn new(version: ApiVersion, supported: &[Extension], webgl_compatibility: bool) -> Self {
        let states = Extension::ALL
            .into_iter()
            .map(|ext| {
                let state = if !supported.contains(&ext) {
                    ExtensionState::Unsupported
                } else if !version.is_at_least(ext.min_version().major, ext.min_version().minor) {
                    log::warn!(
                        "{} needs {} but the context is {}; not exposing it",
                        ext.name(),
                        ext.min_version(),
                        version
                    );
                    ExtensionState::Unsupported
                } else if webgl_compatibility {
                    ExtensionState::Requestable
                } else {
                    ExtensionState::Enabled
                };
                (ext, state)
            })
            .collect();

        Self { version, states }
    }

    /// Client version the gate checks against
    pub fn version(&self) -> ApiVersion {
        self.version
    }

    /// State of an extension
    pub fn state(&self, ext: Extension) -> ExtensionState {
        self.states
            .get(&ext)
            .copied()
            .unwrap_or(ExtensionState::Unsupported)
    }

    /// Whether the named extension can be requested right now
    pub fn requestable(&self, name: &str) -> bool {
        Extension::from_name(name)
            .is_some_and(|ext| self.state(ext) == ExtensionState::Requestable)
    }

    /// Whether the named extension is enabled
    pub fn enabled(&self, name: &str) -> bool {
        Extension::from_name(name).is_some_and(|ext| self.is_enabled(ext))
    }

    pub fn is_enabled(&self, ext: Extension) -> bool {
        self.state(ext) == ExtensionState::Enabled
    }

    /// Enable a requestable extension. Requesting an enabled one is a no-op.
    pub fn request(&mut self, name: &str) -> GlResult<()> {
        let ext = Extension::from_name(name).ok_or_else(|| {
            GlError::invalid_operation(format!("extension {name} is not requestable"))
        })?;

        match self.state(ext) {
            ExtensionState::Requestable => {
                self.states.insert(ext, ExtensionState::Enabled);
                log::debug!("Enabled extension {}", ext.name());
                Ok(())
            }
            ExtensionState::Enabled => Ok(()),
            ExtensionState::Unsupported => Err(GlError::invalid_operation(format!(
                "extension {name} is not requestable"
            ))),
        }
    }

    /// Names of enabled extensions
    pub fn enabled_names(&self) -> Vec<&'static str> {
        Extension::ALL
            .into_iter()
            .filter(|ext| self.is_enabled(*ext))
            .map(Extension::name)
            .collect()
    }

    /// Reject a target that is not exposed by this context
    pub fn check_target(&self, target: TextureTarget) -> GlResult<()> {
        let exposed = match target {
            TextureTarget::Texture2DMultisample => self.version.has_multisample_textures(),
            TextureTarget::Texture2DMultisampleArray => {
                self.is_enabled(Extension::TextureMultisampleArray)
            }
            _ => true,
        };

        if exposed {
            Ok(())
        } else {
            Err(GlError::invalid_enum(format!(
                "{:?} is not available in this context",
                target
            )))
        }
    }

    /// Reject an integer cap that is not exposed by this context
    pub fn check_integer_cap(&self, cap: IntegerCap) -> GlResult<()> {
        if cap.requires_multisample_textures() && !self.version.has_multisample_textures() {
            return Err(GlError::invalid_enum(format!(
                "{:?} is not available in {}",
                cap, self.version
            )));
        }
        Ok(())
    }
}
