//! # Texgate Core
//!
//! Validation and capability core for multisample textures in a GLES-style API server.
//!
//! This crate decides whether calls touching `TEXTURE_2D_MULTISAMPLE` and
//! `TEXTURE_2D_MULTISAMPLE_ARRAY` objects are legal, which error they raise, and which
//! state they commit:
//! - **Capabilities**: per-format sample-count table built once from device limits
//! - **Extensions**: tri-state extension flags and client-version gating
//! - **Textures**: immutable-format state machine for texture objects
//! - **Validation**: ordered legality checks, first failure wins
//! - **Framebuffers**: weak attachments and lazy completeness evaluation
//!
//! Actual GPU execution is out of scope; nothing here stores or resolves samples.

pub mod caps;
pub mod config;
pub mod context;
pub mod enums;
pub mod extensions;
pub mod format;
pub mod framebuffer;
pub mod sample_pattern;
pub mod texture;
pub mod validation;

pub use caps::CapabilityTable;
pub use config::{ApiVersion, ConfigError, ContextConfig, Limits};
pub use context::Context;
pub use enums::{AttachmentPoint, IntegerCap, LevelParameter, TextureParameter, TextureTarget};
pub use extensions::{Extension, ExtensionGate, ExtensionState};
pub use format::{FormatCategory, InternalFormat};
pub use framebuffer::{FramebufferId, FramebufferStatus, IncompleteReason};
pub use texture::{Texture, TextureId, TextureState, TextureStorage};

use thiserror::Error;

/// The three error kinds reported at the API boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Unrecognized enum, or a gated enum whose extension is not enabled
    Enum,
    /// Numeric argument out of range
    Value,
    /// Call is well-formed but illegal in the current state
    Operation,
}

/// API errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GlError {
    #[error("GL_INVALID_ENUM: {0}")]
    InvalidEnum(String),

    #[error("GL_INVALID_VALUE: {0}")]
    InvalidValue(String),

    #[error("GL_INVALID_OPERATION: {0}")]
    InvalidOperation(String),
}

impl GlError {
    /// Error kind, without the message
    pub fn kind(&self) -> ErrorKind {
        match self {
            GlError::InvalidEnum(_) => ErrorKind::Enum,
            GlError::InvalidValue(_) => ErrorKind::Value,
            GlError::InvalidOperation(_) => ErrorKind::Operation,
        }
    }

    /// Numeric GL error code
    pub fn code(&self) -> u32 {
        match self.kind() {
            ErrorKind::Enum => enums::gl::INVALID_ENUM,
            ErrorKind::Value => enums::gl::INVALID_VALUE,
            ErrorKind::Operation => enums::gl::INVALID_OPERATION,
        }
    }

    pub(crate) fn invalid_enum(msg: impl Into<String>) -> Self {
        GlError::InvalidEnum(msg.into())
    }

    pub(crate) fn invalid_value(msg: impl Into<String>) -> Self {
        GlError::InvalidValue(msg.into())
    }

    pub(crate) fn invalid_operation(msg: impl Into<String>) -> Self {
        GlError::InvalidOperation(msg.into())
    }
}

/// Result type for API calls
pub type GlResult<T> = Result<T, GlError>;
