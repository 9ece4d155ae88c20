//! Framebuffers and completeness
//!
//! Attachments hold texture ids, not textures. A deleted texture leaves its attachments in
//! place; the completeness check resolves every id again and reports what it cannot find.

use std::collections::BTreeMap;
use std::num::NonZeroU32;

use ahash::AHashMap;

use crate::enums::{gl, AttachmentPoint};
use crate::format::{FormatFlags, InternalFormat};
use crate::texture::{Texture, TextureId};

/// Framebuffer name. Name 0 (the default framebuffer) is `None` wherever it is optional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FramebufferId(NonZeroU32);

impl FramebufferId {
    /// `None` for the reserved name 0
    pub fn new(raw: u32) -> Option<Self> {
        NonZeroU32::new(raw).map(Self)
    }

    pub fn raw(self) -> u32 {
        self.0.get()
    }
}

/// One attachment slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attachment {
    pub texture: TextureId,
    pub level: u32,
    /// Set for layer attachments of array and 3D textures
    pub layer: Option<u32>,
}

/// Why a framebuffer is incomplete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncompleteReason {
    /// No attachments at all
    MissingAttachment,
    /// The attached texture was deleted
    DeletedTexture {
        point: AttachmentPoint,
        texture: TextureId,
    },
    /// The attached texture has no image at the attached level
    MissingImage {
        point: AttachmentPoint,
        texture: TextureId,
        level: u32,
    },
    /// The attached layer is past the texture's last layer
    LayerOutOfRange {
        point: AttachmentPoint,
        layer: u32,
        layers: u32,
    },
    /// The image format cannot be rendered at this attachment point
    IncompatibleFormat {
        point: AttachmentPoint,
        format: InternalFormat,
    },
}

/// Result of a completeness query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramebufferStatus {
    Complete,
    Incomplete(IncompleteReason),
}

impl FramebufferStatus {
    pub fn is_complete(&self) -> bool {
        matches!(self, FramebufferStatus::Complete)
    }

    /// GL status enum
    pub fn code(&self) -> u32 {
        match self {
            FramebufferStatus::Complete => gl::FRAMEBUFFER_COMPLETE,
            FramebufferStatus::Incomplete(IncompleteReason::MissingAttachment) => {
                gl::FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT
            }
            FramebufferStatus::Incomplete(_) => gl::FRAMEBUFFER_INCOMPLETE_ATTACHMENT,
        }
    }
}

/// Read access to live texture objects
pub trait TextureLookup {
    fn texture(&self, id: TextureId) -> Option<&Texture>;
}

impl TextureLookup for AHashMap<TextureId, Texture> {
    fn texture(&self, id: TextureId) -> Option<&Texture> {
        self.get(&id)
    }
}

/// A framebuffer object
#[derive(Debug, Clone)]
pub struct Framebuffer {
    id: FramebufferId,
    attachments: BTreeMap<AttachmentPoint, Attachment>,
}

impl Framebuffer {
    pub fn new(id: FramebufferId) -> Self {
        Self {
            id,
            attachments: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> FramebufferId {
        self.id
    }

    pub fn attachment(&self, point: AttachmentPoint) -> Option<&Attachment> {
        self.attachments.get(&point)
    }

    /// Attachments in attachment-point order
    pub fn attachments(&self) -> impl Iterator<Item = (AttachmentPoint, &Attachment)> {
        self.attachments.iter().map(|(point, attachment)| (*point, attachment))
    }

    /// Attach, replacing whatever was there
    pub fn attach(&mut self, point: AttachmentPoint, attachment: Attachment) {
        self.attachments.insert(point, attachment);
    }

    pub fn detach(&mut self, point: AttachmentPoint) {
        self.attachments.remove(&point);
    }

    /// Evaluate completeness against the current texture objects
    pub fn check_completeness(&self, textures: &impl TextureLookup) -> FramebufferStatus {
        if self.attachments.is_empty() {
            return FramebufferStatus::Incomplete(IncompleteReason::MissingAttachment);
        }

        for (point, attachment) in self.attachments() {
            if let Err(reason) = check_attachment(point, attachment, textures) {
                log::debug!(
                    "Framebuffer {} incomplete: {:?}",
                    self.id.raw(),
                    reason
                );
                return FramebufferStatus::Incomplete(reason);
            }
        }

        FramebufferStatus::Complete
    }

    /// Sample count of the first attachment, for a complete framebuffer
    pub fn samples(&self, textures: &impl TextureLookup) -> Option<u32> {
        let (_, attachment) = self.attachments().next()?;
        textures
            .texture(attachment.texture)?
            .image(attachment.level)
            .map(|image| image.samples)
    }
}

fn check_attachment(
    point: AttachmentPoint,
    attachment: &Attachment,
    textures: &impl TextureLookup,
) -> Result<(), IncompleteReason> {
    let texture = textures
        .texture(attachment.texture)
        .ok_or(IncompleteReason::DeletedTexture {
            point,
            texture: attachment.texture,
        })?;

    let image = texture
        .image(attachment.level)
        .ok_or(IncompleteReason::MissingImage {
            point,
            texture: attachment.texture,
            level: attachment.level,
        })?;

    if !image.internal_format.flags().contains(required_flags(point)) {
        return Err(IncompleteReason::IncompatibleFormat {
            point,
            format: image.internal_format,
        });
    }

    if let Some(layer) = attachment.layer {
        if layer >= image.depth {
            return Err(IncompleteReason::LayerOutOfRange {
                point,
                layer,
                layers: image.depth,
            });
        }
    }

    Ok(())
}

/// Format capabilities an image needs to be attached at `point`
fn required_flags(point: AttachmentPoint) -> FormatFlags {
    match point {
        AttachmentPoint::Color(_) => FormatFlags::COLOR_RENDERABLE,
        AttachmentPoint::Depth => FormatFlags::DEPTH,
        AttachmentPoint::Stencil => FormatFlags::STENCIL,
        AttachmentPoint::DepthStencil => FormatFlags::DEPTH | FormatFlags::STENCIL,
    }
}
