/// Attachment - one GPU-side surface bound to a render target slot

use crate::device::{RenderbufferId, TextureId};

/// The kind of surface backing an attachment slot.
///
/// `*Texture` variants are sampleable by later stages; `*Buffer` variants
/// are not, and are mandatory when the sample count is above 1 (multisampled
/// storage cannot be sampled directly). `None` disables the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentKind {
    /// Sampleable color surface
    ColorTexture,
    /// Fast, non-sampleable color surface (required for multisampling)
    ColorBuffer,
    /// Sampleable depth surface
    DepthTexture,
    /// Non-sampleable depth surface
    DepthBuffer,
    /// No attachment in this slot
    None,
}

impl AttachmentKind {
    /// Whether a surface of this kind can be bound for sampling
    pub fn is_sampleable(self) -> bool {
        matches!(self, AttachmentKind::ColorTexture | AttachmentKind::DepthTexture)
    }

    /// Whether this kind occupies a color slot
    pub fn is_color(self) -> bool {
        matches!(self, AttachmentKind::ColorTexture | AttachmentKind::ColorBuffer)
    }

    /// Whether this kind occupies the depth slot
    pub fn is_depth(self) -> bool {
        matches!(self, AttachmentKind::DepthTexture | AttachmentKind::DepthBuffer)
    }
}

/// Backend handle of a created attachment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentHandle {
    /// Sampleable texture storage
    Texture(TextureId),
    /// Renderbuffer storage
    Renderbuffer(RenderbufferId),
}

/// A single created surface owned by exactly one render target.
///
/// Attachments are created at render-target construction time and destroyed
/// with their owner. `AttachmentKind::None` is never stored here — an absent
/// slot is simply absent.
#[derive(Debug, Clone, Copy)]
pub struct Attachment {
    kind: AttachmentKind,
    handle: AttachmentHandle,
}

impl Attachment {
    /// Internal only — created by RenderTarget construction
    pub(crate) fn new(kind: AttachmentKind, handle: AttachmentHandle) -> Self {
        debug_assert!(kind != AttachmentKind::None);
        Self { kind, handle }
    }

    /// The kind of surface backing this attachment
    pub fn kind(&self) -> AttachmentKind {
        self.kind
    }

    /// The backend handle of this attachment
    pub fn handle(&self) -> AttachmentHandle {
        self.handle
    }

    /// The texture handle, if this attachment is texture-backed
    pub fn texture(&self) -> Option<TextureId> {
        match self.handle {
            AttachmentHandle::Texture(id) => Some(id),
            AttachmentHandle::Renderbuffer(_) => None,
        }
    }
}

#[cfg(test)]
#[path = "attachment_tests.rs"]
mod tests;
