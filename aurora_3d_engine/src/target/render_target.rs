/// Render target - an aggregate of color/depth attachments with multisample
/// handling and a lazily-refreshed resolve cache.
///
/// A target is constructed against a `GraphicsDevice` and owns every surface
/// it creates. Multisampled (or otherwise buffer-backed) targets cannot be
/// sampled directly; they own a single-sample resolve companion that serves
/// read requests, refreshed only when the target has been written since the
/// last resolve (`dirty` tracking).

use std::sync::Arc;

use glam::Vec4;

use crate::device::{limits, BlitFilter, ClearFlags, FramebufferId, GraphicsDevice, TextureId};
use crate::error::{Error, Result};
use super::attachment::{Attachment, AttachmentHandle, AttachmentKind};

const SOURCE: &str = "aurora3d::RenderTarget";

// ============================================================================
// Descriptor
// ============================================================================

/// Construction parameters for a render target.
///
/// The configuration is a matrix, not an overload set: pick a color kind, a
/// depth kind, a sample count and the highest color-attachment index. The
/// index is clamped to the device limit at construction — asking for more
/// targets than the device supports degrades silently instead of failing.
#[derive(Debug, Clone)]
pub struct RenderTargetDesc {
    /// Width in pixels (must be > 0)
    pub width: u32,
    /// Height in pixels (must be > 0)
    pub height: u32,
    /// Color slot kind: `ColorTexture`, `ColorBuffer` or `None`
    pub color: AttachmentKind,
    /// Depth slot kind: `DepthTexture`, `DepthBuffer` or `None`
    pub depth: AttachmentKind,
    /// Samples per pixel; values below 1 are treated as 1, above 1 marks the
    /// target multisampled and forces buffer-backed color storage
    pub samples: u32,
    /// Highest color attachment index (0 = single target)
    pub max_target_index: u32,
    /// Clear color applied on every bind-for-write
    pub clear_color: Vec4,
}

impl RenderTargetDesc {
    /// The most common configuration: one sampleable color texture, a depth
    /// renderbuffer, no multisampling.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            color: AttachmentKind::ColorTexture,
            depth: AttachmentKind::DepthBuffer,
            samples: 1,
            max_target_index: 0,
            clear_color: Vec4::new(0.0, 0.0, 0.0, 1.0),
        }
    }
}

// ============================================================================
// Write binding guard
// ============================================================================

/// Scoped write binding returned by `RenderTarget::bind_for_write`.
///
/// While alive, the target is the active draw destination with its own
/// viewport. Dropping the guard restores the display surface and its
/// viewport on every exit path, including early returns and panics.
pub struct WriteBinding {
    device: Arc<dyn GraphicsDevice>,
}

impl Drop for WriteBinding {
    fn drop(&mut self) {
        RenderTarget::unbind(self.device.as_ref());
    }
}

// ============================================================================
// Render target
// ============================================================================

/// A render target with 0..N color attachments and 0..1 depth attachment.
pub struct RenderTarget {
    device: Arc<dyn GraphicsDevice>,
    framebuffer: FramebufferId,
    width: u32,
    height: u32,
    samples: u32,
    max_target_index: u32,
    color_attachments: Vec<Attachment>,
    depth_attachment: Option<Attachment>,
    /// Single-sample shadow serving reads of buffer-backed targets.
    /// Created once at construction, never recreated.
    resolve_companion: Option<Box<RenderTarget>>,
    clear_color: Vec4,
    /// Written since the companion was last refreshed
    dirty: bool,
    disposed: bool,
}

impl RenderTarget {
    /// Create a render target from a descriptor.
    ///
    /// Buffer fallback rule: when `samples > 1`, color storage is always
    /// buffer-backed regardless of the requested color kind, and a
    /// single-sample, texture-backed resolve companion is created to serve
    /// reads. The same applies to an explicit `ColorBuffer` request.
    ///
    /// # Errors
    ///
    /// `Error::InvalidConfiguration` on zero dimensions or a depth kind in
    /// the color slot (and vice versa). Requesting more color targets than
    /// the device supports is NOT an error — the index is clamped.
    pub fn new(device: &Arc<dyn GraphicsDevice>, desc: &RenderTargetDesc) -> Result<Self> {
        if desc.width == 0 || desc.height == 0 {
            let message = format!(
                "render target dimensions must be > 0 (got {}x{})",
                desc.width, desc.height
            );
            crate::engine_error!(SOURCE, "{}", message);
            return Err(Error::InvalidConfiguration(message));
        }
        if desc.color != AttachmentKind::None && !desc.color.is_color() {
            let message = format!("{:?} is not a valid color attachment kind", desc.color);
            crate::engine_error!(SOURCE, "{}", message);
            return Err(Error::InvalidConfiguration(message));
        }
        if desc.depth != AttachmentKind::None && !desc.depth.is_depth() {
            let message = format!("{:?} is not a valid depth attachment kind", desc.depth);
            crate::engine_error!(SOURCE, "{}", message);
            return Err(Error::InvalidConfiguration(message));
        }

        let samples = desc.samples.max(1);
        let device_limit = limits::max_color_targets(device.as_ref());
        let mut max_target_index = desc.max_target_index.min(device_limit);
        if max_target_index != desc.max_target_index {
            crate::engine_warn!(
                SOURCE,
                "Requested max target index {} clamped to device limit {}",
                desc.max_target_index,
                max_target_index
            );
        }

        let framebuffer = device.create_framebuffer()?;
        let mut color_attachments = Vec::new();
        let mut resolve_companion = None;

        match desc.color {
            AttachmentKind::None => {
                // Depth-only target (e.g. a shadow map): no color output.
                device.set_draw_buffers(framebuffer, 0)?;
                max_target_index = 0;
            }
            _ if samples > 1 || desc.color == AttachmentKind::ColorBuffer => {
                for index in 0..=max_target_index {
                    let id = device.create_color_renderbuffer(desc.width, desc.height, samples)?;
                    device.attach_color_renderbuffer(framebuffer, index, id)?;
                    color_attachments.push(Attachment::new(
                        AttachmentKind::ColorBuffer,
                        AttachmentHandle::Renderbuffer(id),
                    ));
                }
                device.set_draw_buffers(framebuffer, max_target_index + 1)?;
                let companion_desc = RenderTargetDesc {
                    width: desc.width,
                    height: desc.height,
                    color: AttachmentKind::ColorTexture,
                    depth: desc.depth,
                    samples: 1,
                    max_target_index,
                    clear_color: desc.clear_color,
                };
                resolve_companion = Some(Box::new(RenderTarget::new(device, &companion_desc)?));
            }
            _ => {
                for index in 0..=max_target_index {
                    let id = device.create_color_texture(desc.width, desc.height)?;
                    device.attach_color_texture(framebuffer, index, id)?;
                    color_attachments.push(Attachment::new(
                        AttachmentKind::ColorTexture,
                        AttachmentHandle::Texture(id),
                    ));
                }
                device.set_draw_buffers(framebuffer, max_target_index + 1)?;
            }
        }

        let depth_attachment = match desc.depth {
            AttachmentKind::DepthTexture => {
                let id = device.create_depth_texture(desc.width, desc.height)?;
                device.attach_depth_texture(framebuffer, id)?;
                Some(Attachment::new(
                    AttachmentKind::DepthTexture,
                    AttachmentHandle::Texture(id),
                ))
            }
            AttachmentKind::DepthBuffer => {
                let id = device.create_depth_renderbuffer(desc.width, desc.height, samples)?;
                device.attach_depth_renderbuffer(framebuffer, id)?;
                Some(Attachment::new(
                    AttachmentKind::DepthBuffer,
                    AttachmentHandle::Renderbuffer(id),
                ))
            }
            _ => None,
        };

        crate::engine_debug!(
            SOURCE,
            "Created {}x{} target ({} samples, {} color attachments)",
            desc.width,
            desc.height,
            samples,
            color_attachments.len()
        );

        Ok(Self {
            device: Arc::clone(device),
            framebuffer,
            width: desc.width,
            height: desc.height,
            samples,
            max_target_index,
            color_attachments,
            depth_attachment,
            resolve_companion,
            clear_color: desc.clear_color,
            dirty: false,
            disposed: false,
        })
    }

    // ===== BINDING =====

    /// Bind this target as the active write destination.
    ///
    /// Sets the viewport to the target size, clears color and depth, and
    /// marks the resolve cache stale — a bound target is conservatively
    /// assumed written. The returned guard restores the display surface when
    /// dropped.
    pub fn bind_for_write(&mut self) -> Result<WriteBinding> {
        self.ensure_live()?;
        self.device.bind_framebuffer(self.framebuffer)?;
        self.device.set_viewport(self.width, self.height);
        self.device.set_clear_color(self.clear_color);
        self.device.clear(ClearFlags::COLOR | ClearFlags::DEPTH);
        self.dirty = true;
        Ok(WriteBinding {
            device: Arc::clone(&self.device),
        })
    }

    /// Restore the display surface as the active draw destination and reset
    /// the viewport to the display's current dimensions.
    pub fn unbind(device: &dyn GraphicsDevice) {
        device.bind_default_framebuffer();
        let (width, height) = device.display_size();
        device.set_viewport(width, height);
    }

    // ===== READS =====

    /// Sampleable texture for color attachment `attachment`.
    ///
    /// Texture-backed targets return the attachment itself — the same handle
    /// on every call, with no resolve work. Buffer-backed targets return the
    /// resolve companion's texture, refreshing it first when stale. The
    /// refresh blits every attachment index in one pass, so reading index 0
    /// also refreshes index 1's cache — later reads within the same frame
    /// are cache hits.
    ///
    /// # Errors
    ///
    /// `Error::IndexOutOfRange` if `attachment > max_target_index` (no
    /// device state is touched), `Error::InvalidResource` on a depth-only
    /// target or after disposal.
    pub fn color_texture(&mut self, attachment: u32) -> Result<TextureId> {
        self.ensure_live()?;
        if attachment > self.max_target_index {
            let error = Error::IndexOutOfRange {
                index: attachment,
                max: self.max_target_index,
            };
            crate::engine_error!(SOURCE, "{}", error);
            return Err(error);
        }
        if self.color_attachments.is_empty() {
            let message = "depth-only render target has no color attachment".to_string();
            crate::engine_error!(SOURCE, "{}", message);
            return Err(Error::InvalidResource(message));
        }

        if let Some(companion) = self.resolve_companion.as_deref() {
            if self.dirty {
                for index in 0..=self.max_target_index {
                    self.device.blit_attachment(
                        self.framebuffer,
                        companion.framebuffer,
                        index,
                        (self.width, self.height),
                        (companion.width, companion.height),
                        BlitFilter::Nearest,
                    )?;
                }
            }
            let texture = companion.color_attachments[attachment as usize]
                .texture()
                .ok_or_else(|| {
                    Error::InvalidResource("resolve companion is not texture-backed".to_string())
                })?;
            self.dirty = false;
            return Ok(texture);
        }

        self.color_attachments[attachment as usize]
            .texture()
            .ok_or_else(|| {
                Error::InvalidResource("color attachment is not texture-backed".to_string())
            })
    }

    /// Sampleable textures for every color attachment, resolving at most
    /// once.
    pub fn all_color_textures(&mut self) -> Result<Vec<TextureId>> {
        (0..=self.max_target_index)
            .map(|index| self.color_texture(index))
            .collect()
    }

    /// Sampleable depth texture, if the depth attachment is texture-backed.
    ///
    /// Buffer-backed depth is not meant to be sampled and yields `None`.
    pub fn depth_texture(&self) -> Option<TextureId> {
        self.depth_attachment.as_ref().and_then(Attachment::texture)
    }

    // ===== DISPLAY RESOLVES =====

    /// Blit color attachment `attachment` straight to the display surface at
    /// its current dimensions, bypassing the resolve cache. Used for
    /// final-frame composition of buffer-backed targets; a no-op for
    /// texture-backed ones.
    pub fn resolve_to_display(&self, attachment: u32) -> Result<()> {
        self.ensure_live()?;
        if attachment > self.max_target_index {
            let error = Error::IndexOutOfRange {
                index: attachment,
                max: self.max_target_index,
            };
            crate::engine_error!(SOURCE, "{}", error);
            return Err(error);
        }
        if self.resolve_companion.is_none() {
            return Ok(());
        }
        self.device
            .blit_to_display(self.framebuffer, attachment, (self.width, self.height))?;
        Self::unbind(self.device.as_ref());
        Ok(())
    }

    /// Blit this target's color attachments into another render target
    /// (linear filtering across sizes). Shared attachment indices only; a
    /// no-op for texture-backed sources.
    pub fn resolve_to_target(&self, other: &RenderTarget) -> Result<()> {
        self.ensure_live()?;
        other.ensure_live()?;
        if self.resolve_companion.is_none() {
            return Ok(());
        }
        let last = self.max_target_index.min(other.max_target_index);
        for index in 0..=last {
            self.device.blit_attachment(
                self.framebuffer,
                other.framebuffer,
                index,
                (self.width, self.height),
                (other.width, other.height),
                BlitFilter::Linear,
            )?;
        }
        Self::unbind(self.device.as_ref());
        Ok(())
    }

    // ===== ACCESSORS =====

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Samples per pixel (1 = not multisampled)
    pub fn samples(&self) -> u32 {
        self.samples
    }

    pub fn is_multisampled(&self) -> bool {
        self.samples > 1
    }

    /// Whether more than one color attachment is written simultaneously
    pub fn has_multiple_render_targets(&self) -> bool {
        self.max_target_index > 0
    }

    /// Highest valid color attachment index (after device-limit clamping)
    pub fn max_target_index(&self) -> u32 {
        self.max_target_index
    }

    /// The attachment in color slot `index`, if present
    pub fn color_attachment(&self, index: u32) -> Option<&Attachment> {
        self.color_attachments.get(index as usize)
    }

    /// The depth attachment, if present
    pub fn depth_attachment(&self) -> Option<&Attachment> {
        self.depth_attachment.as_ref()
    }

    /// The single-sample companion serving reads, if this target is
    /// buffer-backed
    pub fn resolve_companion(&self) -> Option<&RenderTarget> {
        self.resolve_companion.as_deref()
    }

    /// Whether the resolve cache is stale relative to the most recent write
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub(crate) fn framebuffer(&self) -> FramebufferId {
        self.framebuffer
    }

    // ===== DISPOSAL =====

    /// Release every owned surface: the resolve companion first, then the
    /// depth attachment, then the color attachments in reverse acquisition
    /// order, then the framebuffer itself. Idempotent — a second call is a
    /// no-op. Also invoked on drop, so each surface is released exactly
    /// once.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;

        if let Some(mut companion) = self.resolve_companion.take() {
            companion.dispose();
        }
        if let Some(depth) = self.depth_attachment.take() {
            self.delete_attachment(&depth);
        }
        let colors = std::mem::take(&mut self.color_attachments);
        for attachment in colors.iter().rev() {
            self.delete_attachment(attachment);
        }
        self.device.delete_framebuffer(self.framebuffer);
    }

    fn delete_attachment(&self, attachment: &Attachment) {
        match attachment.handle() {
            AttachmentHandle::Texture(id) => self.device.delete_texture(id),
            AttachmentHandle::Renderbuffer(id) => self.device.delete_renderbuffer(id),
        }
    }

    fn ensure_live(&self) -> Result<()> {
        if self.disposed {
            let message = "render target used after dispose".to_string();
            crate::engine_error!(SOURCE, "{}", message);
            return Err(Error::InvalidResource(message));
        }
        Ok(())
    }
}

impl Drop for RenderTarget {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
#[path = "render_target_tests.rs"]
mod tests;
