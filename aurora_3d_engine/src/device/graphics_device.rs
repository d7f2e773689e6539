/// GraphicsDevice trait - backend interface for render-target plumbing
///
/// This is the boundary the render-target manager and the post-processing
/// pipeline are written against. Backend implementations (the software
/// backend, a GL/Vulkan backend, ...) provide the concrete resource storage
/// and drawing; the core only ever sees opaque handles.

use glam::Vec4;

use crate::error::Result;

// ============================================================================
// Handle types
// ============================================================================

slotmap::new_key_type! {
    /// Opaque handle to a sampleable GPU texture
    pub struct TextureId;

    /// Opaque handle to a non-sampleable renderbuffer
    pub struct RenderbufferId;

    /// Opaque handle to a framebuffer object
    pub struct FramebufferId;

    /// Opaque handle to a shader program (compiled externally)
    pub struct ProgramId;
}

// ============================================================================
// Common types
// ============================================================================

bitflags::bitflags! {
    /// Buffer-clear mask for `GraphicsDevice::clear`
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ClearFlags: u32 {
        /// Clear the color attachments of the bound framebuffer
        const COLOR = 0b01;
        /// Clear the depth attachment of the bound framebuffer
        const DEPTH = 0b10;
    }
}

/// Sampling filter applied by blit operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlitFilter {
    /// Nearest texel (used for cache resolves — exact copies)
    Nearest,
    /// Linear interpolation (used for cross-size target copies)
    Linear,
}

// ============================================================================
// GraphicsDevice trait
// ============================================================================

/// Backend trait for the render-target manager
///
/// All methods take `&self`; backends use interior mutability for their
/// resource tables. Every operation is synchronous and runs to completion on
/// the calling thread (there is no suspension point in this core).
///
/// Deletion methods are infallible and idempotent: deleting a handle that no
/// longer exists is a no-op, matching GL object-deletion semantics.
pub trait GraphicsDevice: Send + Sync {
    // ===== DEVICE LIMITS =====

    /// Maximum number of color attachments a framebuffer may carry
    fn max_color_attachments(&self) -> u32;

    /// Maximum number of simultaneously writable color outputs
    fn max_draw_buffers(&self) -> u32;

    // ===== DISPLAY SURFACE =====

    /// Current dimensions of the display surface (windowing collaborator)
    fn display_size(&self) -> (u32, u32);

    // ===== ATTACHMENT FACTORIES =====

    /// Create a sampleable color texture
    fn create_color_texture(&self, width: u32, height: u32) -> Result<TextureId>;

    /// Create a sampleable depth texture
    fn create_depth_texture(&self, width: u32, height: u32) -> Result<TextureId>;

    /// Create a color renderbuffer (not sampleable; `samples > 1` allocates
    /// multisampled storage)
    fn create_color_renderbuffer(&self, width: u32, height: u32, samples: u32) -> Result<RenderbufferId>;

    /// Create a depth renderbuffer (not sampleable; `samples > 1` allocates
    /// multisampled storage)
    fn create_depth_renderbuffer(&self, width: u32, height: u32, samples: u32) -> Result<RenderbufferId>;

    // ===== FRAMEBUFFER WIRING =====

    /// Create an empty framebuffer object
    fn create_framebuffer(&self) -> Result<FramebufferId>;

    /// Attach a texture to the framebuffer's color slot `index`
    fn attach_color_texture(&self, framebuffer: FramebufferId, index: u32, texture: TextureId) -> Result<()>;

    /// Attach a renderbuffer to the framebuffer's color slot `index`
    fn attach_color_renderbuffer(&self, framebuffer: FramebufferId, index: u32, renderbuffer: RenderbufferId) -> Result<()>;

    /// Attach a texture as the framebuffer's depth attachment
    fn attach_depth_texture(&self, framebuffer: FramebufferId, texture: TextureId) -> Result<()>;

    /// Attach a renderbuffer as the framebuffer's depth attachment
    fn attach_depth_renderbuffer(&self, framebuffer: FramebufferId, renderbuffer: RenderbufferId) -> Result<()>;

    /// Set how many color outputs draws into this framebuffer write
    /// (`count = 0` disables color output entirely — depth-only rendering)
    fn set_draw_buffers(&self, framebuffer: FramebufferId, count: u32) -> Result<()>;

    // ===== PER-FRAME STATE =====

    /// Make `framebuffer` the active draw destination
    fn bind_framebuffer(&self, framebuffer: FramebufferId) -> Result<()>;

    /// Make the display surface the active draw destination
    fn bind_default_framebuffer(&self);

    /// Set the active viewport
    fn set_viewport(&self, width: u32, height: u32);

    /// Set the color used by `clear` for color attachments
    fn set_clear_color(&self, color: Vec4);

    /// Clear the selected buffers of the active draw destination
    fn clear(&self, flags: ClearFlags);

    // ===== TRANSFER =====

    /// Copy one color attachment from `source` to `destination`, rescaling
    /// between the given sizes. Resolves multisampled storage to
    /// single-sample storage when the source is multisampled.
    fn blit_attachment(
        &self,
        source: FramebufferId,
        destination: FramebufferId,
        index: u32,
        source_size: (u32, u32),
        destination_size: (u32, u32),
        filter: BlitFilter,
    ) -> Result<()>;

    /// Copy one color attachment from `source` to the display surface at its
    /// current dimensions
    fn blit_to_display(&self, source: FramebufferId, index: u32, source_size: (u32, u32)) -> Result<()>;

    // ===== DRAWING (pipeline stages) =====

    /// Make `program` the active shader program
    fn use_program(&self, program: ProgramId) -> Result<()>;

    /// Set a float uniform on `program`
    fn set_uniform_f32(&self, program: ProgramId, name: &str, value: f32) -> Result<()>;

    /// Bind `texture` to sampling unit `unit`
    fn bind_texture(&self, texture: TextureId, unit: u32) -> Result<()>;

    /// Draw the fixed full-screen quad with the active program into the
    /// active draw destination
    fn draw_fullscreen_quad(&self) -> Result<()>;

    // ===== DELETION =====

    /// Delete a texture (no-op if already deleted)
    fn delete_texture(&self, texture: TextureId);

    /// Delete a renderbuffer (no-op if already deleted)
    fn delete_renderbuffer(&self, renderbuffer: RenderbufferId);

    /// Delete a framebuffer (no-op if already deleted)
    fn delete_framebuffer(&self, framebuffer: FramebufferId);
}
