/// Mock graphics device for unit tests (no GPU required)
///
/// Records every call the render-target manager and the pipeline stages make
/// so tests can assert on creation counts, blit/draw activity, deletion
/// order, and bound state. Holds no pixel data — behavioral tests that need
/// actual texels use the software backend via the integration suites.

use std::sync::{Arc, Mutex};

use glam::Vec4;
use slotmap::SlotMap;

use crate::device::{
    BlitFilter, ClearFlags, FramebufferId, GraphicsDevice, ProgramId, RenderbufferId, TextureId,
};
use crate::error::{Error, Result};

/// What a created texture/renderbuffer is for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceRole {
    Color,
    Depth,
}

/// Recorded texture storage
#[derive(Debug, Clone, Copy)]
pub struct MockTexture {
    pub role: SurfaceRole,
    pub width: u32,
    pub height: u32,
}

/// Recorded renderbuffer storage
#[derive(Debug, Clone, Copy)]
pub struct MockRenderbuffer {
    pub role: SurfaceRole,
    pub width: u32,
    pub height: u32,
    pub samples: u32,
}

/// Mock device that tracks every backend call without a GPU
pub struct MockDevice {
    max_color_attachments: u32,
    max_draw_buffers: u32,
    display_size: (u32, u32),

    textures: Mutex<SlotMap<TextureId, MockTexture>>,
    renderbuffers: Mutex<SlotMap<RenderbufferId, MockRenderbuffer>>,
    framebuffers: Mutex<SlotMap<FramebufferId, ()>>,
    programs: Mutex<SlotMap<ProgramId, ()>>,

    deleted_textures: Mutex<Vec<TextureId>>,
    deleted_renderbuffers: Mutex<Vec<RenderbufferId>>,
    deleted_framebuffers: Mutex<Vec<FramebufferId>>,

    /// (source, destination, color index) per fbo-to-fbo blit
    blits: Mutex<Vec<(FramebufferId, FramebufferId, u32)>>,
    /// (source, color index) per blit to the display surface
    display_blits: Mutex<Vec<(FramebufferId, u32)>>,
    /// (framebuffer, draw buffer count) per set_draw_buffers call
    draw_buffer_log: Mutex<Vec<(FramebufferId, u32)>>,
    /// (program, uniform name, value) per set_uniform_f32 call
    uniform_log: Mutex<Vec<(ProgramId, String, f32)>>,
    /// (texture, unit) per bind_texture call
    bound_texture_log: Mutex<Vec<(TextureId, u32)>>,
    /// program per use_program call
    used_programs: Mutex<Vec<ProgramId>>,

    bound_framebuffer: Mutex<Option<FramebufferId>>,
    viewport: Mutex<(u32, u32)>,
    clear_color: Mutex<Vec4>,
    clears: Mutex<u32>,
    draws: Mutex<u32>,
}

impl MockDevice {
    /// Mock with the default limits (8 attachments, 8 draw buffers) and an
    /// 800x600 display
    pub fn new() -> Self {
        Self::with_limits(8, 8)
    }

    /// Mock reporting custom device limits
    pub fn with_limits(max_color_attachments: u32, max_draw_buffers: u32) -> Self {
        Self {
            max_color_attachments,
            max_draw_buffers,
            display_size: (800, 600),
            textures: Mutex::new(SlotMap::with_key()),
            renderbuffers: Mutex::new(SlotMap::with_key()),
            framebuffers: Mutex::new(SlotMap::with_key()),
            programs: Mutex::new(SlotMap::with_key()),
            deleted_textures: Mutex::new(Vec::new()),
            deleted_renderbuffers: Mutex::new(Vec::new()),
            deleted_framebuffers: Mutex::new(Vec::new()),
            blits: Mutex::new(Vec::new()),
            display_blits: Mutex::new(Vec::new()),
            draw_buffer_log: Mutex::new(Vec::new()),
            uniform_log: Mutex::new(Vec::new()),
            bound_texture_log: Mutex::new(Vec::new()),
            used_programs: Mutex::new(Vec::new()),
            bound_framebuffer: Mutex::new(None),
            viewport: Mutex::new((0, 0)),
            clear_color: Mutex::new(Vec4::new(0.0, 0.0, 0.0, 1.0)),
            clears: Mutex::new(0),
            draws: Mutex::new(0),
        }
    }

    /// Register an opaque program handle (stages only ever pass it back)
    pub fn make_program(&self) -> ProgramId {
        self.programs.lock().unwrap().insert(())
    }

    // ===== TEST ACCESSORS =====

    pub fn live_texture_count(&self) -> usize {
        self.textures.lock().unwrap().len()
    }

    pub fn live_renderbuffer_count(&self) -> usize {
        self.renderbuffers.lock().unwrap().len()
    }

    pub fn live_framebuffer_count(&self) -> usize {
        self.framebuffers.lock().unwrap().len()
    }

    pub fn texture(&self, id: TextureId) -> Option<MockTexture> {
        self.textures.lock().unwrap().get(id).copied()
    }

    pub fn renderbuffer(&self, id: RenderbufferId) -> Option<MockRenderbuffer> {
        self.renderbuffers.lock().unwrap().get(id).copied()
    }

    pub fn deleted_textures(&self) -> Vec<TextureId> {
        self.deleted_textures.lock().unwrap().clone()
    }

    pub fn deleted_renderbuffers(&self) -> Vec<RenderbufferId> {
        self.deleted_renderbuffers.lock().unwrap().clone()
    }

    pub fn deleted_framebuffers(&self) -> Vec<FramebufferId> {
        self.deleted_framebuffers.lock().unwrap().clone()
    }

    pub fn blit_count(&self) -> usize {
        self.blits.lock().unwrap().len()
    }

    pub fn blit_log(&self) -> Vec<(FramebufferId, FramebufferId, u32)> {
        self.blits.lock().unwrap().clone()
    }

    pub fn display_blit_log(&self) -> Vec<(FramebufferId, u32)> {
        self.display_blits.lock().unwrap().clone()
    }

    pub fn draw_buffer_log(&self) -> Vec<(FramebufferId, u32)> {
        self.draw_buffer_log.lock().unwrap().clone()
    }

    pub fn uniform_log(&self) -> Vec<(ProgramId, String, f32)> {
        self.uniform_log.lock().unwrap().clone()
    }

    pub fn bound_texture_log(&self) -> Vec<(TextureId, u32)> {
        self.bound_texture_log.lock().unwrap().clone()
    }

    pub fn used_programs(&self) -> Vec<ProgramId> {
        self.used_programs.lock().unwrap().clone()
    }

    pub fn bound_framebuffer(&self) -> Option<FramebufferId> {
        *self.bound_framebuffer.lock().unwrap()
    }

    pub fn viewport(&self) -> (u32, u32) {
        *self.viewport.lock().unwrap()
    }

    pub fn clear_count(&self) -> u32 {
        *self.clears.lock().unwrap()
    }

    pub fn draw_count(&self) -> u32 {
        *self.draws.lock().unwrap()
    }
}

impl GraphicsDevice for MockDevice {
    fn max_color_attachments(&self) -> u32 {
        self.max_color_attachments
    }

    fn max_draw_buffers(&self) -> u32 {
        self.max_draw_buffers
    }

    fn display_size(&self) -> (u32, u32) {
        self.display_size
    }

    fn create_color_texture(&self, width: u32, height: u32) -> Result<TextureId> {
        Ok(self.textures.lock().unwrap().insert(MockTexture {
            role: SurfaceRole::Color,
            width,
            height,
        }))
    }

    fn create_depth_texture(&self, width: u32, height: u32) -> Result<TextureId> {
        Ok(self.textures.lock().unwrap().insert(MockTexture {
            role: SurfaceRole::Depth,
            width,
            height,
        }))
    }

    fn create_color_renderbuffer(&self, width: u32, height: u32, samples: u32) -> Result<RenderbufferId> {
        Ok(self.renderbuffers.lock().unwrap().insert(MockRenderbuffer {
            role: SurfaceRole::Color,
            width,
            height,
            samples,
        }))
    }

    fn create_depth_renderbuffer(&self, width: u32, height: u32, samples: u32) -> Result<RenderbufferId> {
        Ok(self.renderbuffers.lock().unwrap().insert(MockRenderbuffer {
            role: SurfaceRole::Depth,
            width,
            height,
            samples,
        }))
    }

    fn create_framebuffer(&self) -> Result<FramebufferId> {
        Ok(self.framebuffers.lock().unwrap().insert(()))
    }

    fn attach_color_texture(&self, framebuffer: FramebufferId, index: u32, texture: TextureId) -> Result<()> {
        if !self.framebuffers.lock().unwrap().contains_key(framebuffer) {
            return Err(Error::InvalidResource(format!("unknown framebuffer {:?}", framebuffer)));
        }
        if !self.textures.lock().unwrap().contains_key(texture) {
            return Err(Error::InvalidResource(format!("unknown texture {:?}", texture)));
        }
        if index > self.max_color_attachments {
            return Err(Error::BackendError(format!(
                "color attachment index {} exceeds device limit {}",
                index, self.max_color_attachments
            )));
        }
        Ok(())
    }

    fn attach_color_renderbuffer(&self, framebuffer: FramebufferId, index: u32, renderbuffer: RenderbufferId) -> Result<()> {
        if !self.framebuffers.lock().unwrap().contains_key(framebuffer) {
            return Err(Error::InvalidResource(format!("unknown framebuffer {:?}", framebuffer)));
        }
        if !self.renderbuffers.lock().unwrap().contains_key(renderbuffer) {
            return Err(Error::InvalidResource(format!("unknown renderbuffer {:?}", renderbuffer)));
        }
        if index > self.max_color_attachments {
            return Err(Error::BackendError(format!(
                "color attachment index {} exceeds device limit {}",
                index, self.max_color_attachments
            )));
        }
        Ok(())
    }

    fn attach_depth_texture(&self, framebuffer: FramebufferId, texture: TextureId) -> Result<()> {
        if !self.framebuffers.lock().unwrap().contains_key(framebuffer) {
            return Err(Error::InvalidResource(format!("unknown framebuffer {:?}", framebuffer)));
        }
        if !self.textures.lock().unwrap().contains_key(texture) {
            return Err(Error::InvalidResource(format!("unknown texture {:?}", texture)));
        }
        Ok(())
    }

    fn attach_depth_renderbuffer(&self, framebuffer: FramebufferId, renderbuffer: RenderbufferId) -> Result<()> {
        if !self.framebuffers.lock().unwrap().contains_key(framebuffer) {
            return Err(Error::InvalidResource(format!("unknown framebuffer {:?}", framebuffer)));
        }
        if !self.renderbuffers.lock().unwrap().contains_key(renderbuffer) {
            return Err(Error::InvalidResource(format!("unknown renderbuffer {:?}", renderbuffer)));
        }
        Ok(())
    }

    fn set_draw_buffers(&self, framebuffer: FramebufferId, count: u32) -> Result<()> {
        if !self.framebuffers.lock().unwrap().contains_key(framebuffer) {
            return Err(Error::InvalidResource(format!("unknown framebuffer {:?}", framebuffer)));
        }
        self.draw_buffer_log.lock().unwrap().push((framebuffer, count));
        Ok(())
    }

    fn bind_framebuffer(&self, framebuffer: FramebufferId) -> Result<()> {
        if !self.framebuffers.lock().unwrap().contains_key(framebuffer) {
            return Err(Error::InvalidResource(format!("unknown framebuffer {:?}", framebuffer)));
        }
        *self.bound_framebuffer.lock().unwrap() = Some(framebuffer);
        Ok(())
    }

    fn bind_default_framebuffer(&self) {
        *self.bound_framebuffer.lock().unwrap() = None;
    }

    fn set_viewport(&self, width: u32, height: u32) {
        *self.viewport.lock().unwrap() = (width, height);
    }

    fn set_clear_color(&self, color: Vec4) {
        *self.clear_color.lock().unwrap() = color;
    }

    fn clear(&self, _flags: ClearFlags) {
        *self.clears.lock().unwrap() += 1;
    }

    fn blit_attachment(
        &self,
        source: FramebufferId,
        destination: FramebufferId,
        index: u32,
        _source_size: (u32, u32),
        _destination_size: (u32, u32),
        _filter: BlitFilter,
    ) -> Result<()> {
        self.blits.lock().unwrap().push((source, destination, index));
        Ok(())
    }

    fn blit_to_display(&self, source: FramebufferId, index: u32, _source_size: (u32, u32)) -> Result<()> {
        self.display_blits.lock().unwrap().push((source, index));
        Ok(())
    }

    fn use_program(&self, program: ProgramId) -> Result<()> {
        if !self.programs.lock().unwrap().contains_key(program) {
            return Err(Error::InvalidResource(format!("unknown program {:?}", program)));
        }
        self.used_programs.lock().unwrap().push(program);
        Ok(())
    }

    fn set_uniform_f32(&self, program: ProgramId, name: &str, value: f32) -> Result<()> {
        if !self.programs.lock().unwrap().contains_key(program) {
            return Err(Error::InvalidResource(format!("unknown program {:?}", program)));
        }
        self.uniform_log.lock().unwrap().push((program, name.to_string(), value));
        Ok(())
    }

    fn bind_texture(&self, texture: TextureId, unit: u32) -> Result<()> {
        self.bound_texture_log.lock().unwrap().push((texture, unit));
        Ok(())
    }

    fn draw_fullscreen_quad(&self) -> Result<()> {
        *self.draws.lock().unwrap() += 1;
        Ok(())
    }

    fn delete_texture(&self, texture: TextureId) {
        self.deleted_textures.lock().unwrap().push(texture);
        let _ = self.textures.lock().unwrap().remove(texture);
    }

    fn delete_renderbuffer(&self, renderbuffer: RenderbufferId) {
        self.deleted_renderbuffers.lock().unwrap().push(renderbuffer);
        let _ = self.renderbuffers.lock().unwrap().remove(renderbuffer);
    }

    fn delete_framebuffer(&self, framebuffer: FramebufferId) {
        self.deleted_framebuffers.lock().unwrap().push(framebuffer);
        let _ = self.framebuffers.lock().unwrap().remove(framebuffer);
    }
}

/// Shared handle pair for tests: the concrete mock (for assertions) and the
/// trait object the engine code consumes
pub fn mock_device_pair() -> (Arc<MockDevice>, Arc<dyn GraphicsDevice>) {
    let mock = Arc::new(MockDevice::new());
    let device: Arc<dyn GraphicsDevice> = mock.clone();
    (mock, device)
}

#[cfg(test)]
#[path = "mock_device_tests.rs"]
mod tests;
