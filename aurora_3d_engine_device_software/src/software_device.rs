/// Software graphics device - CPU rasterizer for full-screen passes
///
/// Surfaces are `Vec<[f32; 4]>` texel arrays, programs are registered Rust
/// closures evaluated once per pixel per draw buffer, and blits are
/// nearest-scaled copies. Good enough to run the whole post-processing
/// pipeline headless and read the results back bit-for-bit.

use std::sync::{Arc, Mutex};

use glam::Vec4;
use rustc_hash::FxHashMap;
use slotmap::SlotMap;

use aurora_3d_engine::device::{
    BlitFilter, ClearFlags, FramebufferId, GraphicsDevice, ProgramId, RenderbufferId, TextureId,
};
use aurora_3d_engine::aurora3d::{Error, Result};
use aurora_3d_engine::engine_info;

const SOURCE: &str = "aurora3d::SoftwareDevice";

/// Device limits reported by the software backend. There is no real hardware
/// bound, so it mirrors a typical desktop GPU.
const MAX_COLOR_TARGETS: u32 = 8;

/// Per-pixel inputs handed to a fragment closure.
pub struct FragmentInputs<'a> {
    /// Uniforms of the active program
    pub uniforms: &'a FxHashMap<String, f32>,
    /// One texel per bound texture unit, sampled at the current pixel
    /// (units without a binding read as transparent black)
    pub samples: &'a [[f32; 4]],
}

/// A shader program: called once per pixel per draw buffer, the second
/// argument is the draw buffer index being written.
pub type FragmentFn = Arc<dyn Fn(&FragmentInputs, u32) -> [f32; 4] + Send + Sync>;

/// One allocated image, color or depth, texture or renderbuffer.
struct Surface {
    width: u32,
    height: u32,
    texels: Vec<[f32; 4]>,
}

impl Surface {
    fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            texels: vec![[0.0, 0.0, 0.0, 0.0]; (width * height) as usize],
        }
    }

    fn fill(&mut self, value: [f32; 4]) {
        self.texels.fill(value);
    }

    /// Nearest sample at normalized coordinates
    fn sample(&self, u: f32, v: f32) -> [f32; 4] {
        let x = ((u * self.width as f32) as u32).min(self.width - 1);
        let y = ((v * self.height as f32) as u32).min(self.height - 1);
        self.texels[(y * self.width + x) as usize]
    }
}

/// Color slot contents of a framebuffer.
#[derive(Clone, Copy)]
enum ColorSlot {
    Texture(TextureId),
    Renderbuffer(RenderbufferId),
}

#[derive(Clone, Copy)]
enum DepthSlot {
    Texture(TextureId),
    Renderbuffer(RenderbufferId),
}

#[derive(Default)]
struct FramebufferState {
    colors: FxHashMap<u32, ColorSlot>,
    depth: Option<DepthSlot>,
    draw_buffers: u32,
}

struct ProgramState {
    fragment: FragmentFn,
    uniforms: FxHashMap<String, f32>,
}

struct DeviceState {
    textures: SlotMap<TextureId, Surface>,
    renderbuffers: SlotMap<RenderbufferId, Surface>,
    framebuffers: SlotMap<FramebufferId, FramebufferState>,
    programs: SlotMap<ProgramId, ProgramState>,

    display: Surface,
    bound_framebuffer: Option<FramebufferId>,
    active_program: Option<ProgramId>,
    bound_units: FxHashMap<u32, TextureId>,
    viewport: (u32, u32),
    clear_color: Vec4,
    blit_count: u32,
}

/// Headless CPU device.
pub struct SoftwareDevice {
    display_size: (u32, u32),
    state: Mutex<DeviceState>,
}

impl SoftwareDevice {
    pub fn new(display_width: u32, display_height: u32) -> Self {
        engine_info!(
            SOURCE,
            "Software device created ({}x{} display)",
            display_width,
            display_height
        );
        Self {
            display_size: (display_width, display_height),
            state: Mutex::new(DeviceState {
                textures: SlotMap::with_key(),
                renderbuffers: SlotMap::with_key(),
                framebuffers: SlotMap::with_key(),
                programs: SlotMap::with_key(),
                display: Surface::new(display_width, display_height),
                bound_framebuffer: None,
                active_program: None,
                bound_units: FxHashMap::default(),
                viewport: (display_width, display_height),
                clear_color: Vec4::new(0.0, 0.0, 0.0, 1.0),
                blit_count: 0,
            }),
        }
    }

    /// Register a fragment closure as a shader program.
    pub fn register_fragment_program<F>(&self, fragment: F) -> ProgramId
    where
        F: Fn(&FragmentInputs, u32) -> [f32; 4] + Send + Sync + 'static,
    {
        let mut state = self.state.lock().unwrap();
        state.programs.insert(ProgramState {
            fragment: Arc::new(fragment),
            uniforms: FxHashMap::default(),
        })
    }

    /// Overwrite every texel of a color texture (test image setup).
    pub fn fill_color_texture(&self, texture: TextureId, value: [f32; 4]) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let surface = state
            .textures
            .get_mut(texture)
            .ok_or_else(|| Error::InvalidResource(format!("unknown texture {:?}", texture)))?;
        surface.fill(value);
        Ok(())
    }

    /// Read a color texture back as texels in row-major order.
    pub fn read_color_texture(&self, texture: TextureId) -> Result<Vec<[f32; 4]>> {
        let state = self.state.lock().unwrap();
        let surface = state
            .textures
            .get(texture)
            .ok_or_else(|| Error::InvalidResource(format!("unknown texture {:?}", texture)))?;
        Ok(surface.texels.clone())
    }

    /// Read the display surface back as texels in row-major order.
    pub fn read_display(&self) -> Vec<[f32; 4]> {
        self.state.lock().unwrap().display.texels.clone()
    }

    /// Number of attachment blits performed so far (resolve activity).
    pub fn blit_count(&self) -> u32 {
        self.state.lock().unwrap().blit_count
    }
}

// Surface lookup helpers on the locked state
impl DeviceState {
    fn color_surface(&self, slot: ColorSlot) -> Result<&Surface> {
        match slot {
            ColorSlot::Texture(id) => self
                .textures
                .get(id)
                .ok_or_else(|| Error::InvalidResource(format!("unknown texture {:?}", id))),
            ColorSlot::Renderbuffer(id) => self
                .renderbuffers
                .get(id)
                .ok_or_else(|| Error::InvalidResource(format!("unknown renderbuffer {:?}", id))),
        }
    }

    fn framebuffer(&self, id: FramebufferId) -> Result<&FramebufferState> {
        self.framebuffers
            .get(id)
            .ok_or_else(|| Error::InvalidResource(format!("unknown framebuffer {:?}", id)))
    }

    fn color_slot(&self, framebuffer: FramebufferId, index: u32) -> Result<ColorSlot> {
        self.framebuffer(framebuffer)?
            .colors
            .get(&index)
            .copied()
            .ok_or_else(|| {
                Error::InvalidResource(format!(
                    "framebuffer {:?} has no color attachment {}",
                    framebuffer, index
                ))
            })
    }

    /// Nearest-scaled copy between two already-fetched extents.
    fn scaled_copy(source: &Surface, destination_extent: (u32, u32)) -> Vec<[f32; 4]> {
        let (dst_width, dst_height) = destination_extent;
        let mut texels = Vec::with_capacity((dst_width * dst_height) as usize);
        for y in 0..dst_height {
            for x in 0..dst_width {
                let u = (x as f32 + 0.5) / dst_width as f32;
                let v = (y as f32 + 0.5) / dst_height as f32;
                texels.push(source.sample(u, v));
            }
        }
        texels
    }
}

impl GraphicsDevice for SoftwareDevice {
    fn max_color_attachments(&self) -> u32 {
        MAX_COLOR_TARGETS
    }

    fn max_draw_buffers(&self) -> u32 {
        MAX_COLOR_TARGETS
    }

    fn display_size(&self) -> (u32, u32) {
        self.display_size
    }

    fn create_color_texture(&self, width: u32, height: u32) -> Result<TextureId> {
        let mut state = self.state.lock().unwrap();
        Ok(state.textures.insert(Surface::new(width, height)))
    }

    fn create_depth_texture(&self, width: u32, height: u32) -> Result<TextureId> {
        let mut state = self.state.lock().unwrap();
        let mut surface = Surface::new(width, height);
        surface.fill([1.0, 0.0, 0.0, 0.0]);
        Ok(state.textures.insert(surface))
    }

    fn create_color_renderbuffer(&self, width: u32, height: u32, _samples: u32) -> Result<RenderbufferId> {
        let mut state = self.state.lock().unwrap();
        Ok(state.renderbuffers.insert(Surface::new(width, height)))
    }

    fn create_depth_renderbuffer(&self, width: u32, height: u32, _samples: u32) -> Result<RenderbufferId> {
        let mut state = self.state.lock().unwrap();
        let mut surface = Surface::new(width, height);
        surface.fill([1.0, 0.0, 0.0, 0.0]);
        Ok(state.renderbuffers.insert(surface))
    }

    fn create_framebuffer(&self) -> Result<FramebufferId> {
        let mut state = self.state.lock().unwrap();
        Ok(state.framebuffers.insert(FramebufferState::default()))
    }

    fn attach_color_texture(&self, framebuffer: FramebufferId, index: u32, texture: TextureId) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if !state.textures.contains_key(texture) {
            return Err(Error::InvalidResource(format!("unknown texture {:?}", texture)));
        }
        if index > MAX_COLOR_TARGETS {
            return Err(Error::BackendError(format!(
                "color attachment index {} exceeds device limit {}",
                index, MAX_COLOR_TARGETS
            )));
        }
        let fbo = state
            .framebuffers
            .get_mut(framebuffer)
            .ok_or_else(|| Error::InvalidResource(format!("unknown framebuffer {:?}", framebuffer)))?;
        fbo.colors.insert(index, ColorSlot::Texture(texture));
        Ok(())
    }

    fn attach_color_renderbuffer(&self, framebuffer: FramebufferId, index: u32, renderbuffer: RenderbufferId) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if !state.renderbuffers.contains_key(renderbuffer) {
            return Err(Error::InvalidResource(format!("unknown renderbuffer {:?}", renderbuffer)));
        }
        if index > MAX_COLOR_TARGETS {
            return Err(Error::BackendError(format!(
                "color attachment index {} exceeds device limit {}",
                index, MAX_COLOR_TARGETS
            )));
        }
        let fbo = state
            .framebuffers
            .get_mut(framebuffer)
            .ok_or_else(|| Error::InvalidResource(format!("unknown framebuffer {:?}", framebuffer)))?;
        fbo.colors.insert(index, ColorSlot::Renderbuffer(renderbuffer));
        Ok(())
    }

    fn attach_depth_texture(&self, framebuffer: FramebufferId, texture: TextureId) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if !state.textures.contains_key(texture) {
            return Err(Error::InvalidResource(format!("unknown texture {:?}", texture)));
        }
        let fbo = state
            .framebuffers
            .get_mut(framebuffer)
            .ok_or_else(|| Error::InvalidResource(format!("unknown framebuffer {:?}", framebuffer)))?;
        fbo.depth = Some(DepthSlot::Texture(texture));
        Ok(())
    }

    fn attach_depth_renderbuffer(&self, framebuffer: FramebufferId, renderbuffer: RenderbufferId) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if !state.renderbuffers.contains_key(renderbuffer) {
            return Err(Error::InvalidResource(format!("unknown renderbuffer {:?}", renderbuffer)));
        }
        let fbo = state
            .framebuffers
            .get_mut(framebuffer)
            .ok_or_else(|| Error::InvalidResource(format!("unknown framebuffer {:?}", framebuffer)))?;
        fbo.depth = Some(DepthSlot::Renderbuffer(renderbuffer));
        Ok(())
    }

    fn set_draw_buffers(&self, framebuffer: FramebufferId, count: u32) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let fbo = state
            .framebuffers
            .get_mut(framebuffer)
            .ok_or_else(|| Error::InvalidResource(format!("unknown framebuffer {:?}", framebuffer)))?;
        fbo.draw_buffers = count;
        Ok(())
    }

    fn bind_framebuffer(&self, framebuffer: FramebufferId) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if !state.framebuffers.contains_key(framebuffer) {
            return Err(Error::InvalidResource(format!("unknown framebuffer {:?}", framebuffer)));
        }
        state.bound_framebuffer = Some(framebuffer);
        Ok(())
    }

    fn bind_default_framebuffer(&self) {
        self.state.lock().unwrap().bound_framebuffer = None;
    }

    fn set_viewport(&self, width: u32, height: u32) {
        self.state.lock().unwrap().viewport = (width, height);
    }

    fn set_clear_color(&self, color: Vec4) {
        self.state.lock().unwrap().clear_color = color;
    }

    fn clear(&self, flags: ClearFlags) {
        let mut state = self.state.lock().unwrap();
        let clear_color = state.clear_color;
        let clear_value = [clear_color.x, clear_color.y, clear_color.z, clear_color.w];

        match state.bound_framebuffer {
            Some(framebuffer) => {
                let Some(fbo) = state.framebuffers.get(framebuffer) else {
                    return;
                };
                let colors: Vec<ColorSlot> = fbo.colors.values().copied().collect();
                let depth = fbo.depth;

                if flags.contains(ClearFlags::COLOR) {
                    for slot in colors {
                        match slot {
                            ColorSlot::Texture(id) => {
                                if let Some(surface) = state.textures.get_mut(id) {
                                    surface.fill(clear_value);
                                }
                            }
                            ColorSlot::Renderbuffer(id) => {
                                if let Some(surface) = state.renderbuffers.get_mut(id) {
                                    surface.fill(clear_value);
                                }
                            }
                        }
                    }
                }
                if flags.contains(ClearFlags::DEPTH) {
                    match depth {
                        Some(DepthSlot::Texture(id)) => {
                            if let Some(surface) = state.textures.get_mut(id) {
                                surface.fill([1.0, 0.0, 0.0, 0.0]);
                            }
                        }
                        Some(DepthSlot::Renderbuffer(id)) => {
                            if let Some(surface) = state.renderbuffers.get_mut(id) {
                                surface.fill([1.0, 0.0, 0.0, 0.0]);
                            }
                        }
                        None => {}
                    }
                }
            }
            None => {
                if flags.contains(ClearFlags::COLOR) {
                    state.display.fill(clear_value);
                }
            }
        }
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
        let mut state = self.state.lock().unwrap();

        let source_slot = state.color_slot(source, index)?;
        let destination_slot = state.color_slot(destination, index)?;
        let source_surface = state.color_surface(source_slot)?;
        let destination_extent = {
            let surface = state.color_surface(destination_slot)?;
            (surface.width, surface.height)
        };
        let texels = DeviceState::scaled_copy(source_surface, destination_extent);

        match destination_slot {
            ColorSlot::Texture(id) => {
                if let Some(surface) = state.textures.get_mut(id) {
                    surface.texels = texels;
                }
            }
            ColorSlot::Renderbuffer(id) => {
                if let Some(surface) = state.renderbuffers.get_mut(id) {
                    surface.texels = texels;
                }
            }
        }
        state.blit_count += 1;
        Ok(())
    }

    fn blit_to_display(&self, source: FramebufferId, index: u32, _source_size: (u32, u32)) -> Result<()> {
        let mut state = self.state.lock().unwrap();

        let source_slot = state.color_slot(source, index)?;
        let source_surface = state.color_surface(source_slot)?;
        let extent = (state.display.width, state.display.height);
        let texels = DeviceState::scaled_copy(source_surface, extent);

        state.display.texels = texels;
        state.blit_count += 1;
        Ok(())
    }

    fn use_program(&self, program: ProgramId) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if !state.programs.contains_key(program) {
            return Err(Error::InvalidResource(format!("unknown program {:?}", program)));
        }
        state.active_program = Some(program);
        Ok(())
    }

    fn set_uniform_f32(&self, program: ProgramId, name: &str, value: f32) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let program_state = state
            .programs
            .get_mut(program)
            .ok_or_else(|| Error::InvalidResource(format!("unknown program {:?}", program)))?;
        program_state.uniforms.insert(name.to_string(), value);
        Ok(())
    }

    fn bind_texture(&self, texture: TextureId, unit: u32) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if !state.textures.contains_key(texture) {
            return Err(Error::InvalidResource(format!("unknown texture {:?}", texture)));
        }
        state.bound_units.insert(unit, texture);
        Ok(())
    }

    fn draw_fullscreen_quad(&self) -> Result<()> {
        let mut state = self.state.lock().unwrap();

        let program_id = state.active_program.ok_or_else(|| {
            Error::InvalidConfiguration("draw issued without an active program".to_string())
        })?;
        let (fragment, uniforms) = {
            let program = state
                .programs
                .get(program_id)
                .ok_or_else(|| Error::InvalidResource(format!("unknown program {:?}", program_id)))?;
            (program.fragment.clone(), program.uniforms.clone())
        };

        // Snapshot the input textures for units 0..=highest bound
        let unit_count = state
            .bound_units
            .keys()
            .max()
            .map(|max| max + 1)
            .unwrap_or(0);
        let mut inputs: Vec<(u32, u32, Vec<[f32; 4]>)> = Vec::with_capacity(unit_count as usize);
        for unit in 0..unit_count {
            match state.bound_units.get(&unit).and_then(|id| state.textures.get(*id)) {
                Some(surface) => {
                    inputs.push((surface.width, surface.height, surface.texels.clone()))
                }
                None => inputs.push((1, 1, vec![[0.0, 0.0, 0.0, 0.0]])),
            }
        }
        let sample_inputs = |u: f32, v: f32| -> Vec<[f32; 4]> {
            inputs
                .iter()
                .map(|(width, height, texels)| {
                    let x = ((u * *width as f32) as u32).min(width - 1);
                    let y = ((v * *height as f32) as u32).min(height - 1);
                    texels[(y * width + x) as usize]
                })
                .collect()
        };

        // Destination surfaces: every enabled draw buffer of the bound
        // framebuffer, or the display
        let destinations: Vec<(u32, Option<ColorSlot>)> = match state.bound_framebuffer {
            Some(framebuffer) => {
                let fbo = state.framebuffer(framebuffer)?;
                (0..fbo.draw_buffers)
                    .map(|index| (index, fbo.colors.get(&index).copied()))
                    .collect()
            }
            None => vec![(0, None)],
        };

        for (draw_index, slot) in destinations {
            let extent = match slot {
                Some(slot) => {
                    let surface = state.color_surface(slot)?;
                    (surface.width, surface.height)
                }
                None => (state.display.width, state.display.height),
            };
            let (width, height) = extent;
            let mut output = Vec::with_capacity((width * height) as usize);
            for y in 0..height {
                for x in 0..width {
                    let u = (x as f32 + 0.5) / width as f32;
                    let v = (y as f32 + 0.5) / height as f32;
                    let samples = sample_inputs(u, v);
                    let frag_inputs = FragmentInputs {
                        uniforms: &uniforms,
                        samples: &samples,
                    };
                    output.push(fragment(&frag_inputs, draw_index));
                }
            }
            match slot {
                Some(ColorSlot::Texture(id)) => {
                    if let Some(surface) = state.textures.get_mut(id) {
                        surface.texels = output;
                    }
                }
                Some(ColorSlot::Renderbuffer(id)) => {
                    if let Some(surface) = state.renderbuffers.get_mut(id) {
                        surface.texels = output;
                    }
                }
                None => state.display.texels = output,
            }
        }
        Ok(())
    }

    fn delete_texture(&self, texture: TextureId) {
        let _ = self.state.lock().unwrap().textures.remove(texture);
    }

    fn delete_renderbuffer(&self, renderbuffer: RenderbufferId) {
        let _ = self.state.lock().unwrap().renderbuffers.remove(renderbuffer);
    }

    fn delete_framebuffer(&self, framebuffer: FramebufferId) {
        let _ = self.state.lock().unwrap().framebuffers.remove(framebuffer);
    }
}

#[cfg(test)]
#[path = "software_device_tests.rs"]
mod tests;
