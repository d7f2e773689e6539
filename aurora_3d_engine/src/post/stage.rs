/// Post-processing stage - one full-screen pass of the pipeline
///
/// A stage binds its program, binds its input textures to consecutive units,
/// and draws a full-screen quad either into its own render target or onto
/// the display. Targeted stages expose their output for the next stage to
/// sample; terminal stages have no sampleable output.

use std::sync::Arc;

use crate::device::{GraphicsDevice, ProgramId, TextureId};
use crate::error::{Error, Result};
use crate::target::{RenderTarget, RenderTargetDesc};

const SOURCE: &str = "aurora3d::PostStage";

/// Where a stage's output goes.
///
/// Selected once at construction; an invalid choice cannot be expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    /// Terminal: draw onto the display surface
    Display,
    /// Non-terminal: draw into an owned render target for further chaining
    Target,
}

/// A single full-screen pass with an optional owned render target.
pub struct PostStage {
    device: Arc<dyn GraphicsDevice>,
    program: ProgramId,
    target: Option<RenderTarget>,
}

impl PostStage {
    /// Terminal stage: draws are composited onto the display surface.
    pub fn to_display(device: &Arc<dyn GraphicsDevice>, program: ProgramId) -> Self {
        Self {
            device: Arc::clone(device),
            program,
            target: None,
        }
    }

    /// Non-terminal stage: draws land in an owned render target described by
    /// `desc`, sampleable afterwards via `output_texture`.
    pub fn to_target(
        device: &Arc<dyn GraphicsDevice>,
        program: ProgramId,
        desc: &RenderTargetDesc,
    ) -> Result<Self> {
        let target = RenderTarget::new(device, desc)?;
        Ok(Self {
            device: Arc::clone(device),
            program,
            target: Some(target),
        })
    }

    /// Run the pass: program active, `inputs` bound to texture units
    /// `0..inputs.len()`, one full-screen quad draw. Targeted stages bind
    /// their render target around the draw and restore the display
    /// afterwards; terminal stages draw onto whatever is currently bound.
    pub fn render(&mut self, inputs: &[TextureId]) -> Result<()> {
        self.device.use_program(self.program)?;
        for (unit, texture) in inputs.iter().enumerate() {
            self.device.bind_texture(*texture, unit as u32)?;
        }
        match self.target.as_mut() {
            Some(target) => {
                let _binding = target.bind_for_write()?;
                self.device.draw_fullscreen_quad()?;
            }
            None => self.device.draw_fullscreen_quad()?,
        }
        Ok(())
    }

    /// Set a scalar uniform on this stage's program.
    pub fn set_uniform_f32(&self, name: &str, value: f32) -> Result<()> {
        self.device.set_uniform_f32(self.program, name, value)
    }

    /// Sampleable texture produced by the last `render` call.
    ///
    /// # Errors
    ///
    /// `Error::InvalidConfiguration` on a terminal stage — rendering to the
    /// display leaves nothing to sample.
    pub fn output_texture(&mut self, attachment: u32) -> Result<TextureId> {
        match self.target.as_mut() {
            Some(target) => target.color_texture(attachment),
            None => {
                let message =
                    "terminal stage renders to the display and has no sampleable output"
                        .to_string();
                crate::engine_error!(SOURCE, "{}", message);
                Err(Error::InvalidConfiguration(message))
            }
        }
    }

    /// Depth texture of the owned target, when it is texture-backed.
    pub fn depth_texture(&self) -> Option<TextureId> {
        self.target.as_ref().and_then(RenderTarget::depth_texture)
    }

    /// Whether this stage composites onto the display
    pub fn is_terminal(&self) -> bool {
        self.target.is_none()
    }

    /// The owned render target, if non-terminal
    pub fn target(&self) -> Option<&RenderTarget> {
        self.target.as_ref()
    }

    /// The shader program this stage draws with
    pub fn program(&self) -> ProgramId {
        self.program
    }

    /// Release the owned render target. Terminal stages hold nothing.
    pub fn dispose(&mut self) {
        if let Some(mut target) = self.target.take() {
            target.dispose();
        }
    }
}

#[cfg(test)]
#[path = "stage_tests.rs"]
mod tests;
