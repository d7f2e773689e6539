/// Blur stages - separable gaussian blur
///
/// The horizontal and vertical passes are identical apart from the axis the
/// shader samples along; each loads a `pixel_size` uniform (1 / extent along
/// its axis) once at construction. `GaussianBlurStage` chains the two.

use std::sync::Arc;

use crate::device::{GraphicsDevice, ProgramId, TextureId};
use crate::error::Result;
use crate::target::RenderTargetDesc;
use super::stage::{Destination, PostStage};

/// Horizontal blur pass.
pub struct HorizontalBlurStage {
    stage: PostStage,
}

impl HorizontalBlurStage {
    /// Terminal variant; the sample step is derived from the display width.
    pub fn to_display(device: &Arc<dyn GraphicsDevice>, program: ProgramId) -> Result<Self> {
        let (width, _) = device.display_size();
        let stage = PostStage::to_display(device, program);
        stage.set_uniform_f32("pixel_size", 1.0 / width as f32)?;
        Ok(Self { stage })
    }

    /// Targeted variant; the sample step is derived from the target width.
    pub fn to_target(
        device: &Arc<dyn GraphicsDevice>,
        program: ProgramId,
        width: u32,
        height: u32,
        samples: u32,
        max_target_index: u32,
    ) -> Result<Self> {
        let desc = RenderTargetDesc {
            samples,
            max_target_index,
            ..RenderTargetDesc::new(width, height)
        };
        let stage = PostStage::to_target(device, program, &desc)?;
        stage.set_uniform_f32("pixel_size", 1.0 / width as f32)?;
        Ok(Self { stage })
    }

    pub fn render(&mut self, input: TextureId) -> Result<()> {
        self.stage.render(&[input])
    }

    pub fn output_texture(&mut self) -> Result<TextureId> {
        self.stage.output_texture(0)
    }

    pub fn dispose(&mut self) {
        self.stage.dispose();
    }
}

/// Vertical blur pass.
pub struct VerticalBlurStage {
    stage: PostStage,
}

impl VerticalBlurStage {
    /// Terminal variant; the sample step is derived from the display height.
    pub fn to_display(device: &Arc<dyn GraphicsDevice>, program: ProgramId) -> Result<Self> {
        let (_, height) = device.display_size();
        let stage = PostStage::to_display(device, program);
        stage.set_uniform_f32("pixel_size", 1.0 / height as f32)?;
        Ok(Self { stage })
    }

    /// Targeted variant; the sample step is derived from the target height.
    pub fn to_target(
        device: &Arc<dyn GraphicsDevice>,
        program: ProgramId,
        width: u32,
        height: u32,
        samples: u32,
        max_target_index: u32,
    ) -> Result<Self> {
        let desc = RenderTargetDesc {
            samples,
            max_target_index,
            ..RenderTargetDesc::new(width, height)
        };
        let stage = PostStage::to_target(device, program, &desc)?;
        stage.set_uniform_f32("pixel_size", 1.0 / height as f32)?;
        Ok(Self { stage })
    }

    pub fn render(&mut self, input: TextureId) -> Result<()> {
        self.stage.render(&[input])
    }

    pub fn output_texture(&mut self) -> Result<TextureId> {
        self.stage.output_texture(0)
    }

    pub fn dispose(&mut self) {
        self.stage.dispose();
    }
}

/// Two-pass separable gaussian blur.
///
/// The horizontal pass always writes to an intermediate target; the vertical
/// pass goes wherever `destination` says.
pub struct GaussianBlurStage {
    horizontal: HorizontalBlurStage,
    vertical: VerticalBlurStage,
}

impl GaussianBlurStage {
    pub fn new(
        device: &Arc<dyn GraphicsDevice>,
        horizontal_program: ProgramId,
        vertical_program: ProgramId,
        width: u32,
        height: u32,
        destination: Destination,
    ) -> Result<Self> {
        let horizontal = HorizontalBlurStage::to_target(device, horizontal_program, width, height, 1, 0)?;
        let vertical = match destination {
            Destination::Display => VerticalBlurStage::to_display(device, vertical_program)?,
            Destination::Target => {
                VerticalBlurStage::to_target(device, vertical_program, width, height, 1, 0)?
            }
        };
        Ok(Self { horizontal, vertical })
    }

    pub fn render(&mut self, input: TextureId) -> Result<()> {
        self.horizontal.render(input)?;
        let intermediate = self.horizontal.output_texture()?;
        self.vertical.render(intermediate)
    }

    pub fn output_texture(&mut self) -> Result<TextureId> {
        self.vertical.output_texture()
    }

    pub fn dispose(&mut self) {
        self.horizontal.dispose();
        self.vertical.dispose();
    }
}

#[cfg(test)]
#[path = "blur_tests.rs"]
mod tests;
