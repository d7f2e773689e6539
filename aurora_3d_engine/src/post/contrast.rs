/// Contrast stage - tone adjustment and bright-pass extraction
///
/// Writes the tone-adjusted scene to color attachment 0 and, when built with
/// a second target, the bright-pass mask to attachment 1 (the bloom pipeline
/// consumes both).

use std::sync::Arc;

use crate::device::{GraphicsDevice, ProgramId, TextureId};
use crate::error::Result;
use crate::target::RenderTargetDesc;
use super::stage::PostStage;

/// Full-screen contrast/brightness/saturation pass.
pub struct ContrastStage {
    stage: PostStage,
    contrast: f32,
    brightness: f32,
    saturation: f32,
}

impl ContrastStage {
    /// Terminal variant: adjusted output goes straight to the display.
    pub fn to_display(device: &Arc<dyn GraphicsDevice>, program: ProgramId) -> Self {
        Self {
            stage: PostStage::to_display(device, program),
            contrast: 1.0,
            brightness: 1.0,
            saturation: 1.0,
        }
    }

    /// Targeted variant. `max_target_index = 1` additionally produces the
    /// bright-pass mask on attachment 1.
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
        Ok(Self {
            stage: PostStage::to_target(device, program, &desc)?,
            contrast: 1.0,
            brightness: 1.0,
            saturation: 1.0,
        })
    }

    /// Set the adjustment values applied on the next `render`.
    ///
    /// `contrast` is unbounded (1 = neutral, 0 = flat grey, negative flips
    /// colors). `brightness` is floored at 0, `saturation` clamped to
    /// `[0, 1]`; both default to the neutral 1.
    pub fn set_values(&mut self, contrast: f32, brightness: f32, saturation: f32) -> &mut Self {
        self.contrast = contrast;
        self.brightness = brightness.max(0.0);
        self.saturation = saturation.clamp(0.0, 1.0);
        self
    }

    pub fn contrast(&self) -> f32 {
        self.contrast
    }

    pub fn brightness(&self) -> f32 {
        self.brightness
    }

    pub fn saturation(&self) -> f32 {
        self.saturation
    }

    /// Adjust `input` and write the result (and bright-pass mask, when
    /// configured) to the stage's destination.
    pub fn render(&mut self, input: TextureId) -> Result<()> {
        self.stage.set_uniform_f32("brightness", self.brightness)?;
        self.stage.set_uniform_f32("contrast", self.contrast)?;
        self.stage.set_uniform_f32("saturation", self.saturation)?;
        self.stage.render(&[input])
    }

    /// Sampleable output on color attachment `attachment`
    pub fn output_texture(&mut self, attachment: u32) -> Result<TextureId> {
        self.stage.output_texture(attachment)
    }

    pub fn depth_texture(&self) -> Option<TextureId> {
        self.stage.depth_texture()
    }

    pub fn dispose(&mut self) {
        self.stage.dispose();
    }
}

#[cfg(test)]
#[path = "contrast_tests.rs"]
mod tests;
