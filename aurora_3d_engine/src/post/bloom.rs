/// Bloom pipeline - contrast/bright-pass, gaussian blur, additive combine
///
/// Dataflow per frame:
///   scene -> contrast (tone at attachment 0, bright-pass at attachment 1)
///   bright-pass -> gaussian blur
///   tone + blurred bright-pass -> combine (display or target)

use std::sync::Arc;

use crate::device::{GraphicsDevice, ProgramId, TextureId};
use crate::error::Result;
use super::blur::GaussianBlurStage;
use super::combine::CombineStage;
use super::contrast::ContrastStage;
use super::stage::Destination;

/// Shader programs the bloom pipeline draws with.
#[derive(Debug, Clone, Copy)]
pub struct BloomPrograms {
    pub contrast: ProgramId,
    pub horizontal_blur: ProgramId,
    pub vertical_blur: ProgramId,
    pub combine: ProgramId,
}

/// Three-stage bloom effect.
pub struct BloomPipeline {
    contrast: ContrastStage,
    blur: GaussianBlurStage,
    combine: CombineStage,
}

impl BloomPipeline {
    /// Build the pipeline at the given working resolution. `destination`
    /// selects where the final combine writes; every inner stage is always
    /// targeted.
    pub fn new(
        device: &Arc<dyn GraphicsDevice>,
        programs: &BloomPrograms,
        width: u32,
        height: u32,
        samples: u32,
        destination: Destination,
    ) -> Result<Self> {
        let contrast =
            ContrastStage::to_target(device, programs.contrast, width, height, samples, 1)?;
        let blur = GaussianBlurStage::new(
            device,
            programs.horizontal_blur,
            programs.vertical_blur,
            width,
            height,
            Destination::Target,
        )?;
        let combine = match destination {
            Destination::Display => CombineStage::to_display(device, programs.combine),
            Destination::Target => {
                CombineStage::to_target(device, programs.combine, width, height, samples, 0)?
            }
        };
        Ok(Self {
            contrast,
            blur,
            combine,
        })
    }

    /// Tone adjustment applied by the contrast stage (see
    /// `ContrastStage::set_values` for ranges).
    pub fn set_contrast_values(
        &mut self,
        contrast: f32,
        brightness: f32,
        saturation: f32,
    ) -> &mut Self {
        self.contrast.set_values(contrast, brightness, saturation);
        self
    }

    /// Run the full effect over `scene`.
    pub fn render(&mut self, scene: TextureId) -> Result<()> {
        self.contrast.render(scene)?;
        let bright_pass = self.contrast.output_texture(1)?;
        self.blur.render(bright_pass)?;
        let tone = self.contrast.output_texture(0)?;
        let blurred = self.blur.output_texture()?;
        self.combine.render(tone, blurred)
    }

    /// Final output texture (combine stage must be targeted).
    pub fn output_texture(&mut self, attachment: u32) -> Result<TextureId> {
        self.combine.output_texture(attachment)
    }

    pub fn dispose(&mut self) {
        self.contrast.dispose();
        self.blur.dispose();
        self.combine.dispose();
    }
}

#[cfg(test)]
#[path = "bloom_tests.rs"]
mod tests;
