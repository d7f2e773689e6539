/// Combine stage - additive blend of two textures
///
/// Samples the base image on unit 0 and the overlay on unit 1. The only
/// stage the bloom pipeline allows to be terminal.

use std::sync::Arc;

use crate::device::{GraphicsDevice, ProgramId, TextureId};
use crate::error::Result;
use crate::target::RenderTargetDesc;
use super::stage::PostStage;

/// Two-input blend pass.
pub struct CombineStage {
    stage: PostStage,
}

impl CombineStage {
    /// Terminal variant: the blended result goes to the display.
    pub fn to_display(device: &Arc<dyn GraphicsDevice>, program: ProgramId) -> Self {
        Self {
            stage: PostStage::to_display(device, program),
        }
    }

    /// Targeted variant for further chaining.
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
        })
    }

    /// Blend `overlay` over `base`.
    pub fn render(&mut self, base: TextureId, overlay: TextureId) -> Result<()> {
        self.stage.render(&[base, overlay])
    }

    pub fn output_texture(&mut self, attachment: u32) -> Result<TextureId> {
        self.stage.output_texture(attachment)
    }

    pub fn is_terminal(&self) -> bool {
        self.stage.is_terminal()
    }

    pub fn dispose(&mut self) {
        self.stage.dispose();
    }
}

#[cfg(test)]
#[path = "combine_tests.rs"]
mod tests;
