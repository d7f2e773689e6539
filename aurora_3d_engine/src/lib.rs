/*!
# Aurora 3D Engine

Core types for the Aurora 3D rendering engine.

This crate provides the platform-agnostic render-target manager and the
post-processing pipeline built on top of it. The graphics device itself is
abstracted behind the `GraphicsDevice` trait; backend implementations (a
headless software backend ships as a separate workspace member) provide the
concrete GPU plumbing.

## Architecture

- **GraphicsDevice**: backend trait — attachment factories, framebuffer
  wiring, blits, full-screen draws
- **RenderTarget**: aggregate of color/depth attachments with multisample
  handling and a lazily-resolved companion for sampleable reads
- **PostStage**: one processing step of a pipeline (inputs in, textures or
  the display out)
- **BloomPipeline**: the contrast → blur → combine composition

Backend implementations provide a concrete `GraphicsDevice`.
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod device;
pub mod target;
pub mod post;

// Main aurora3d namespace module
pub mod aurora3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Engine singleton
    pub use crate::engine::Engine;

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
        // Note: engine_* macros are NOT re-exported here - they are internal only
    }

    // Device sub-module (backend contract + handle types)
    pub mod device {
        pub use crate::device::*;
    }

    // Render target sub-module
    pub mod target {
        pub use crate::target::*;
    }

    // Post-processing sub-module
    pub mod post {
        pub use crate::post::*;
    }
}

// Re-export math library at crate root
pub use glam;
