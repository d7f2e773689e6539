/// Target module - render-target resource management
///
/// A render target aggregates color and depth attachments with a fixed size
/// and sample count, tracks staleness of its resolve cache, and exposes its
/// contents as sampleable textures to later pipeline stages.

// Module declarations
pub mod attachment;
pub mod render_target;

// Re-exports
pub use attachment::*;
pub use render_target::*;
