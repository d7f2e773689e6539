/// Post module - full-screen pipeline stages and their composition
///
/// A stage couples a shader program with an optional render target: targeted
/// stages write into a texture the next stage samples, terminal stages write
/// straight to the display. Composite filters (gaussian blur, bloom) chain
/// stages by feeding one stage's output texture into the next.

// Module declarations
pub mod bloom;
pub mod blur;
pub mod combine;
pub mod contrast;
pub mod stage;

// Re-exports
pub use bloom::*;
pub use blur::*;
pub use combine::*;
pub use contrast::*;
pub use stage::*;
