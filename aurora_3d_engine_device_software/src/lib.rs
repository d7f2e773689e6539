/*!
# Aurora 3D Engine - Software Device Backend

Headless CPU implementation of the aurora_3d_engine graphics device.

This crate rasterizes full-screen passes in memory: textures and
renderbuffers are float texel arrays, shader programs are Rust closures
registered at runtime, and blits are plain scaled copies. No GPU or window
system is required, which makes it the backend of choice for integration
tests and for running the post-processing pipeline in CI.
*/

// Software implementation modules
mod software_device;

pub use software_device::{FragmentFn, FragmentInputs, SoftwareDevice};
