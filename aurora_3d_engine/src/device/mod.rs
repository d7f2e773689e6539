/// Device module - backend contract and device-limit probing

// Module declarations
pub mod graphics_device;
pub mod limits;

#[cfg(test)]
pub mod mock_device;

// Re-export everything from graphics_device.rs
pub use graphics_device::*;

// Re-export the limits probe
pub use limits::max_color_targets;
