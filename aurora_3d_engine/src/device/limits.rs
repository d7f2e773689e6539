/// Device limits probe
///
/// Queries the device once for the number of usable simultaneous color
/// outputs and caches the answer for the lifetime of the process. The two
/// relevant backend limits (maximum color attachments per framebuffer,
/// maximum simultaneously writable draw buffers) are folded into their
/// minimum, since a target index is only usable when both allow it.

use std::sync::Mutex;

use super::GraphicsDevice;

/// Process-wide cached limit. `None` until the first probe.
static MAX_COLOR_TARGETS: Mutex<Option<u32>> = Mutex::new(None);

/// Highest color target index the device supports.
///
/// The first call queries the device; every later call returns the cached
/// value without touching the device, even if a different device is passed.
/// Device limits never change during a run, so the cache is never
/// invalidated.
pub fn max_color_targets(device: &dyn GraphicsDevice) -> u32 {
    let mut cached = MAX_COLOR_TARGETS.lock().unwrap();
    *cached.get_or_insert_with(|| {
        let limit = device
            .max_color_attachments()
            .min(device.max_draw_buffers());
        crate::engine_debug!("aurora3d::limits", "Device reports {} usable color targets", limit);
        limit
    })
}

/// Drop the cached limit so the next probe re-queries the device.
///
/// Tests construct mock devices with different limits; they must run
/// serially (see limits_tests.rs).
#[cfg(test)]
pub(crate) fn reset() {
    *MAX_COLOR_TARGETS.lock().unwrap() = None;
}

#[cfg(test)]
#[path = "limits_tests.rs"]
mod tests;
