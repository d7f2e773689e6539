//! Aurora3D Engine - singleton manager for engine subsystems
//!
//! Global singleton management for the graphics device and the logger,
//! using thread-safe static storage (OnceLock + RwLock).

use std::sync::{OnceLock, RwLock, Arc};
use std::time::SystemTime;
use crate::device::GraphicsDevice;
use crate::error::{Result, Error};
use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};

// ===== INTERNAL STATE =====

/// Global engine state storage
static ENGINE_STATE: OnceLock<EngineState> = OnceLock::new();

/// Global logger (initialized with DefaultLogger)
static LOGGER: OnceLock<RwLock<Box<dyn Logger>>> = OnceLock::new();

/// Internal state structure holding all engine singletons
struct EngineState {
    /// Graphics device singleton
    device: RwLock<Option<Arc<dyn GraphicsDevice>>>,
}

impl EngineState {
    fn new() -> Self {
        Self {
            device: RwLock::new(None),
        }
    }
}

// ===== PUBLIC API =====

/// Main engine singleton manager
///
/// Manages the lifecycle of the graphics device singleton and the global
/// logger. Subsystems (render targets, pipeline stages) take the device as
/// an explicit `Arc<dyn GraphicsDevice>`; `Engine::device()` is how
/// application code gets that handle after setup.
///
/// # Example
///
/// ```no_run
/// use aurora_3d_engine::aurora3d::Engine;
/// use aurora_3d_engine_device_software::SoftwareDevice;
///
/// Engine::initialize()?;
/// Engine::create_device(SoftwareDevice::new(1280, 720))?;
///
/// let device = Engine::device()?;
/// // build render targets / pipelines against `device`...
///
/// Engine::shutdown();
/// # Ok::<(), aurora_3d_engine::aurora3d::Error>(())
/// ```
pub struct Engine;

impl Engine {
    /// Helper to log errors before returning them (internal use)
    fn log_and_return_error(error: Error) -> Error {
        match &error {
            Error::InitializationFailed(msg) => {
                crate::engine_error!("aurora3d::Engine", "Initialization failed: {}", msg);
            }
            Error::BackendError(msg) => {
                crate::engine_error!("aurora3d::Engine", "Backend error: {}", msg);
            }
            _ => {
                crate::engine_error!("aurora3d::Engine", "Engine error: {}", error);
            }
        }
        error
    }

    /// Initialize the engine
    ///
    /// Must be called once at application startup before creating any
    /// subsystems.
    ///
    /// # Errors
    ///
    /// Currently always succeeds, but returns Result for future extensibility.
    pub fn initialize() -> Result<()> {
        ENGINE_STATE.get_or_init(EngineState::new);
        Ok(())
    }

    /// Shutdown the engine and destroy all singletons
    pub fn shutdown() {
        if let Some(state) = ENGINE_STATE.get() {
            if let Ok(mut device) = state.device.write() {
                *device = None;
            }
        }
    }

    /// Create and register the graphics device singleton
    ///
    /// Wraps the device in an `Arc` and registers it as the global device.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The engine is not initialized
    /// - A device already exists
    /// - The device lock is poisoned
    pub fn create_device<D: GraphicsDevice + 'static>(device: D) -> Result<()> {
        let arc_device: Arc<dyn GraphicsDevice> = Arc::new(device);
        Self::register_device(arc_device)?;
        crate::engine_info!("aurora3d::Engine", "Graphics device singleton created");
        Ok(())
    }

    /// Register a graphics device singleton (internal use)
    pub(crate) fn register_device(device: Arc<dyn GraphicsDevice>) -> Result<()> {
        let state = ENGINE_STATE.get()
            .ok_or_else(|| Self::log_and_return_error(
                Error::InitializationFailed("Engine not initialized. Call Engine::initialize() first.".to_string())
            ))?;

        let mut lock = state.device.write()
            .map_err(|_| Self::log_and_return_error(
                Error::BackendError("Device lock poisoned".to_string())
            ))?;

        if lock.is_some() {
            return Err(Self::log_and_return_error(
                Error::InitializationFailed("Graphics device already exists. Call Engine::destroy_device() first.".to_string())
            ));
        }

        *lock = Some(device);
        Ok(())
    }

    /// Get the graphics device singleton
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The engine is not initialized
    /// - The device has not been created
    pub fn device() -> Result<Arc<dyn GraphicsDevice>> {
        let state = ENGINE_STATE.get()
            .ok_or_else(|| Self::log_and_return_error(
                Error::InitializationFailed("Engine not initialized. Call Engine::initialize() first.".to_string())
            ))?;

        let lock = state.device.read()
            .map_err(|_| Self::log_and_return_error(
                Error::BackendError("Device lock poisoned".to_string())
            ))?;

        lock.clone()
            .ok_or_else(|| Self::log_and_return_error(
                Error::InitializationFailed("Graphics device not created. Call Engine::create_device() first.".to_string())
            ))
    }

    /// Destroy the graphics device singleton
    ///
    /// Removes the device singleton, allowing a new one to be created.
    /// Existing device references remain valid until dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine is not initialized
    pub fn destroy_device() -> Result<()> {
        let state = ENGINE_STATE.get()
            .ok_or_else(|| Self::log_and_return_error(
                Error::InitializationFailed("Engine not initialized".to_string())
            ))?;

        let mut lock = state.device.write()
            .map_err(|_| Self::log_and_return_error(
                Error::BackendError("Device lock poisoned".to_string())
            ))?;

        *lock = None;

        crate::engine_info!("aurora3d::Engine", "Graphics device singleton destroyed");

        Ok(())
    }

    /// Reset all singletons for testing (only available in test builds)
    #[cfg(test)]
    pub fn reset_for_testing() {
        if let Some(state) = ENGINE_STATE.get() {
            if let Ok(mut device) = state.device.write() {
                *device = None;
            }
        }
    }

    // ===== LOGGING API =====

    /// Set a custom logger
    ///
    /// Replace the default logger with a custom implementation.
    pub fn set_logger<L: Logger + 'static>(logger: L) {
        let logger_lock = LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)));
        if let Ok(mut lock) = logger_lock.write() {
            *lock = Box::new(logger);
        }
    }

    /// Reset logger to the default console logger
    pub fn reset_logger() {
        let logger_lock = LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)));
        if let Ok(mut lock) = logger_lock.write() {
            *lock = Box::new(DefaultLogger);
        }
    }

    /// Internal logging method (for simple logs without file:line)
    ///
    /// Used by the engine_trace!/debug!/info!/warn! macros.
    pub fn log(severity: LogSeverity, source: &str, message: String) {
        let logger_lock = LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)));
        if let Ok(lock) = logger_lock.read() {
            lock.log(&LogEntry {
                severity,
                timestamp: SystemTime::now(),
                source: source.to_string(),
                message,
                file: None,
                line: None,
            });
        }
    }

    /// Internal logging method with file:line information (for ERROR logs)
    ///
    /// Used by the engine_error! macro to include source location.
    pub fn log_detailed(
        severity: LogSeverity,
        source: &str,
        message: String,
        file: &'static str,
        line: u32,
    ) {
        let logger_lock = LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)));
        if let Ok(lock) = logger_lock.read() {
            lock.log(&LogEntry {
                severity,
                timestamp: SystemTime::now(),
                source: source.to_string(),
                message,
                file: Some(file),
                line: Some(line),
            });
        }
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
