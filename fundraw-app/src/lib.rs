//! # FunDraw App
//!
//! Interactive screen controller for the FunDraw canvas.
//!
//! The host UI owns a [`DrawingScreen`] on its interactive thread, forwards
//! touch and button events to it, and periodically calls
//! [`DrawingScreen::drain`] to collect toasts, dialogs and picker requests
//! produced by background work.
//!
//! ## Usage
//!
//! ```bash
//! FUNDRAW_CACHE_DIR=/tmp/fundraw cargo run -p fundraw-app
//! ```
//!
//! ## Architecture
//!
//! - `AppConfig` - Surface size and export directory, from the environment
//! - `DrawingScreen` - Canvas, permission gate and export coordinator
//! - `ScreenEffect` - What the host UI must show or launch

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]

mod app;

pub use app::{DrawingScreen, ScreenEffect};

use std::path::PathBuf;

use fundraw_renderer::ExportConfig;

/// Environment variable overriding the export directory.
pub const CACHE_DIR_ENV: &str = "FUNDRAW_CACHE_DIR";
/// Environment variable overriding the surface width.
pub const WIDTH_ENV: &str = "FUNDRAW_WIDTH";
/// Environment variable overriding the surface height.
pub const HEIGHT_ENV: &str = "FUNDRAW_HEIGHT";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Surface width in pixels.
    pub width: u32,
    /// Surface height in pixels.
    pub height: u32,
    /// Directory exported snapshots are written to.
    pub cache_root: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AppConfig {
    /// Create a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            width: 800,
            height: 600,
            cache_root: ExportConfig::default().cache_root,
        }
    }

    /// Read overrides from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read overrides through `lookup`. Unparseable values are ignored.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::new();
        if let Some(dir) = lookup(CACHE_DIR_ENV).filter(|d| !d.is_empty()) {
            config.cache_root = PathBuf::from(dir);
        }
        if let Some(width) = parse_dimension(&lookup, WIDTH_ENV) {
            config.width = width;
        }
        if let Some(height) = parse_dimension(&lookup, HEIGHT_ENV) {
            config.height = height;
        }
        config
    }

    /// The export configuration derived from this one.
    #[must_use]
    pub fn export_config(&self) -> ExportConfig {
        ExportConfig::new(self.cache_root.clone())
    }
}

fn parse_dimension(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<u32> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("Ignoring {key}={raw:?}: {e}");
            None
        }
    }
}
