//! Snapshot export: rasterize, encode, persist, report.
//!
//! [`ExportCoordinator::run`] is the synchronous pipeline.
//! [`ExportCoordinator::export`] snapshots the surface, runs the pipeline on
//! the runtime's blocking pool, and posts one [`UiMessage::ExportFinished`]
//! to the interactive thread's queue.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;

use fundraw_core::{ExportError, ExportResult, Surface, UiMessage};
use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

use crate::encode::{ImageEncoder, JPEG_QUALITY};
use crate::raster::{Rasterizer, SkiaRasterizer};
use crate::writer::{Clock, PersistentWriter, SystemClock};

/// Configuration for snapshot export.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Directory snapshots are written to (created on demand).
    pub cache_root: PathBuf,
}

impl ExportConfig {
    /// Configuration writing into `cache_root`.
    #[must_use]
    pub fn new(cache_root: impl Into<PathBuf>) -> Self {
        Self {
            cache_root: cache_root.into(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self::new(std::env::temp_dir().join("fundraw"))
    }
}

/// Runs snapshot exports off the interactive thread.
#[derive(Clone)]
pub struct ExportCoordinator {
    config: ExportConfig,
    rasterizer: Arc<dyn Rasterizer>,
    encoder: ImageEncoder,
    writer: PersistentWriter,
    clock: Arc<dyn Clock>,
    runtime: Handle,
    inbox: UnboundedSender<UiMessage>,
}

impl ExportCoordinator {
    /// Create a coordinator that runs on `runtime` and reports to `inbox`.
    #[must_use]
    pub fn new(config: ExportConfig, runtime: Handle, inbox: UnboundedSender<UiMessage>) -> Self {
        Self {
            config,
            rasterizer: Arc::new(SkiaRasterizer::new()),
            encoder: ImageEncoder,
            writer: PersistentWriter,
            clock: Arc::new(SystemClock),
            runtime,
            inbox,
        }
    }

    /// Use a different rasterizer.
    #[must_use]
    pub fn with_rasterizer(mut self, rasterizer: Arc<dyn Rasterizer>) -> Self {
        self.rasterizer = rasterizer;
        self
    }

    /// Use a different clock for file naming.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Run the pipeline on the calling thread.
    ///
    /// Stages run strictly in order and the first failure ends the export.
    ///
    /// # Errors
    ///
    /// Returns the error of the first failing stage.
    pub fn run(&self, surface: &Surface) -> ExportResult<PathBuf> {
        let buffer = self.rasterizer.rasterize(surface)?;
        let encoded = self.encoder.encode(&buffer, JPEG_QUALITY)?;
        drop(buffer);

        let destination = PersistentWriter::destination(
            &self.config.cache_root,
            self.clock.epoch_seconds(),
            &encoded,
        );
        self.writer.write(&encoded, &destination)
    }

    /// Export a snapshot of `surface` in the background.
    ///
    /// The surface is copied before this returns, so later edits do not
    /// affect the export. Exactly one [`UiMessage::ExportFinished`] is posted
    /// when the export completes. Dropping the returned handle does not
    /// cancel the export.
    pub fn export(&self, surface: &Surface) -> JoinHandle<()> {
        let snapshot = surface.clone();
        let coordinator = self.clone();

        tracing::debug!(
            "Starting export of {}x{} surface",
            snapshot.width(),
            snapshot.height()
        );

        self.runtime.spawn_blocking(move || {
            let result = panic::catch_unwind(AssertUnwindSafe(|| coordinator.run(&snapshot)))
                .unwrap_or_else(|payload| Err(ExportError::Raster(panic_reason(&*payload))));
            match &result {
                Ok(path) => tracing::info!("Snapshot saved to {}", path.display()),
                Err(e) => tracing::warn!("Snapshot export failed: {e}"),
            }
            if coordinator
                .inbox
                .send(UiMessage::ExportFinished(result))
                .is_err()
            {
                tracing::debug!("Interactive thread gone; export result dropped");
            }
        })
    }
}

fn panic_reason(payload: &(dyn Any + Send)) -> String {
    let detail = payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown cause");
    format!("Export panicked: {detail}")
}

impl std::fmt::Debug for ExportCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportCoordinator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
