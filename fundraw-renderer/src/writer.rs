//! Persisting encoded snapshots.
//!
//! Bytes go to a temp file in the destination directory, are synced, and
//! only then renamed onto the final name. A failed write leaves nothing at the
//! destination path.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use tempfile::NamedTempFile;

use fundraw_core::ExportResult;

use crate::encode::EncodedImage;

/// File name prefix of every exported snapshot.
pub const FILE_PREFIX: &str = "FunDrawApp";

/// Source of the timestamp used in snapshot file names.
pub trait Clock: Send + Sync {
    /// Seconds since the Unix epoch.
    fn epoch_seconds(&self) -> u64;
}

/// The system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn epoch_seconds(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

/// A clock stuck at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub u64);

impl Clock for FixedClock {
    fn epoch_seconds(&self) -> u64 {
        self.0
    }
}

/// Writes encoded snapshots to disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct PersistentWriter;

impl PersistentWriter {
    /// Path for a snapshot taken at `epoch_seconds`:
    /// `<cache_root>/FunDrawApp<epoch_seconds>.<ext>`.
    ///
    /// Two snapshots taken within the same second get the same path.
    #[must_use]
    pub fn destination(cache_root: &Path, epoch_seconds: u64, image: &EncodedImage) -> PathBuf {
        cache_root.join(format!(
            "{FILE_PREFIX}{epoch_seconds}.{}",
            image.format().extension()
        ))
    }

    /// Write `image` to `destination`, creating the parent directory if
    /// needed. Returns the absolute path of the written file.
    ///
    /// An existing file at `destination` is replaced.
    ///
    /// # Errors
    ///
    /// Returns [`fundraw_core::ExportError::Io`] on any filesystem failure; in
    /// that case no file exists at `destination` that was produced by this
    /// call.
    pub fn write(&self, image: &EncodedImage, destination: &Path) -> ExportResult<PathBuf> {
        self.write_with(image, destination, |file, bytes| file.write_all(bytes))
    }

    /// Like [`PersistentWriter::write`], with the byte copy into the temp
    /// file supplied by the caller.
    pub(crate) fn write_with<F>(
        &self,
        image: &EncodedImage,
        destination: &Path,
        fill: F,
    ) -> ExportResult<PathBuf>
    where
        F: FnOnce(&mut NamedTempFile, &[u8]) -> std::io::Result<()>,
    {
        let destination = std::path::absolute(destination)?;
        let dir = destination.parent().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("{} has no parent directory", destination.display()),
            )
        })?;
        std::fs::create_dir_all(dir)?;

        let mut tmp = tempfile::Builder::new()
            .prefix(".fundraw-")
            .suffix(".part")
            .tempfile_in(dir)?;
        fill(&mut tmp, image.bytes())?;
        tmp.as_file_mut().flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(&destination).map_err(|e| e.error)?;

        tracing::debug!(
            "Wrote {} bytes to {}",
            image.len(),
            destination.display()
        );
        Ok(destination)
    }
}
