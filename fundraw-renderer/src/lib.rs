//! # FunDraw Renderer
//!
//! Turns the live drawing surface into a JPEG file on disk.
//!
//! ## Export Pipeline
//!
//! ```text
//! ┌───────────┐   ┌──────────────┐   ┌──────────┐   ┌──────────────────┐
//! │  Surface  │──▶│  Rasterizer  │──▶│ Encoder  │──▶│ PersistentWriter │
//! │ (snapshot)│   │ (tiny-skia)  │   │ (JPEG 90)│   │ (tmp + rename)   │
//! └───────────┘   └──────────────┘   └──────────┘   └────────┬─────────┘
//!                                                             │
//!                        UI thread inbox ◀── ExportFinished ──┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod encode;
pub mod export;
pub mod raster;
pub mod writer;

pub use encode::{EncodedFormat, EncodedImage, ImageEncoder, JPEG_QUALITY};
pub use export::{ExportConfig, ExportCoordinator};
pub use raster::{PixelBuffer, Rasterizer, SkiaRasterizer};
pub use writer::{Clock, FixedClock, PersistentWriter, SystemClock, FILE_PREFIX};
