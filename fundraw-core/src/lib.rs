//! # FunDraw Core
//!
//! Drawing model and export gating for the FunDraw canvas.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                fundraw-core                 │
//! ├─────────────────────────────────────────────┤
//! │  Surface         │  Input                   │
//! │  - Background    │  - Touch events          │
//! │  - Strokes       │  - Brush selection       │
//! │  - Undo          │  - Stroke building       │
//! ├─────────────────────────────────────────────┤
//! │  Permissions     │  Notifications           │
//! │  - Gate          │  - User messages         │
//! │  - Prompts       │  - UI thread inbox       │
//! └─────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod event;
pub mod notification;
pub mod permission;
pub mod state;
pub mod stroke;
pub mod surface;

pub use error::{CanvasError, CanvasResult, ExportError, ExportResult};
pub use event::{TouchEvent, TouchPhase, TouchPoint};
pub use notification::{Notification, UiMessage};
pub use permission::{
    AuthorizationResponder, AuthorizationState, Capability, GateDecision, InMemoryPermissions,
    PendingAuthorization, PermissionGate, PermissionPlatform, Rationale,
};
pub use state::CanvasState;
pub use stroke::{BrushConfig, BrushSize, Color, Stroke, StrokePoint};
pub use surface::{Background, BackgroundImage, Surface};

/// FunDraw core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
