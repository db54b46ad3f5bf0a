//! The drawing screen: owns the canvas and the interactive thread's inbox.

use std::sync::Arc;

use fundraw_core::{
    AuthorizationState, Background, BackgroundImage, BrushSize, CanvasError, CanvasResult,
    CanvasState, Capability, Color, ExportError, GateDecision, Notification, PermissionGate,
    PermissionPlatform, TouchEvent, UiMessage,
};
use fundraw_renderer::{Clock, ExportCoordinator, Rasterizer};
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::AppConfig;

/// Something the host UI must do in response to a user action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenEffect {
    /// Show a toast or dialog.
    Notify(Notification),
    /// Storage read was granted; launch the image picker.
    OpenGallery,
}

/// Single-screen drawing controller.
///
/// Every method runs on the interactive thread. Long work (permission
/// prompts, exports) runs on the runtime and comes back as [`UiMessage`]s,
/// which [`DrawingScreen::drain`] or [`DrawingScreen::next_effect`] turn into
/// [`ScreenEffect`]s.
pub struct DrawingScreen {
    canvas: CanvasState,
    gate: PermissionGate,
    coordinator: ExportCoordinator,
    runtime: Handle,
    inbox_tx: UnboundedSender<UiMessage>,
    inbox: UnboundedReceiver<UiMessage>,
}

impl DrawingScreen {
    /// Create the screen with an empty canvas of the configured size.
    #[must_use]
    pub fn new(config: &AppConfig, platform: Arc<dyn PermissionPlatform>, runtime: Handle) -> Self {
        let (inbox_tx, inbox) = mpsc::unbounded_channel();
        let coordinator =
            ExportCoordinator::new(config.export_config(), runtime.clone(), inbox_tx.clone());

        tracing::debug!(
            "Drawing screen {}x{}, exporting to {}",
            config.width,
            config.height,
            config.cache_root.display()
        );

        Self {
            canvas: CanvasState::new(config.width, config.height),
            gate: PermissionGate::new(platform),
            coordinator,
            runtime,
            inbox_tx,
            inbox,
        }
    }

    /// Use a different rasterizer for exports.
    #[must_use]
    pub fn with_rasterizer(mut self, rasterizer: Arc<dyn Rasterizer>) -> Self {
        self.coordinator = self.coordinator.with_rasterizer(rasterizer);
        self
    }

    /// Use a different clock for export file names.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.coordinator = self.coordinator.with_clock(clock);
        self
    }

    /// The drawing state.
    #[must_use]
    pub fn canvas(&self) -> &CanvasState {
        &self.canvas
    }

    /// Feed a touch event to the drawing engine.
    pub fn on_touch(&mut self, event: &TouchEvent) {
        self.canvas.process_event(event);
    }

    /// Undo the last stroke.
    pub fn on_undo_clicked(&mut self) {
        if self.canvas.undo().is_none() {
            tracing::trace!("Nothing to undo");
        }
    }

    /// Color picker confirmed a color.
    pub fn select_color(&mut self, color: Color) {
        self.canvas.set_color(color);
    }

    /// Brush chooser picked a size.
    pub fn select_brush_size(&mut self, size: BrushSize) {
        self.canvas.set_brush_size(size);
    }

    /// The surface was laid out at a new size.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.canvas.resize(width, height);
    }

    /// Install an image picked from the gallery as the background.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::ResourceLoad`] if the bytes are not a supported
    /// image.
    pub fn set_background_image_bytes(&mut self, bytes: &[u8]) -> CanvasResult<()> {
        let decoded = image::load_from_memory(bytes)
            .map_err(|e| CanvasError::ResourceLoad(format!("Background image: {e}")))?
            .to_rgba8();
        let (width, height) = decoded.dimensions();
        let background = BackgroundImage::new(width, height, decoded.into_raw())?;
        self.canvas
            .set_background(Some(Background::Image(Arc::new(background))));
        tracing::debug!("Background image set ({}x{})", width, height);
        Ok(())
    }

    /// Save button: export the canvas once storage write access is confirmed.
    ///
    /// Returns an effect when the outcome is known immediately (rationale or
    /// denial). Otherwise the outcome arrives through the inbox.
    pub fn on_save_clicked(&mut self) -> Option<ScreenEffect> {
        self.request(Capability::StorageWrite)
    }

    /// Gallery button: open the picker once storage read access is confirmed.
    pub fn on_gallery_clicked(&mut self) -> Option<ScreenEffect> {
        self.request(Capability::StorageRead)
    }

    /// Handle every queued message without waiting.
    pub fn drain(&mut self) -> Vec<ScreenEffect> {
        let mut effects = Vec::new();
        while let Ok(message) = self.inbox.try_recv() {
            effects.extend(self.handle_message(message));
        }
        effects
    }

    /// Wait for the next message that produces an effect.
    pub async fn next_effect(&mut self) -> Option<ScreenEffect> {
        while let Some(message) = self.inbox.recv().await {
            if let Some(effect) = self.handle_message(message) {
                return Some(effect);
            }
        }
        None
    }

    fn request(&mut self, capability: Capability) -> Option<ScreenEffect> {
        match self.gate.check_and_request(capability) {
            GateDecision::Authorized => self.proceed(capability),
            GateDecision::RationaleRequired(rationale) => {
                Some(ScreenEffect::Notify(Notification::Rationale(rationale)))
            }
            GateDecision::Requested(pending) => {
                let inbox = self.inbox_tx.clone();
                self.runtime.spawn(async move {
                    let state = pending.await;
                    if inbox
                        .send(UiMessage::AuthorizationResolved { capability, state })
                        .is_err()
                    {
                        tracing::debug!("Screen gone; {capability} decision dropped");
                    }
                });
                None
            }
            GateDecision::Denied => Some(denied(capability)),
        }
    }

    fn proceed(&mut self, capability: Capability) -> Option<ScreenEffect> {
        match capability {
            Capability::StorageWrite => {
                // Detached; the result comes back through the inbox.
                drop(self.coordinator.export(self.canvas.surface()));
                None
            }
            Capability::StorageRead => Some(ScreenEffect::OpenGallery),
        }
    }

    fn handle_message(&mut self, message: UiMessage) -> Option<ScreenEffect> {
        match message {
            UiMessage::ExportFinished(result) => {
                Some(ScreenEffect::Notify(Notification::from_export(&result)))
            }
            UiMessage::AuthorizationResolved { capability, state } => {
                if state == AuthorizationState::Granted {
                    self.proceed(capability)
                } else {
                    tracing::info!("User declined {capability}");
                    Some(denied(capability))
                }
            }
        }
    }
}

/// A refused save ends as a failed export; a refused gallery open is only a
/// notice.
fn denied(capability: Capability) -> ScreenEffect {
    let notification = match capability {
        Capability::StorageWrite => {
            Notification::from_export(&Err(ExportError::PermissionDenied(capability)))
        }
        Capability::StorageRead => Notification::PermissionDenied(capability),
    };
    ScreenEffect::Notify(notification)
}

impl std::fmt::Debug for DrawingScreen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DrawingScreen")
            .field("canvas", &self.canvas)
            .field("coordinator", &self.coordinator)
            .finish_non_exhaustive()
    }
}
