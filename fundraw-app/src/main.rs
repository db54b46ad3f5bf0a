//! # FunDraw
//!
//! Headless host: draws a small picture, presses "save" and reports the
//! outcome the way the screen would show it.

use std::sync::Arc;
use std::time::Duration;

use fundraw_app::{AppConfig, DrawingScreen, ScreenEffect};
use fundraw_core::{BrushSize, Capability, Color, InMemoryPermissions, TouchEvent, TouchPhase};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// How long to wait for the export to report back.
const EXPORT_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fundraw_app=debug,fundraw_renderer=debug,fundraw_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting FunDraw");

    let config = AppConfig::from_env();
    tracing::info!(
        "Surface {}x{}, cache {}",
        config.width,
        config.height,
        config.cache_root.display()
    );

    // No platform prompt in a headless host: the user "accepts" every prompt.
    let permissions = Arc::new(InMemoryPermissions::new());
    permissions.auto_respond(Capability::StorageWrite, true);

    let mut screen = DrawingScreen::new(&config, permissions, tokio::runtime::Handle::current());
    draw_sample(&mut screen, &config);

    if let Some(effect) = screen.on_save_clicked() {
        report(&effect);
        return Ok(());
    }

    match tokio::time::timeout(EXPORT_TIMEOUT, screen.next_effect()).await {
        Ok(Some(effect)) => report(&effect),
        Ok(None) => anyhow::bail!("Screen inbox closed before the export finished"),
        Err(_) => anyhow::bail!("Export did not finish within {EXPORT_TIMEOUT:?}"),
    }

    tracing::info!("FunDraw exited");
    Ok(())
}

/// Draw a few strokes across the surface.
#[allow(clippy::cast_precision_loss)] // Surface dimensions fit in f32
fn draw_sample(screen: &mut DrawingScreen, config: &AppConfig) {
    let (w, h) = (config.width as f32, config.height as f32);
    let strokes = [
        (Color::BLACK, BrushSize::Medium, [(0.1, 0.1), (0.5, 0.5), (0.9, 0.1)]),
        (Color::RED, BrushSize::Large, [(0.1, 0.9), (0.5, 0.6), (0.9, 0.9)]),
        (Color::BLUE, BrushSize::Small, [(0.2, 0.5), (0.5, 0.3), (0.8, 0.5)]),
    ];

    for (color, size, points) in strokes {
        screen.select_color(color);
        screen.select_brush_size(size);
        let last = points.len() - 1;
        for (i, (x, y)) in points.into_iter().enumerate() {
            let phase = match i {
                0 => TouchPhase::Start,
                i if i == last => TouchPhase::End,
                _ => TouchPhase::Move,
            };
            screen.on_touch(&TouchEvent::single(phase, x * w, y * h, i as u64 * 16));
        }
    }

    tracing::debug!(
        "Sample drawn with {} strokes",
        screen.canvas().surface().stroke_count()
    );
}

fn report(effect: &ScreenEffect) {
    match effect {
        ScreenEffect::Notify(notification) => match notification.title() {
            Some(title) => tracing::info!("[dialog] {title}: {notification}"),
            None => tracing::info!("[toast] {notification}"),
        },
        ScreenEffect::OpenGallery => tracing::info!("[gallery] picker requested"),
    }
}
