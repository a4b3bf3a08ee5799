// Headless session module
// Stands in for the windowing environment: virtual windows on a virtual screen,
// a simulated clock, and scripted user drags

use crate::content::{ContentDecoder, DecodedContent, ImageFileDecoder};
use crate::coordinator::Coordinator;
use crate::events::SurfaceId;
use crate::geometry::{Point, Rect, Size};
use crate::settings::Settings;
use crate::surface::{SurfaceState, SurfaceWindow, WindowFactory};
use anyhow::{Context, Result};
use log::{debug, info, trace, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Simulated clock resolution; fast timers are polled at least this often
const MAX_STEP: Duration = Duration::from_millis(10);

/// A scripted drag of a window to a new origin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Drag {
    pub surface: SurfaceId,
    pub origin: Point,
}

/// Everything a headless run needs
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub image_path: PathBuf,
    pub windows: usize,
    pub settings: Settings,
    pub randomize: bool,
    pub screen: Size,
    pub drags: Vec<Drag>,
    pub focus: Option<SurfaceId>,
    pub duration: Duration,
}

/// Place a new window the way the manager does: somewhere in the upper
/// middle of the screen, 2/5 of the screen wide and half of it tall
pub fn random_window_rect<R: Rng + ?Sized>(screen: Size, rng: &mut R) -> Rect {
    let width = screen.width as f32;
    let height = screen.height as f32;
    let x = rng.gen_range(screen.width / 4..=screen.width / 2);
    let y = rng.gen_range(0..=screen.height / 2);
    Rect::from_xywh(
        x as i32,
        y as i32,
        (width / 2.5) as u32,
        (height / 2.0) as u32,
    )
}

/// Virtual window that only logs the commands it receives
#[derive(Debug, Default)]
pub struct HeadlessWindow;

impl SurfaceWindow for HeadlessWindow {
    fn show_content(&mut self, id: SurfaceId, content: Option<&DecodedContent>, displayed: Size) {
        match content {
            Some(c) => debug!("Window {} shows {} at {}", id, c.path.display(), displayed),
            None => debug!("Window {} shows nothing", id),
        }
    }

    fn place_content(&mut self, id: SurfaceId, local: Rect) {
        trace!("Window {} content at {}", id, local);
    }

    fn restart_animation(&mut self, id: SurfaceId) {
        debug!("Window {} restarts animation", id);
    }

    fn release(&mut self, id: SurfaceId) {
        debug!("Window {} released", id);
    }
}

/// Window factory for a virtual screen
pub struct HeadlessScreen<R> {
    screen: Size,
    rng: R,
}

impl<R: Rng> HeadlessScreen<R> {
    pub fn new(screen: Size, rng: R) -> Self {
        Self { screen, rng }
    }
}

impl<R: Rng> WindowFactory for HeadlessScreen<R> {
    fn create_window(&mut self, id: SurfaceId) -> (Rect, Box<dyn SurfaceWindow>) {
        let rect = random_window_rect(self.screen, &mut self.rng);
        debug!("Window {} created at {}", id, rect);
        (rect, Box::new(HeadlessWindow))
    }
}

/// Final state of one surface
#[derive(Debug, Clone)]
pub struct SurfaceSummary {
    pub id: SurfaceId,
    pub window: Rect,
    pub content_position: Point,
    pub displayed: Size,
    pub state: SurfaceState,
}

/// Result of a headless run
#[derive(Debug, Clone)]
pub struct SessionSummary {
    pub surfaces: Vec<SurfaceSummary>,
    pub settings: Settings,
    pub status: Option<String>,
    pub ticks: usize,
}

impl fmt::Display for SessionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} surfaces, scale {:.2}, {:?}, keep centered: {}, refresh {:?}, {} ticks",
            self.surfaces.len(),
            self.settings.scale,
            self.settings.follow_policy,
            self.settings.keep_centered,
            self.settings.refresh_interval,
            self.ticks
        )?;
        for s in &self.surfaces {
            writeln!(
                f,
                "  {:>4}  window {:<22} content {:<14} size {:<11} {:?}",
                s.id.to_string(),
                s.window.to_string(),
                s.content_position.to_string(),
                s.displayed.to_string(),
                s.state
            )?;
        }
        if let Some(status) = &self.status {
            write!(f, "status: {}", status)?;
        }
        Ok(())
    }
}

/// Run a full headless session with `rng` driving window placement
pub fn run<R: Rng>(config: &SessionConfig, mut rng: R) -> Result<SessionSummary> {
    let decoder = ImageFileDecoder;
    let probe = decoder
        .decode(&config.image_path, Size::default())
        .with_context(|| format!("Cannot display {}", config.image_path.display()))?;
    info!(
        "Content loaded: {} ({})",
        probe.source_size,
        if probe.is_animated() { "animated" } else { "static" }
    );

    let mut coordinator = Coordinator::with_settings(Box::new(decoder), config.settings)
        .context("Invalid startup settings")?;
    coordinator.set_shared_content(&config.image_path);

    let start = Instant::now();
    let mut screen = HeadlessScreen::new(config.screen, &mut rng);
    coordinator
        .open_surfaces(config.windows, &mut screen, start)
        .context("Failed to open windows")?;

    if config.randomize {
        let mut placement = StdRng::seed_from_u64(rng.gen());
        let mut screen = HeadlessScreen::new(config.screen, &mut placement);
        coordinator
            .randomize(&mut rng, &mut screen, start)
            .context("Failed to randomize settings")?;
    }

    coordinator.set_focus(config.focus);

    let step = coordinator.settings().refresh_interval.min(MAX_STEP);
    let drag_at = config.duration / 2;
    let mut elapsed = Duration::ZERO;
    let mut dragged = config.drags.is_empty();
    let mut ticks = 0;

    info!(
        "Simulating {:?} with {} windows",
        config.duration,
        coordinator.len()
    );

    while elapsed <= config.duration {
        if !dragged && elapsed >= drag_at {
            apply_drags(&mut coordinator, &config.drags);
            dragged = true;
        }
        ticks += coordinator.advance(start + elapsed);
        elapsed += step;
    }

    let surfaces = coordinator
        .surfaces()
        .iter()
        .map(|s| SurfaceSummary {
            id: s.id(),
            window: s.window(),
            content_position: s.content_position(),
            displayed: s.displayed_size(),
            state: s.state(),
        })
        .collect();

    let summary = SessionSummary {
        surfaces,
        settings: *coordinator.settings(),
        status: coordinator.status().map(str::to_string),
        ticks,
    };

    coordinator.close_all();
    Ok(summary)
}

fn apply_drags(coordinator: &mut Coordinator, drags: &[Drag]) {
    for drag in drags {
        match coordinator.surface_mut(drag.surface) {
            Some(surface) => {
                info!("Dragging window {} to {}", drag.surface, drag.origin);
                surface.on_manual_move(drag.origin);
            }
            None => warn!("No window {} to drag", drag.surface),
        }
        coordinator.process_events();
    }
}
