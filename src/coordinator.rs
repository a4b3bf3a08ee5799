// Coordinator module
// Owns the surface set and the manager settings, and relays drags between surfaces

use crate::content::ContentDecoder;
use crate::error::{Result, SyncError};
use crate::events::{EventBus, EventSender, SurfaceEvent, SurfaceId};
use crate::geometry::{Point, Rect};
use crate::settings::{validate_global_scale, FollowPolicy, Settings, MAX_SCALE, MIN_SCALE};
use crate::surface::{DisplaySurface, SurfaceWindow, TickOutcome, WindowFactory};
use crate::timer::RefreshRate;
use log::{debug, info, warn};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::VecDeque;
use std::fmt;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Window counts accepted by a batch open
pub const BATCH_WINDOW_RANGE: RangeInclusive<usize> = 1..=99;

/// Window counts opened by a randomized setup
const RANDOMIZE_WINDOW_RANGE: RangeInclusive<usize> = 2..=10;

/// Outcome of pushing content to every surface
#[derive(Debug, Default)]
pub struct LoadReport {
    pub attempted: usize,
    pub failures: Vec<(SurfaceId, SyncError)>,
}

impl LoadReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

impl fmt::Display for LoadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_success() {
            write!(f, "Loaded content in {} surfaces", self.attempted)
        } else {
            write!(
                f,
                "{} of {} surfaces failed to load content",
                self.failed(),
                self.attempted
            )
        }
    }
}

/// Mediator between display surfaces.
///
/// Surfaces never see each other or the global settings: they emit events on
/// the bus and receive explicit pushes from here.
pub struct Coordinator {
    /// Registration order matters: the first surface is the fallback reference
    surfaces: Vec<DisplaySurface>,
    shared_content: Option<PathBuf>,
    settings: Settings,
    focused: Option<SurfaceId>,
    decoder: Box<dyn ContentDecoder>,
    bus: EventBus,
    /// Moves posted while a relay was in flight
    deferred: VecDeque<SurfaceEvent>,
    next_id: u64,
    status: Option<String>,
}

impl Coordinator {
    pub fn new(decoder: Box<dyn ContentDecoder>) -> Self {
        Self {
            surfaces: Vec::new(),
            shared_content: None,
            settings: Settings::default(),
            focused: None,
            decoder,
            bus: EventBus::new(),
            deferred: VecDeque::new(),
            next_id: 1,
            status: None,
        }
    }

    pub fn with_settings(decoder: Box<dyn ContentDecoder>, settings: Settings) -> Result<Self> {
        settings.validate()?;
        let mut coordinator = Self::new(decoder);
        coordinator.settings = settings;
        Ok(coordinator)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn shared_content(&self) -> Option<&Path> {
        self.shared_content.as_deref()
    }

    /// Last status line message
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Sending half for the windowing environment (close requests)
    pub fn event_sender(&self) -> EventSender {
        self.bus.sender()
    }

    pub fn surfaces(&self) -> &[DisplaySurface] {
        &self.surfaces
    }

    pub fn surface(&self, id: SurfaceId) -> Option<&DisplaySurface> {
        self.surfaces.iter().find(|s| s.id() == id)
    }

    pub fn surface_mut(&mut self, id: SurfaceId) -> Option<&mut DisplaySurface> {
        self.surfaces.iter_mut().find(|s| s.id() == id)
    }

    pub fn surface_ids(&self) -> Vec<SurfaceId> {
        self.surfaces.iter().map(|s| s.id()).collect()
    }

    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    /// Record which window the environment reports as active
    pub fn set_focus(&mut self, focused: Option<SurfaceId>) {
        self.focused = focused;
    }

    pub fn focused(&self) -> Option<SurfaceId> {
        self.focused
    }

    /// Build an unregistered surface wired to this coordinator's bus
    pub fn create_surface(&mut self, window: Rect, host: Box<dyn SurfaceWindow>) -> DisplaySurface {
        let id = self.allocate_id();
        DisplaySurface::new(id, window, host, self.bus.sender())
    }

    /// Append a surface and push the current settings to it.
    /// Existing surfaces are not moved.
    pub fn register_surface(&mut self, mut surface: DisplaySurface, now: Instant) -> SurfaceId {
        let id = surface.id();
        if let Err(e) = surface.apply(&self.settings, now) {
            warn!("Surface {} rejected settings: {}", id, e);
        }
        self.surfaces.push(surface);
        info!("Registered surface {} ({} open)", id, self.surfaces.len());
        id
    }

    /// Remove a surface from the set. Removing an absent surface is a no-op.
    pub fn unregister_surface(&mut self, id: SurfaceId) -> Option<DisplaySurface> {
        let index = self.surfaces.iter().position(|s| s.id() == id)?;
        let surface = self.surfaces.remove(index);
        if self.focused == Some(id) {
            self.focused = None;
        }
        info!("Unregistered surface {} ({} open)", id, self.surfaces.len());
        Some(surface)
    }

    /// Open one window showing the shared content, then restart every
    /// animation so all surfaces play in phase
    pub fn open_surface(&mut self, factory: &mut dyn WindowFactory, now: Instant) -> SurfaceId {
        let id = self.allocate_id();
        let (window, host) = factory.create_window(id);
        let surface = DisplaySurface::new(id, window, host, self.bus.sender());
        self.register_surface(surface, now);

        let mut load_failed = false;
        if let Some(path) = self.shared_content.clone() {
            let scale = self.settings.scale;
            let decoder = self.decoder.as_ref();
            if let Some(surface) = self.surfaces.iter_mut().find(|s| s.id() == id) {
                load_failed = surface.load_content(&path, scale, decoder).is_err();
            }
        }

        self.restart_animations();
        if load_failed {
            self.set_status("Failed to load image.".to_string());
        } else {
            self.set_status("Opened new window".to_string());
        }
        id
    }

    /// Open `count` windows (1-99)
    pub fn open_surfaces(
        &mut self,
        count: usize,
        factory: &mut dyn WindowFactory,
        now: Instant,
    ) -> Result<Vec<SurfaceId>> {
        if !BATCH_WINDOW_RANGE.contains(&count) {
            return Err(SyncError::InvalidWindowCount(count));
        }
        let ids = (0..count).map(|_| self.open_surface(factory, now)).collect();
        self.set_status(format!("Opened {} windows!", count));
        Ok(ids)
    }

    /// Pick random settings, open a handful of windows and push everything
    pub fn randomize<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        factory: &mut dyn WindowFactory,
        now: Instant,
    ) -> Result<Vec<SurfaceId>> {
        let steps = rng.gen_range((MIN_SCALE * 100.0) as u32..=(MAX_SCALE * 100.0) as u32);
        let rate = RefreshRate::ALL
            .choose(rng)
            .copied()
            .unwrap_or_default();
        let settings = Settings {
            scale: steps as f32 / 100.0,
            follow_policy: FollowPolicy::from_flag(rng.gen_bool(0.5)),
            keep_centered: rng.gen_bool(0.5),
            refresh_interval: rate.interval(),
        };
        info!("Randomized settings: {:?} ({})", settings, rate);
        let previous = std::mem::replace(&mut self.settings, settings);

        let count = rng.gen_range(RANDOMIZE_WINDOW_RANGE);
        let ids = (0..count).map(|_| self.open_surface(factory, now)).collect();
        self.push_global_settings(settings, now)?;
        match settings_status(&previous, &settings) {
            Some(message) => self.set_status(message.to_string()),
            None => self.set_status(format!("Opened {} windows!", count)),
        }
        Ok(ids)
    }

    /// Close one surface. It emits `Closed` and is dropped from the set.
    pub fn close_surface(&mut self, id: SurfaceId) -> Result<()> {
        let surface = self.surface_mut(id).ok_or(SyncError::UnknownSurface(id))?;
        surface.close();
        self.process_events();
        Ok(())
    }

    pub fn close_all(&mut self) {
        for id in self.surface_ids() {
            if let Some(surface) = self.surface_mut(id) {
                surface.close();
            }
        }
        self.process_events();
        self.set_status("Closed all windows".to_string());
    }

    /// Deliver a peer's content position to every other registered surface.
    ///
    /// Delivery follows registration order. Surfaces closed during the fan-out
    /// are removed before the next delivery and never receive the position.
    /// Returns how many surfaces repositioned.
    pub fn relay_move(&mut self, source: SurfaceId, position: Point) -> usize {
        let targets: Vec<SurfaceId> = self
            .surface_ids()
            .into_iter()
            .filter(|id| *id != source)
            .collect();

        let mut delivered = 0;
        for id in targets {
            self.apply_pending_closures();
            if let Some(surface) = self.surface_mut(id) {
                if surface.receive_sync_position(position) {
                    delivered += 1;
                }
            }
        }
        self.apply_pending_closures();

        debug!(
            "Relayed {} from {} to {} surfaces",
            position, source, delivered
        );
        delivered
    }

    /// Position a surface should align to on its periodic tick.
    ///
    /// With centering on and a registered surface focused, that surface leads.
    /// Otherwise the first registered surface does.
    pub fn resolve_reference_position(&self) -> Option<Point> {
        if self.settings.keep_centered {
            if let Some(focused) = self.focused.and_then(|id| self.surface(id)) {
                return Some(focused.content_position());
            }
        }
        self.surfaces.first().map(|s| s.content_position())
    }

    /// Run one periodic tick on a surface
    pub fn tick_surface(&mut self, id: SurfaceId) -> Result<TickOutcome> {
        let reference = self.resolve_reference_position();
        let is_focused = self.focused == Some(id);
        let surface = self.surface_mut(id).ok_or(SyncError::UnknownSurface(id))?;
        Ok(surface.on_periodic_tick(is_focused, reference))
    }

    /// Drain pending events, then fire every surface timer that is due.
    /// Returns the number of ticks run.
    pub fn advance(&mut self, now: Instant) -> usize {
        self.process_events();

        let mut ticks = 0;
        for id in self.surface_ids() {
            let due = self.surface_mut(id).is_some_and(|s| s.poll_timer(now));
            if due && self.tick_surface(id).is_ok() {
                ticks += 1;
            }
            self.process_events();
        }
        ticks
    }

    /// Push settings to every registered surface. This is the only way
    /// surface policies change.
    pub fn push_global_settings(&mut self, settings: Settings, now: Instant) -> Result<()> {
        settings.validate()?;
        let previous = std::mem::replace(&mut self.settings, settings);

        for surface in self.surfaces.iter_mut() {
            if let Err(e) = surface.apply(&settings, now) {
                warn!("Surface {} rejected settings: {}", surface.id(), e);
            }
        }
        self.process_events();

        info!(
            "Pushed settings to {} surfaces: scale {}, {:?}, keep centered {}, refresh {:?}",
            self.surfaces.len(),
            settings.scale,
            settings.follow_policy,
            settings.keep_centered,
            settings.refresh_interval
        );
        if let Some(message) = settings_status(&previous, &settings) {
            self.set_status(message.to_string());
        }
        Ok(())
    }

    pub fn set_scale(&mut self, scale: f32, now: Instant) -> Result<()> {
        let scale = validate_global_scale(scale)?;
        self.push_global_settings(Settings { scale, ..self.settings }, now)
    }

    pub fn set_follow_window(&mut self, follow_window: bool, now: Instant) -> Result<()> {
        let follow_policy = FollowPolicy::from_flag(follow_window);
        self.push_global_settings(
            Settings {
                follow_policy,
                ..self.settings
            },
            now,
        )
    }

    pub fn set_keep_centered(&mut self, keep_centered: bool, now: Instant) -> Result<()> {
        self.push_global_settings(
            Settings {
                keep_centered,
                ..self.settings
            },
            now,
        )
    }

    pub fn set_refresh_interval(&mut self, refresh_interval: Duration, now: Instant) -> Result<()> {
        self.push_global_settings(
            Settings {
                refresh_interval,
                ..self.settings
            },
            now,
        )
    }

    /// Select new shared content and load it in every surface.
    /// Surfaces that loaded successfully keep the new content even if others fail.
    pub fn set_shared_content(&mut self, path: &Path) -> LoadReport {
        self.shared_content = Some(path.to_path_buf());
        let scale = self.settings.scale;
        let decoder = self.decoder.as_ref();

        let mut report = LoadReport::default();
        for surface in self.surfaces.iter_mut() {
            report.attempted += 1;
            if let Err(e) = surface.load_content(path, scale, decoder) {
                report.failures.push((surface.id(), e));
            }
        }
        self.process_events();

        if report.is_success() {
            info!("Shared content is now {}", path.display());
        } else {
            warn!("{} ({})", report, path.display());
        }
        self.set_status(report.to_string());
        report
    }

    pub fn restart_animations(&mut self) {
        for surface in self.surfaces.iter_mut() {
            surface.restart_animation();
        }
    }

    /// Handle everything queued on the bus: moves are relayed, closures
    /// unregister. Returns the number of events handled.
    pub fn process_events(&mut self) -> usize {
        let mut handled = 0;
        while let Some(event) = self.deferred.pop_front().or_else(|| self.bus.try_recv()) {
            handled += 1;
            match event {
                SurfaceEvent::Moved { source, position } => {
                    if self.surface(source).is_some() {
                        self.relay_move(source, position);
                    }
                }
                SurfaceEvent::Closed { source } => {
                    self.unregister_surface(source);
                }
                SurfaceEvent::CloseRequested { source } => {
                    if let Some(surface) = self.surface_mut(source) {
                        surface.close();
                    }
                }
            }
        }
        handled
    }

    /// Apply closures queued on the bus; moves wait for `process_events`
    fn apply_pending_closures(&mut self) {
        while let Some(event) = self.bus.try_recv() {
            match event {
                SurfaceEvent::Moved { .. } => self.deferred.push_back(event),
                SurfaceEvent::Closed { source } => {
                    self.unregister_surface(source);
                }
                SurfaceEvent::CloseRequested { source } => {
                    if let Some(surface) = self.surface_mut(source) {
                        surface.close();
                    }
                }
            }
        }
    }

    fn allocate_id(&mut self) -> SurfaceId {
        let id = SurfaceId(self.next_id);
        self.next_id += 1;
        id
    }

    fn set_status(&mut self, message: String) {
        info!("{}", message);
        self.status = Some(message);
    }
}

/// Status line for a settings push. The follow warning wins over the scale
/// message when both changed; cadence changes alone say nothing.
fn settings_status(previous: &Settings, current: &Settings) -> Option<&'static str> {
    let toggles_changed = previous.follow_policy != current.follow_policy
        || previous.keep_centered != current.keep_centered;
    if toggles_changed && !current.follow_policy.participates() {
        Some("Parent window still moves the image for ref to other windows")
    } else if previous.scale != current.scale {
        Some("Scale value assigned")
    } else {
        None
    }
}
