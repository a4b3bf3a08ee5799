// Display surface module
// One window showing the shared content; reports drags and closure upward

use crate::content::{ContentDecoder, DecodedContent};
use crate::error::Result;
use crate::events::{EventSender, SurfaceEvent, SurfaceId};
use crate::geometry::{Point, Rect, Size};
use crate::settings::{validate_scale, FollowPolicy, Settings};
use crate::timer::{RefreshRate, RefreshTimer};
use log::{debug, warn};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Commands a surface sends down to its native window.
///
/// Implemented by the windowing environment. Geometry is always local to the
/// window except where noted.
pub trait SurfaceWindow {
    /// Show decoded content at `displayed` size, or clear the window on `None`
    fn show_content(&mut self, id: SurfaceId, content: Option<&DecodedContent>, displayed: Size);

    /// Move/resize the content label inside the window
    fn place_content(&mut self, id: SurfaceId, local: Rect);

    /// Start animation playback over from the first frame
    fn restart_animation(&mut self, _id: SurfaceId) {}

    /// Release native resources; called once, after `Closed` was emitted
    fn release(&mut self, _id: SurfaceId) {}
}

/// Creates native windows for new surfaces
pub trait WindowFactory {
    /// Returns the window frame in global coordinates and its command sink
    fn create_window(&mut self, id: SurfaceId) -> (Rect, Box<dyn SurfaceWindow>);
}

/// Position state of a surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceState {
    /// Content follows the reference surface on every tick
    Idle,
    /// The user dragged this surface; ticks no longer move it, peer drags still do
    ManuallyPositioned,
}

/// What a periodic tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Closed, manually positioned, or nothing to show
    Skipped,
    /// Focused with centering on: content centered in the window
    Centered,
    /// Content moved to the reference position (global)
    Synced(Point),
    /// No reference surface exists
    NoReference,
}

pub struct DisplaySurface {
    id: SurfaceId,
    /// Window frame in global coordinates
    window: Rect,
    /// Content label origin, local to `window`
    content_offset: Point,
    content_path: Option<PathBuf>,
    content: Option<DecodedContent>,
    scale: f32,
    follow_policy: FollowPolicy,
    keep_centered: bool,
    manually_moved: bool,
    closed: bool,
    timer: RefreshTimer,
    events: EventSender,
    host: Box<dyn SurfaceWindow>,
}

impl DisplaySurface {
    /// Create a surface with no content and a stopped timer.
    /// Policies stay at their defaults until the coordinator pushes settings.
    pub fn new(
        id: SurfaceId,
        window: Rect,
        host: Box<dyn SurfaceWindow>,
        events: EventSender,
    ) -> Self {
        Self {
            id,
            window,
            content_offset: Point::ORIGIN,
            content_path: None,
            content: None,
            scale: 1.0,
            follow_policy: FollowPolicy::Independent,
            keep_centered: false,
            manually_moved: false,
            closed: false,
            timer: RefreshTimer::stopped(RefreshRate::Fast),
            events,
            host,
        }
    }

    pub fn id(&self) -> SurfaceId {
        self.id
    }

    pub fn window(&self) -> Rect {
        self.window
    }

    pub fn content_offset(&self) -> Point {
        self.content_offset
    }

    /// Global position of the content label
    pub fn content_position(&self) -> Point {
        self.window.map_to_global(self.content_offset)
    }

    pub fn content_path(&self) -> Option<&Path> {
        self.content_path.as_deref()
    }

    pub fn content(&self) -> Option<&DecodedContent> {
        self.content.as_ref()
    }

    /// Content size at scale 1.0; empty when nothing is shown
    pub fn natural_size(&self) -> Size {
        self.content
            .as_ref()
            .map(|c| c.natural_size)
            .unwrap_or_default()
    }

    pub fn displayed_size(&self) -> Size {
        self.natural_size().scaled(self.scale)
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn follow_policy(&self) -> FollowPolicy {
        self.follow_policy
    }

    pub fn keep_centered(&self) -> bool {
        self.keep_centered
    }

    pub fn is_manually_moved(&self) -> bool {
        self.manually_moved
    }

    pub fn state(&self) -> SurfaceState {
        if self.manually_moved {
            SurfaceState::ManuallyPositioned
        } else {
            SurfaceState::Idle
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn timer(&self) -> &RefreshTimer {
        &self.timer
    }

    /// Replace the displayed content.
    ///
    /// On a decode failure the surface shows nothing and the error is handed
    /// back for status reporting. `manually_moved` is left alone either way.
    pub fn load_content(
        &mut self,
        path: &Path,
        scale: f32,
        decoder: &dyn ContentDecoder,
    ) -> Result<()> {
        let scale = validate_scale(scale)?;
        self.content_path = Some(path.to_path_buf());
        self.scale = scale;

        match decoder.decode(path, self.window.size) {
            Ok(content) => {
                self.content = Some(content);
                self.refresh_content();
                Ok(())
            }
            Err(e) => {
                warn!("Surface {}: {}", self.id, e);
                self.content = None;
                self.host.show_content(self.id, None, Size::default());
                Err(e)
            }
        }
    }

    /// Resize content to `natural_size × factor`. Invalid factors keep the
    /// previous scale.
    pub fn set_scale(&mut self, factor: f32) -> Result<Size> {
        self.scale = validate_scale(factor)?;
        if self.content.is_some() {
            self.refresh_content();
        }
        Ok(self.displayed_size())
    }

    /// Called by the windowing environment after the user dragged the window
    /// to `new_origin`. Returns the published global content position, if any.
    pub fn on_manual_move(&mut self, new_origin: Point) -> Option<Point> {
        self.window.origin = new_origin;

        if self.closed || !self.follow_policy.participates() || self.content_path.is_none() {
            return None;
        }

        let position = self.content_position();
        self.manually_moved = true;
        debug!("Surface {} dragged, content at {}", self.id, position);
        self.events.send(SurfaceEvent::Moved {
            source: self.id,
            position,
        });
        Some(position)
    }

    /// Periodic reposition check. `reference` is the global position the
    /// coordinator resolved for this tick.
    pub fn on_periodic_tick(&mut self, is_focused: bool, reference: Option<Point>) -> TickOutcome {
        if self.closed || self.manually_moved || self.content_path.is_none() {
            return TickOutcome::Skipped;
        }

        if is_focused && self.keep_centered {
            self.center_content();
            return TickOutcome::Centered;
        }

        match reference {
            Some(global) => {
                self.move_content_to(global);
                TickOutcome::Synced(global)
            }
            None => TickOutcome::NoReference,
        }
    }

    /// Align content with a peer's global content position. Never emits
    /// `Moved` and leaves `manually_moved` alone, so a dragged surface still
    /// follows later drags but not periodic ticks.
    pub fn receive_sync_position(&mut self, global: Point) -> bool {
        if self.closed {
            return false;
        }
        self.move_content_to(global);
        true
    }

    /// Center the content label inside the window
    pub fn center_content(&mut self) {
        if self.content.is_none() {
            return;
        }
        self.content_offset = self.window.centered_offset(self.displayed_size());
        self.place();
    }

    pub fn restart_animation(&mut self) {
        if self.content.as_ref().is_some_and(|c| c.is_animated()) {
            self.host.restart_animation(self.id);
        }
    }

    /// Take over scale, policies and refresh cadence from the manager
    pub fn apply(&mut self, settings: &Settings, now: Instant) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.set_scale(settings.scale)?;
        self.follow_policy = settings.follow_policy;
        self.keep_centered = settings.keep_centered;

        if !self.timer.is_running() || self.timer.interval() != settings.refresh_interval {
            self.timer.restart(settings.refresh_interval, now)?;
            debug!(
                "Surface {} refresh every {:?}",
                self.id, settings.refresh_interval
            );
        }
        Ok(())
    }

    /// True when the refresh timer is due at `now`
    pub fn poll_timer(&mut self, now: Instant) -> bool {
        !self.closed && self.timer.poll(now)
    }

    /// Emit `Closed` and release the window. Only the first call has any effect.
    pub fn close(&mut self) -> bool {
        if self.closed {
            return false;
        }
        self.closed = true;
        self.timer.stop();
        self.events.send(SurfaceEvent::Closed { source: self.id });
        self.content = None;
        self.host.release(self.id);
        true
    }

    fn move_content_to(&mut self, global: Point) {
        self.content_offset = self.window.map_from_global(global);
        self.place();
    }

    fn refresh_content(&mut self) {
        let displayed = self.displayed_size();
        self.host
            .show_content(self.id, self.content.as_ref(), displayed);
        self.place();
    }

    fn place(&mut self) {
        let local = Rect::new(self.content_offset, self.displayed_size());
        self.host.place_content(self.id, local);
    }
}

impl std::fmt::Debug for DisplaySurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DisplaySurface")
            .field("id", &self.id)
            .field("window", &self.window)
            .field("content_offset", &self.content_offset)
            .field("scale", &self.scale)
            .field("state", &self.state())
            .field("closed", &self.closed)
            .finish()
    }
}
