// Event relay module
// Surfaces only ever talk upward through this bus; the coordinator is the sole reader

use crate::geometry::Point;
use crossbeam_channel::{Receiver, Sender};
use std::fmt;

/// Stable identity of a display surface, assigned by the coordinator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(pub u64);

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Notifications emitted by a surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceEvent {
    /// The user dragged `source`; its content now sits at this global position
    Moved { source: SurfaceId, position: Point },
    /// `source` closed and must be dropped from the surface set
    Closed { source: SurfaceId },
    /// The windowing environment asks for `source` to be closed. Posted by the
    /// environment, never by a surface.
    CloseRequested { source: SurfaceId },
}

impl SurfaceEvent {
    pub fn source(&self) -> SurfaceId {
        match *self {
            SurfaceEvent::Moved { source, .. }
            | SurfaceEvent::Closed { source }
            | SurfaceEvent::CloseRequested { source } => source,
        }
    }
}

/// Cloneable sending half handed to surfaces and to the windowing environment
#[derive(Debug, Clone)]
pub struct EventSender {
    sender: Sender<SurfaceEvent>,
}

impl EventSender {
    pub fn send(&self, event: SurfaceEvent) {
        // The receiver lives as long as the coordinator; a send after it is
        // gone has nobody left to notify.
        let _ = self.sender.send(event);
    }
}

/// Unbounded in-process queue of surface events
#[derive(Debug)]
pub struct EventBus {
    sender: Sender<SurfaceEvent>,
    receiver: Receiver<SurfaceEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, receiver) = crossbeam_channel::unbounded();
        Self { sender, receiver }
    }

    pub fn sender(&self) -> EventSender {
        EventSender {
            sender: self.sender.clone(),
        }
    }

    /// Take the next queued event without blocking
    pub fn try_recv(&self) -> Option<SurfaceEvent> {
        self.receiver.try_recv().ok()
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_arrive_in_send_order() {
        let bus = EventBus::new();
        let tx = bus.sender();
        let a = SurfaceId(1);
        let b = SurfaceId(2);

        tx.send(SurfaceEvent::Moved {
            source: a,
            position: Point::new(5, 6),
        });
        bus.sender().send(SurfaceEvent::Closed { source: b });

        assert_eq!(bus.try_recv().map(|e| e.source()), Some(a));
        assert_eq!(bus.try_recv(), Some(SurfaceEvent::Closed { source: b }));
        assert!(bus.try_recv().is_none());
        assert!(bus.is_empty());
    }

    #[test]
    fn test_surface_id_display() {
        assert_eq!(SurfaceId(7).to_string(), "#7");
    }
}
