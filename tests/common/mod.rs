//! Test doubles for the windowing environment and the content decoder

#![allow(dead_code)]

use peerview::{
    ContentDecoder, ContentKind, DecodedContent, EventSender, Rect, Size, SurfaceEvent,
    SurfaceId, SurfaceWindow, SyncError, WindowFactory,
};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;

/// Everything a mock window was told to do
#[derive(Default)]
pub struct WindowLog {
    pub placements: Vec<Rect>,
    pub shown: Vec<Option<Size>>,
    pub restarts: usize,
    pub releases: usize,
    /// When set, the next placement asks the coordinator to close this surface
    pub close_on_place: Option<(EventSender, SurfaceId)>,
}

pub type SharedLog = Rc<RefCell<WindowLog>>;

pub struct MockWindow(pub SharedLog);

impl SurfaceWindow for MockWindow {
    fn show_content(&mut self, _id: SurfaceId, content: Option<&DecodedContent>, displayed: Size) {
        self.0.borrow_mut().shown.push(content.map(|_| displayed));
    }

    fn place_content(&mut self, _id: SurfaceId, local: Rect) {
        let mut log = self.0.borrow_mut();
        log.placements.push(local);
        if let Some((sender, victim)) = log.close_on_place.take() {
            sender.send(SurfaceEvent::CloseRequested { source: victim });
        }
    }

    fn restart_animation(&mut self, _id: SurfaceId) {
        self.0.borrow_mut().restarts += 1;
    }

    fn release(&mut self, _id: SurfaceId) {
        self.0.borrow_mut().releases += 1;
    }
}

/// Hands out windows from a fixed list of frames, cycling when exhausted
pub struct GridFactory {
    frames: Vec<Rect>,
    next: usize,
    pub logs: HashMap<SurfaceId, SharedLog>,
}

impl GridFactory {
    pub fn new(frames: Vec<Rect>) -> Self {
        Self {
            frames,
            next: 0,
            logs: HashMap::new(),
        }
    }

    /// Three 400x400 windows at (0,0), (500,0) and (0,500)
    pub fn three() -> Self {
        Self::new(vec![
            Rect::from_xywh(0, 0, 400, 400),
            Rect::from_xywh(500, 0, 400, 400),
            Rect::from_xywh(0, 500, 400, 400),
        ])
    }

    pub fn log(&self, id: SurfaceId) -> SharedLog {
        self.logs[&id].clone()
    }
}

impl WindowFactory for GridFactory {
    fn create_window(&mut self, id: SurfaceId) -> (Rect, Box<dyn SurfaceWindow>) {
        let frame = self.frames[self.next % self.frames.len()];
        self.next += 1;
        let log = SharedLog::default();
        self.logs.insert(id, log.clone());
        (frame, Box::new(MockWindow(log)))
    }
}

/// Decodes every path to a 200x100 source fitted into the window.
///
/// Paths containing "broken" fail, as do windows with an odd width.
/// `.gif` paths are animated.
#[derive(Default)]
pub struct FakeDecoder;

impl ContentDecoder for FakeDecoder {
    fn decode(&self, path: &Path, bounds: Size) -> peerview::error::Result<DecodedContent> {
        if path.to_string_lossy().contains("broken") || bounds.width % 2 == 1 {
            return Err(SyncError::ContentDecodeFailure {
                path: path.to_path_buf(),
                reason: "unsupported".to_string(),
            });
        }
        let source_size = Size::new(200, 100);
        let kind = if path.extension().is_some_and(|e| e == "gif") {
            ContentKind::Animated { frame_count: 3 }
        } else {
            ContentKind::Static
        };
        Ok(DecodedContent {
            path: path.to_path_buf(),
            source_size,
            natural_size: source_size.fit_within(bounds),
            kind,
        })
    }
}
