// peerview - Show one image across many windows and keep them aligned
// Library crate: the synchronization core plus a headless windowing session

pub mod cli;
pub mod content;
pub mod coordinator;
pub mod error;
pub mod events;
pub mod geometry;
pub mod session;
pub mod settings;
pub mod surface;
pub mod timer;

pub use content::{ContentDecoder, ContentKind, DecodedContent, ImageFileDecoder};
pub use coordinator::{Coordinator, LoadReport};
pub use error::SyncError;
pub use events::{EventSender, SurfaceEvent, SurfaceId};
pub use geometry::{Point, Rect, Size};
pub use settings::{FollowPolicy, Settings};
pub use surface::{DisplaySurface, SurfaceState, SurfaceWindow, TickOutcome, WindowFactory};
pub use timer::{RefreshRate, RefreshTimer};
