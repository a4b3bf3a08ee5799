// Command line interface module
// Handles parsing of command line arguments into a session configuration

use crate::events::SurfaceId;
use crate::geometry::{Point, Size};
use crate::session::{Drag, SessionConfig};
use crate::settings::{validate_global_scale, FollowPolicy, Settings};
use crate::timer::RefreshRate;
use anyhow::{bail, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// peerview - Show one image across many windows and keep them aligned
#[derive(Parser, Debug)]
#[command(name = "peerview")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the image or GIF shared by every window
    #[arg(value_name = "IMAGE")]
    pub image_path: PathBuf,

    /// Number of windows to open (1 - 99)
    #[arg(short, long, default_value = "5", value_parser = clap::value_parser!(u8).range(1..=99))]
    pub windows: u8,

    /// Scale factor for the image (0.25 - 4.0)
    #[arg(short, long, default_value = "1.0", value_parser = parse_scale)]
    pub scale: f32,

    /// How often each window re-aligns its image
    #[arg(short, long, value_enum, default_value_t = RefreshRate::Fast)]
    pub refresh: RefreshRate,

    /// Dragging a window no longer moves the image in the other windows
    #[arg(long, default_value = "false")]
    pub no_follow_window: bool,

    /// The focused window centers its image and the others follow it
    #[arg(long, default_value = "false")]
    pub keep_centered: bool,

    /// Randomize the settings and open a few more windows
    #[arg(long, default_value = "false")]
    pub randomize: bool,

    /// Virtual screen size
    #[arg(long, default_value = "1920x1080", value_parser = parse_screen)]
    pub screen: Size,

    /// Drag a window to a new origin halfway through the run (ID:X,Y)
    #[arg(long = "drag", value_name = "ID:X,Y", value_parser = parse_drag)]
    pub drags: Vec<Drag>,

    /// Id of the focused window
    #[arg(long, value_name = "ID")]
    pub focus: Option<u64>,

    /// Simulated run time in milliseconds
    #[arg(long, default_value = "2000")]
    pub duration_ms: u64,

    /// Random seed for window placement
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Parsed arguments resolved into a session
#[derive(Debug)]
pub struct ParsedArgs {
    pub session: SessionConfig,
    pub seed: Option<u64>,
}

/// Parse scale value and ensure it's within the slider range
fn parse_scale(s: &str) -> Result<f32, String> {
    let scale: f32 = s.parse().map_err(|_| "Invalid scale value")?;
    validate_global_scale(scale).map_err(|e| e.to_string())
}

/// Parse a `WIDTHxHEIGHT` screen size
fn parse_screen(s: &str) -> Result<Size, String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or("Screen size must look like 1920x1080")?;
    let width: u32 = w.trim().parse().map_err(|_| "Invalid screen width")?;
    let height: u32 = h.trim().parse().map_err(|_| "Invalid screen height")?;
    if width < 4 || height < 2 {
        return Err("Screen is too small".to_string());
    }
    Ok(Size::new(width, height))
}

/// Parse an `ID:X,Y` drag
fn parse_drag(s: &str) -> Result<Drag, String> {
    let (id, pos) = s.split_once(':').ok_or("Drag must look like 2:100,100")?;
    let (x, y) = pos.split_once(',').ok_or("Drag position must look like X,Y")?;
    let id: u64 = id.trim().parse().map_err(|_| "Invalid window id")?;
    let x: i32 = x.trim().parse().map_err(|_| "Invalid x coordinate")?;
    let y: i32 = y.trim().parse().map_err(|_| "Invalid y coordinate")?;
    Ok(Drag {
        surface: SurfaceId(id),
        origin: Point::new(x, y),
    })
}

impl Args {
    /// Check cross-argument constraints and build the session
    pub fn resolve(self) -> Result<ParsedArgs> {
        if self.duration_ms == 0 {
            bail!("--duration-ms must be greater than zero");
        }
        if !self.image_path.is_file() {
            bail!(
                "No image at {}.\n\
                 Usage: peerview <IMAGE> [OPTIONS]",
                self.image_path.display()
            );
        }

        let settings = Settings {
            scale: self.scale,
            follow_policy: FollowPolicy::from_flag(!self.no_follow_window),
            keep_centered: self.keep_centered,
            refresh_interval: self.refresh.interval(),
        };

        Ok(ParsedArgs {
            session: SessionConfig {
                image_path: self.image_path,
                windows: usize::from(self.windows),
                settings,
                randomize: self.randomize,
                screen: self.screen,
                drags: self.drags,
                focus: self.focus.map(SurfaceId),
                duration: Duration::from_millis(self.duration_ms),
            },
            seed: self.seed,
        })
    }
}

/// Parse command line arguments
pub fn parse_args() -> Result<ParsedArgs> {
    Args::parse().resolve()
}
