use anyhow::Result;
use image::{ImageFormat, Rgba, RgbaImage};
use peerview::session::{self, Drag, SessionConfig};
use peerview::{Point, RefreshRate, Settings, Size, SurfaceId, SurfaceState};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

fn image_fixture(dir: &TempDir) -> Result<PathBuf> {
    let path = dir.path().join("tess.png");
    RgbaImage::from_pixel(120, 80, Rgba([10, 200, 10, 255]))
        .save_with_format(&path, ImageFormat::Png)?;
    Ok(path)
}

fn config(image_path: PathBuf) -> SessionConfig {
    SessionConfig {
        image_path,
        windows: 3,
        settings: Settings::default(),
        randomize: false,
        screen: Size::new(1920, 1080),
        drags: Vec::new(),
        focus: None,
        duration: Duration::from_millis(40),
    }
}

#[test]
fn test_session_aligns_windows_to_first() -> Result<()> {
    let dir = TempDir::new()?;
    let summary = session::run(&config(image_fixture(&dir)?), StdRng::seed_from_u64(3))?;

    assert_eq!(summary.surfaces.len(), 3);
    assert!(summary.ticks > 0);
    let first = summary.surfaces[0].content_position;
    for s in &summary.surfaces {
        assert_eq!(s.content_position, first);
        assert_eq!(s.state, SurfaceState::Idle);
        assert_eq!(s.displayed, Size::new(768, 512));
    }
    Ok(())
}

#[test]
fn test_session_drag_moves_peers() -> Result<()> {
    let dir = TempDir::new()?;
    let mut config = config(image_fixture(&dir)?);
    config.drags = vec![Drag {
        surface: SurfaceId(2),
        origin: Point::new(10, 10),
    }];

    let summary = session::run(&config, StdRng::seed_from_u64(9))?;
    let dragged = summary
        .surfaces
        .iter()
        .find(|s| s.id == SurfaceId(2))
        .expect("dragged window is still open");
    assert_eq!(dragged.state, SurfaceState::ManuallyPositioned);
    assert_eq!(dragged.window.origin, Point::new(10, 10));

    for s in &summary.surfaces {
        assert_eq!(s.content_position, dragged.content_position);
    }
    Ok(())
}

#[test]
fn test_session_without_follow_keeps_peers_in_place() -> Result<()> {
    let dir = TempDir::new()?;
    let mut config = config(image_fixture(&dir)?);
    config.settings.follow_policy = peerview::FollowPolicy::Independent;
    config.settings.refresh_interval = RefreshRate::Medium.interval();
    config.duration = Duration::from_millis(300);
    config.drags = vec![Drag {
        surface: SurfaceId(1),
        origin: Point::new(0, 0),
    }];

    let summary = session::run(&config, StdRng::seed_from_u64(5))?;
    // Nobody was marked as dragged, so every window still follows the first
    let reference = summary.surfaces[0].content_position;
    for s in &summary.surfaces {
        assert_eq!(s.state, SurfaceState::Idle);
        assert_eq!(s.content_position, reference);
    }
    assert!(summary.to_string().contains("3 surfaces"));
    Ok(())
}

#[test]
fn test_session_randomize_opens_more_windows() -> Result<()> {
    let dir = TempDir::new()?;
    let mut config = config(image_fixture(&dir)?);
    config.windows = 1;
    config.randomize = true;

    let summary = session::run(&config, StdRng::seed_from_u64(11))?;
    assert!((3..=11).contains(&summary.surfaces.len()));
    assert!((0.25..=4.0).contains(&summary.settings.scale));
    Ok(())
}
