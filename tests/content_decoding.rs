use anyhow::Result;
use image::codecs::gif::GifEncoder;
use image::{Delay, Frame, ImageFormat, Rgba, RgbaImage};
use peerview::{ContentDecoder, ContentKind, Coordinator, ImageFileDecoder, Size, SyncError};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tempfile::TempDir;

mod common;
use common::GridFactory;

fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> Result<PathBuf> {
    let path = dir.join(name);
    RgbaImage::from_pixel(width, height, Rgba([0, 128, 255, 255]))
        .save_with_format(&path, ImageFormat::Png)?;
    Ok(path)
}

fn write_gif(dir: &Path, name: &str, frames: usize) -> Result<PathBuf> {
    let path = dir.join(name);
    {
        let mut encoder = GifEncoder::new(File::create(&path)?);
        let frames = (0..frames).map(|i| {
            let shade = (i * 60) as u8;
            Frame::from_parts(
                RgbaImage::from_pixel(30, 60, Rgba([shade, 0, 0, 255])),
                0,
                0,
                Delay::from_numer_denom_ms(100, 1),
            )
        });
        encoder.encode_frames(frames)?;
    }
    Ok(path)
}

#[test]
fn test_png_is_static_and_fitted() -> Result<()> {
    let dir = TempDir::new()?;
    let path = write_png(dir.path(), "wide.png", 64, 32)?;

    let content = ImageFileDecoder.decode(&path, Size::new(256, 256))?;
    assert_eq!(content.kind, ContentKind::Static);
    assert_eq!(content.source_size, Size::new(64, 32));
    assert_eq!(content.natural_size, Size::new(256, 128));

    let unbounded = ImageFileDecoder.decode(&path, Size::default())?;
    assert_eq!(unbounded.natural_size, Size::new(64, 32));
    Ok(())
}

#[test]
fn test_gif_is_animated() -> Result<()> {
    let dir = TempDir::new()?;
    let path = write_gif(dir.path(), "loop.gif", 3)?;

    let content = ImageFileDecoder.decode(&path, Size::new(100, 100))?;
    assert_eq!(content.kind, ContentKind::Animated { frame_count: 3 });
    assert!(content.is_animated());
    assert_eq!(content.source_size, Size::new(30, 60));
    assert_eq!(content.natural_size, Size::new(50, 100));
    Ok(())
}

#[test]
fn test_unreadable_content() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("notes.png");
    std::fs::write(&path, "plain text, not pixels")?;

    let err = ImageFileDecoder
        .decode(&path, Size::new(10, 10))
        .unwrap_err();
    match err {
        SyncError::ContentDecodeFailure { path: failed, .. } => assert_eq!(failed, path),
        other => panic!("unexpected error: {other}"),
    }
    Ok(())
}

#[test]
fn test_coordinator_with_real_files() -> Result<()> {
    let dir = TempDir::new()?;
    let good = write_png(dir.path(), "good.png", 40, 40)?;
    let bad = dir.path().join("missing.png");

    let mut c = Coordinator::new(Box::new(ImageFileDecoder));
    let mut factory = GridFactory::three();
    let ids = c.open_surfaces(2, &mut factory, Instant::now())?;

    let report = c.set_shared_content(&good);
    assert!(report.is_success());
    for id in &ids {
        assert_eq!(c.surface(*id).unwrap().displayed_size(), Size::new(400, 400));
    }

    let report = c.set_shared_content(&bad);
    assert_eq!(report.failed(), 2);
    assert_eq!(c.shared_content(), Some(bad.as_path()));
    for id in &ids {
        assert_eq!(c.surface(*id).unwrap().displayed_size(), Size::default());
    }
    Ok(())
}
