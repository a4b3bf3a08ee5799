// Content loading module
// Decodes the shared image or animation and sizes it for a surface

use crate::error::{Result, SyncError};
use crate::geometry::Size;
use image::codecs::gif::GifDecoder;
use image::{AnimationDecoder, ImageDecoder, ImageFormat};
use log::debug;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// Static raster or looping animation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Static,
    Animated { frame_count: usize },
}

/// Decoded content ready to be placed in a surface
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedContent {
    /// Where the content came from
    pub path: PathBuf,
    /// Pixel size of the source file
    pub source_size: Size,
    /// Source size fitted into the requested bounds, aspect ratio preserved
    pub natural_size: Size,
    pub kind: ContentKind,
}

impl DecodedContent {
    pub fn is_animated(&self) -> bool {
        matches!(self.kind, ContentKind::Animated { .. })
    }
}

/// Decoding and sizing collaborator used by every surface
pub trait ContentDecoder {
    /// Decode `path` and size it to fit `bounds`.
    /// Empty bounds keep the source size.
    fn decode(&self, path: &Path, bounds: Size) -> Result<DecodedContent>;
}

/// Decoder backed by the `image` crate. GIF files are treated as animations.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageFileDecoder;

impl ContentDecoder for ImageFileDecoder {
    fn decode(&self, path: &Path, bounds: Size) -> Result<DecodedContent> {
        let failure = |reason: String| SyncError::ContentDecodeFailure {
            path: path.to_path_buf(),
            reason,
        };

        let data = fs::read(path).map_err(|e| failure(e.to_string()))?;
        let (source_size, kind) = probe_bytes(&data).map_err(failure)?;

        let natural_size = if bounds.is_empty() {
            source_size
        } else {
            source_size.fit_within(bounds)
        };

        debug!(
            "Decoded {}: {} -> {} ({:?})",
            path.display(),
            source_size,
            natural_size,
            kind
        );

        Ok(DecodedContent {
            path: path.to_path_buf(),
            source_size,
            natural_size,
            kind,
        })
    }
}

/// Fully decode raw bytes, auto-detecting the format
fn probe_bytes(data: &[u8]) -> std::result::Result<(Size, ContentKind), String> {
    let format =
        image::guess_format(data).map_err(|e| format!("failed to detect image format: {e}"))?;

    if format == ImageFormat::Gif {
        let decoder = GifDecoder::new(Cursor::new(data))
            .map_err(|e| format!("failed to decode animation: {e}"))?;
        let (width, height) = decoder.dimensions();
        let frames = decoder
            .into_frames()
            .collect_frames()
            .map_err(|e| format!("failed to decode animation frames: {e}"))?;
        if frames.is_empty() {
            return Err("animation has no frames".to_string());
        }
        return Ok((
            Size::new(width, height),
            ContentKind::Animated {
                frame_count: frames.len(),
            },
        ));
    }

    let img = image::load_from_memory_with_format(data, format)
        .map_err(|e| format!("failed to decode image: {e}"))?;
    Ok((Size::new(img.width(), img.height()), ContentKind::Static))
}
