//! Finished frames and the sinks that consume them

use glam::Vec2;
use image::RgbaImage;
use std::path::{Path, PathBuf};

use crate::error::ViewError;

/// Corner a text overlay is positioned from
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Anchor {
    #[default]
    TopLeft,
    TopRight,
}

/// A line of HUD text drawn over the frame by the sink
#[derive(Clone, Debug, PartialEq)]
pub struct TextOverlay {
    pub text: String,
    /// Offset from the anchor corner, in pixels
    pub offset: Vec2,
    pub anchor: Anchor,
    pub color: [u8; 3],
}

impl TextOverlay {
    /// White text offset from the top-left corner
    pub fn new(text: impl Into<String>, offset: Vec2) -> Self {
        Self {
            text: text.into(),
            offset,
            anchor: Anchor::TopLeft,
            color: [255, 255, 255],
        }
    }

    /// Position from the top-right corner instead
    pub fn top_right(mut self) -> Self {
        self.anchor = Anchor::TopRight;
        self
    }

    /// Set text color
    pub fn with_color(mut self, color: [u8; 3]) -> Self {
        self.color = color;
        self
    }
}

/// A rendered frame plus the text to draw over it
#[derive(Clone, Debug)]
pub struct Frame {
    /// Tick the frame was rendered on
    pub tick: u64,
    pub image: RgbaImage,
    pub overlays: Vec<TextOverlay>,
}

/// Consumer of finished frames (window blit, file dump, test capture)
pub trait FrameSink {
    fn present(&mut self, frame: &Frame) -> Result<(), ViewError>;
}

/// Keeps the most recent frame in memory
#[derive(Default)]
pub struct MemorySink {
    last: Option<Frame>,
    presented: u64,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_frame(&self) -> Option<&Frame> {
        self.last.as_ref()
    }

    pub fn presented(&self) -> u64 {
        self.presented
    }
}

impl FrameSink for MemorySink {
    fn present(&mut self, frame: &Frame) -> Result<(), ViewError> {
        self.last = Some(frame.clone());
        self.presented += 1;
        Ok(())
    }
}

/// Writes every `every`-th frame as `frame_<tick>.png` into a directory.
///
/// Overlays are logged, not rasterized.
pub struct PngSequenceSink {
    dir: PathBuf,
    every: u64,
    written: usize,
}

impl PngSequenceSink {
    /// Create the sink, making the directory if needed
    pub fn new(dir: impl AsRef<Path>, every: u64) -> Result<Self, ViewError> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir).map_err(|source| ViewError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(Self {
            dir,
            every: every.max(1),
            written: 0,
        })
    }

    /// Number of frames written so far
    pub fn written(&self) -> usize {
        self.written
    }
}

impl FrameSink for PngSequenceSink {
    fn present(&mut self, frame: &Frame) -> Result<(), ViewError> {
        if frame.tick % self.every != 0 {
            return Ok(());
        }
        let path = self.dir.join(format!("frame_{:06}.png", frame.tick));
        frame
            .image
            .save_with_format(&path, image::ImageFormat::Png)
            .map_err(|source| ViewError::Encode {
                path: path.clone(),
                source,
            })?;
        self.written += 1;

        let hud: Vec<&str> = frame.overlays.iter().map(|o| o.text.as_str()).collect();
        log::debug!("Wrote {:?} [{}]", path, hud.join(" | "));
        Ok(())
    }
}
