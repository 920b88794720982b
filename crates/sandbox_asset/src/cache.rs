//! Sprite cache keyed by (name, scale)

use image::imageops::FilterType;
use image::{Rgba, RgbaImage};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::AssetError;

/// Side length of the placeholder sprite
pub const PLACEHOLDER_SIZE: u32 = 50;

/// An immutable decoded sprite. Cloning shares the pixels.
#[derive(Clone, Debug)]
pub struct Sprite {
    pixels: Arc<RgbaImage>,
    placeholder: bool,
}

impl Sprite {
    pub fn new(pixels: RgbaImage) -> Self {
        Self {
            pixels: Arc::new(pixels),
            placeholder: false,
        }
    }

    /// The fallback art: a light grey square with a red disc
    pub fn placeholder() -> Self {
        let size = PLACEHOLDER_SIZE;
        let center = size as f32 / 2.0;
        let radius = 20.0f32;
        let image = RgbaImage::from_fn(size, size, |x, y| {
            let dx = x as f32 + 0.5 - center;
            let dy = y as f32 + 0.5 - center;
            if dx * dx + dy * dy <= radius * radius {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([200, 200, 200, 255])
            }
        });
        Self {
            pixels: Arc::new(image),
            placeholder: true,
        }
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Whether this is the fallback art
    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }
}

/// Source of sprites for entities
pub trait AssetProvider {
    /// Load `name` scaled by `scale`. Never fails: missing art yields the placeholder.
    fn load_image(&self, name: &str, scale: f32) -> Sprite;
}

/// Owned, lazily filled cache of decoded sprites.
///
/// Each (name, scale) pair is decoded once; failures are cached as the
/// placeholder so a missing file is only reported once.
pub struct ImageCache {
    root: PathBuf,
    entries: RwLock<HashMap<(String, u32), Sprite>>,
}

impl ImageCache {
    /// Cache reading files from `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Number of cached (name, scale) entries
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Decode and scale one file without touching the cache
    pub fn decode(&self, name: &str, scale: f32) -> Result<Sprite, AssetError> {
        if !(scale.is_finite() && scale > 0.0) {
            return Err(AssetError::InvalidScale(scale));
        }
        let path = self.root.join(name);
        let bytes = std::fs::read(&path).map_err(|source| AssetError::Io {
            path: path.clone(),
            source,
        })?;
        let image = image::load_from_memory(&bytes)
            .map_err(|source| AssetError::Decode {
                path: path.clone(),
                source,
            })?
            .to_rgba8();

        if scale == 1.0 {
            return Ok(Sprite::new(image));
        }
        let (w, h) = image.dimensions();
        let new_w = ((w as f32 * scale) as u32).max(1);
        let new_h = ((h as f32 * scale) as u32).max(1);
        Ok(Sprite::new(image::imageops::resize(
            &image,
            new_w,
            new_h,
            FilterType::Triangle,
        )))
    }
}

impl AssetProvider for ImageCache {
    fn load_image(&self, name: &str, scale: f32) -> Sprite {
        let key = (name.to_string(), scale.to_bits());
        if let Some(sprite) = self.entries.read().get(&key) {
            return sprite.clone();
        }

        let sprite = match self.decode(name, scale) {
            Ok(sprite) => {
                log::debug!("Loaded {} at scale {} ({}x{})", name, scale, sprite.width(), sprite.height());
                sprite
            }
            Err(err) => {
                log::warn!("{}; using placeholder for {}", err, name);
                Sprite::placeholder()
            }
        };

        self.entries.write().entry(key).or_insert(sprite).clone()
    }
}
