//! Decoded skin bitmaps and the cache that shares them.
//!
//! Every image is identified by an [`ImageDesc`]: the source path plus the
//! rotation and blend level applied to the decoded pixels. The [`ImageStore`]
//! keeps the images it produced in an LRU list and hands out [`SkinImage`]
//! handles. A handle is reference counted: cloning it takes a reference and
//! dropping it releases one. Cached images whose last outside handle is gone
//! stay in the store until the pixel budget forces them out.
//!
//! Clones made with [`SkinImage::clone_rotated`], [`SkinImage::duplicate`] and
//! [`SkinImage::clone_full`] are never entered into the store; they are freed
//! as soon as their last handle drops.

use crate::geometry::{Rotation, Size};
use log::{debug, warn};
use lru::LruCache;
use serde::Serialize;
use std::cell::Cell;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Default pixel budget of the store (4 Mi pixels).
pub const DEFAULT_PIXEL_BUDGET: usize = 4 * 1024 * 1024;

/// Attenuation applied to every channel of an image, in `0..=256`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Blend(u16);

impl Blend {
    pub const NONE: Blend = Blend(0);
    pub const HALF: Blend = Blend(128);
    pub const FULL: Blend = Blend(256);

    /// Clamp `level` into the valid range.
    pub fn new(level: i32) -> Self {
        Blend(level.clamp(0, 256) as u16)
    }

    /// Convert a percentage into a blend level, clamping it to `0..=100`.
    pub fn from_percent(percent: i32) -> Self {
        Self::new(256 * percent.clamp(0, 100) / 100)
    }

    pub fn level(self) -> u16 {
        self.0
    }

    pub fn is_full(self) -> bool {
        self == Self::FULL
    }

    /// Apply `other` on top of `self`.
    pub fn compose(self, other: Blend) -> Self {
        Blend(((self.0 as u32 * other.0 as u32) >> 8) as u16)
    }
}

impl Default for Blend {
    fn default() -> Self {
        Self::FULL
    }
}

/// Identity of an image: where its pixels come from and how they were transformed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ImageDesc {
    pub path: String,
    pub rotation: Rotation,
    pub blend: Blend,
}

impl ImageDesc {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            rotation: Rotation::Deg0,
            blend: Blend::FULL,
        }
    }

    pub fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_blend(mut self, blend: Blend) -> Self {
        self.blend = blend;
        self
    }

    /// Descriptor of the untransformed bitmap this one is derived from.
    pub fn base(&self) -> Self {
        Self::new(self.path.clone())
    }

    pub fn is_base(&self) -> bool {
        self.rotation == Rotation::Deg0 && self.blend.is_full()
    }
}

impl fmt::Display for ImageDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path)?;
        if self.rotation != Rotation::Deg0 {
            write!(f, " @{}", self.rotation)?;
        }
        if !self.blend.is_full() {
            write!(f, " blend={}", self.blend.0)?;
        }
        Ok(())
    }
}

struct ImageData {
    desc: ImageDesc,
    width: u32,
    height: u32,
    /// ARGB8888, row major.
    pixels: Vec<u32>,
    cached: Cell<bool>,
}

/// Handle to a decoded image, or the empty sentinel.
#[derive(Clone, Default)]
pub struct SkinImage {
    inner: Option<Rc<ImageData>>,
}

impl SkinImage {
    /// The sentinel returned when an image could not be produced.
    pub fn none() -> Self {
        Self { inner: None }
    }

    pub fn is_none(&self) -> bool {
        self.inner.is_none()
    }

    pub fn width(&self) -> u32 {
        self.inner.as_ref().map_or(0, |d| d.width)
    }

    pub fn height(&self) -> u32 {
        self.inner.as_ref().map_or(0, |d| d.height)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width() as i32, self.height() as i32)
    }

    pub fn pixels(&self) -> &[u32] {
        self.inner.as_ref().map_or(&[], |d| d.pixels.as_slice())
    }

    pub fn desc(&self) -> Option<&ImageDesc> {
        self.inner.as_ref().map(|d| &d.desc)
    }

    pub fn rotation(&self) -> Rotation {
        self.desc().map_or(Rotation::Deg0, |d| d.rotation)
    }

    pub fn blend(&self) -> Blend {
        self.desc().map_or(Blend::FULL, |d| d.blend)
    }

    /// Whether the store still holds this image.
    pub fn is_cached(&self) -> bool {
        self.inner.as_ref().is_some_and(|d| d.cached.get())
    }

    /// Outstanding handles, not counting the store's own hold.
    pub fn ref_count(&self) -> usize {
        match &self.inner {
            Some(data) => Rc::strong_count(data) - usize::from(data.cached.get()),
            None => 0,
        }
    }

    /// Whether both handles refer to the same image.
    pub fn same_image(&self, other: &SkinImage) -> bool {
        match (&self.inner, &other.inner) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }

    /// Uncached copy rotated by `rotation` relative to this image.
    pub fn clone_rotated(&self, rotation: Rotation) -> SkinImage {
        self.clone_full(rotation, Blend::FULL)
    }

    /// Uncached copy with identical pixels.
    pub fn duplicate(&self) -> SkinImage {
        self.clone_full(Rotation::Deg0, Blend::FULL)
    }

    /// Uncached copy rotated by `rotation` and attenuated by `blend`.
    ///
    /// Both arguments are relative to this image; the copy's descriptor holds
    /// the composed rotation and blend.
    pub fn clone_full(&self, rotation: Rotation, blend: Blend) -> SkinImage {
        let Some(src) = &self.inner else {
            return SkinImage::none();
        };
        let (mut pixels, width, height) =
            rotate_pixels(&src.pixels, src.width, src.height, rotation);
        blend_pixels(&mut pixels, blend);
        let desc = ImageDesc {
            path: src.desc.path.clone(),
            rotation: src.desc.rotation.rotate(rotation),
            blend: src.desc.blend.compose(blend),
        };
        SkinImage {
            inner: Some(Rc::new(ImageData {
                desc,
                width,
                height,
                pixels,
                cached: Cell::new(false),
            })),
        }
    }
}

impl fmt::Debug for SkinImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            Some(data) => f
                .debug_struct("SkinImage")
                .field("desc", &data.desc)
                .field("width", &data.width)
                .field("height", &data.height)
                .field("cached", &data.cached.get())
                .finish(),
            None => f.write_str("SkinImage::none"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ImageStoreConfig {
    /// Pixels the store may keep before evicting unreferenced images.
    pub pixel_budget: usize,
}

impl Default for ImageStoreConfig {
    fn default() -> Self {
        Self {
            pixel_budget: DEFAULT_PIXEL_BUDGET,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImageStoreStats {
    pub decodes: u64,
    pub derivations: u64,
    pub hits: u64,
    pub evictions: u64,
    pub total_pixels: usize,
    pub entries: usize,
}

/// LRU cache of decoded and derived images.
pub struct ImageStore {
    config: ImageStoreConfig,
    cache: LruCache<ImageDesc, Rc<ImageData>>,
    resources: HashMap<String, Vec<u8>>,
    total_pixels: usize,
    stats: ImageStoreStats,
}

impl ImageStore {
    pub fn new(config: ImageStoreConfig) -> Self {
        Self {
            config,
            cache: LruCache::unbounded(),
            resources: HashMap::new(),
            total_pixels: 0,
            stats: ImageStoreStats::default(),
        }
    }

    pub fn config(&self) -> &ImageStoreConfig {
        &self.config
    }

    /// Register encoded image bytes under a `:`-prefixed resource name.
    pub fn register_resource(&mut self, name: impl Into<String>, bytes: Vec<u8>) {
        let mut name = name.into();
        if !name.starts_with(':') {
            name.insert(0, ':');
        }
        self.resources.insert(name, bytes);
    }

    pub fn stats(&self) -> ImageStoreStats {
        ImageStoreStats {
            total_pixels: self.total_pixels,
            entries: self.cache.len(),
            ..self.stats
        }
    }

    /// Return the image for `desc`, decoding or deriving it when not cached.
    ///
    /// Never fails: problems are logged and yield [`SkinImage::none`].
    pub fn find(&mut self, desc: &ImageDesc) -> SkinImage {
        if let Some(data) = self.cache.get(desc) {
            self.stats.hits += 1;
            return SkinImage {
                inner: Some(data.clone()),
            };
        }

        let produced = if desc.is_base() {
            self.decode(&desc.path)
        } else {
            self.derive(desc)
        };
        let Some((width, height, pixels)) = produced else {
            return SkinImage::none();
        };

        let data = Rc::new(ImageData {
            desc: desc.clone(),
            width,
            height,
            pixels,
            cached: Cell::new(true),
        });
        self.total_pixels += width as usize * height as usize;
        self.cache.put(desc.clone(), data.clone());
        self.evict();

        SkinImage { inner: Some(data) }
    }

    /// The untransformed image at `path`.
    pub fn find_simple(&mut self, path: &str) -> SkinImage {
        self.find(&ImageDesc::new(path))
    }

    /// The untransformed image `file` relative to `dir`.
    pub fn find_in(&mut self, dir: &Path, file: &str) -> SkinImage {
        let path = resolve_image_path(dir, file);
        self.find_simple(&path)
    }

    /// The cached variant of `image` at `rotation`, keeping its path and blend.
    ///
    /// When `image` already has that rotation this is just another handle to it.
    pub fn rotate(&mut self, image: &SkinImage, rotation: Rotation) -> SkinImage {
        let Some(desc) = image.desc() else {
            return SkinImage::none();
        };
        if desc.rotation == rotation {
            return image.clone();
        }
        let desc = desc.clone().with_rotation(rotation);
        self.find(&desc)
    }

    /// Drop every cached entry. Outstanding handles remain valid and become
    /// exclusively owned by their holders.
    pub fn clear(&mut self) {
        for (_, data) in self.cache.iter() {
            data.cached.set(false);
        }
        self.cache.clear();
        self.total_pixels = 0;
    }

    fn decode(&mut self, path: &str) -> Option<(u32, u32, Vec<u32>)> {
        let decoded = if path.starts_with(':') {
            match self.resources.get(path) {
                Some(bytes) => image::load_from_memory(bytes),
                None => {
                    warn!("No embedded resource named {path}");
                    return None;
                }
            }
        } else {
            image::open(path)
        };

        let decoded = match decoded {
            Ok(img) => img.to_rgba8(),
            Err(e) => {
                warn!("Failed to load image {path}: {e}");
                return None;
            }
        };

        self.stats.decodes += 1;
        let (width, height) = decoded.dimensions();
        let pixels = decoded
            .pixels()
            .map(|p| {
                let [r, g, b, a] = p.0;
                (a as u32) << 24 | (r as u32) << 16 | (g as u32) << 8 | b as u32
            })
            .collect();
        debug!("Decoded {path} ({width}x{height})");
        Some((width, height, pixels))
    }

    fn derive(&mut self, desc: &ImageDesc) -> Option<(u32, u32, Vec<u32>)> {
        let base = self.find(&desc.base());
        let src = base.inner.as_ref()?;

        let (mut pixels, width, height) =
            rotate_pixels(&src.pixels, src.width, src.height, desc.rotation);
        blend_pixels(&mut pixels, desc.blend);
        self.stats.derivations += 1;
        debug!("Derived {desc}");
        Some((width, height, pixels))
    }

    /// Evict unreferenced entries from the least recently used end until the
    /// store fits its budget again.
    fn evict(&mut self) {
        if self.total_pixels <= self.config.pixel_budget {
            return;
        }

        let mut remaining = self.total_pixels;
        let mut victims = Vec::new();
        for (desc, data) in self.cache.iter().rev() {
            if remaining <= self.config.pixel_budget {
                break;
            }
            if Rc::strong_count(data) == 1 {
                remaining -= data.width as usize * data.height as usize;
                victims.push(desc.clone());
            }
        }

        for desc in victims {
            if let Some(data) = self.cache.pop(&desc) {
                data.cached.set(false);
                self.total_pixels -= data.width as usize * data.height as usize;
                self.stats.evictions += 1;
                debug!("Evicted {desc}");
            }
        }
    }
}

impl Default for ImageStore {
    fn default() -> Self {
        Self::new(ImageStoreConfig::default())
    }
}

impl Drop for ImageStore {
    fn drop(&mut self) {
        self.clear();
    }
}

/// Join an image file name onto a skin's base path.
///
/// Absolute names and `:`-prefixed resource names are kept as they are. A
/// base path of `:` selects embedded resources.
pub fn resolve_image_path(dir: &Path, file: &str) -> String {
    if file.starts_with(':') || Path::new(file).is_absolute() || dir.as_os_str().is_empty() {
        return file.to_string();
    }
    if dir.as_os_str() == ":" {
        return format!(":{file}");
    }
    let joined: PathBuf = dir.join(file);
    joined.to_string_lossy().into_owned()
}

/// Rotate a `width` x `height` pixel buffer clockwise by `rotation`.
///
/// Returns the new buffer and its dimensions. The mapping is an exact
/// permutation of the source pixels.
pub fn rotate_pixels(
    pixels: &[u32],
    width: u32,
    height: u32,
    rotation: Rotation,
) -> (Vec<u32>, u32, u32) {
    let (w, h) = (width as usize, height as usize);
    match rotation {
        Rotation::Deg0 => (pixels.to_vec(), width, height),
        Rotation::Deg180 => (pixels.iter().rev().copied().collect(), width, height),
        Rotation::Deg90 => {
            // (x, y) -> (h - 1 - y, x) in a buffer `h` pixels wide.
            let mut out = vec![0u32; pixels.len()];
            for y in 0..h {
                let row = &pixels[y * w..(y + 1) * w];
                for (x, &p) in row.iter().enumerate() {
                    out[x * h + (h - 1 - y)] = p;
                }
            }
            (out, height, width)
        }
        Rotation::Deg270 => {
            // (x, y) -> (y, w - 1 - x) in a buffer `h` pixels wide.
            let mut out = vec![0u32; pixels.len()];
            for y in 0..h {
                let row = &pixels[y * w..(y + 1) * w];
                for (x, &p) in row.iter().enumerate() {
                    out[(w - 1 - x) * h + y] = p;
                }
            }
            (out, height, width)
        }
    }
}

/// Scale the A/G and R/B byte pairs of every pixel by `blend / 256`.
pub fn blend_pixels(pixels: &mut [u32], blend: Blend) {
    if blend.is_full() {
        return;
    }
    let alpha = blend.level() as u32;
    for p in pixels.iter_mut() {
        let ag = (((*p >> 8) & 0x00ff_00ff) * alpha >> 8) & 0x00ff_00ff;
        let rb = ((*p & 0x00ff_00ff) * alpha >> 8) & 0x00ff_00ff;
        *p = ag << 8 | rb;
    }
}
