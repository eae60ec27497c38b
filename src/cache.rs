use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use image::{ImageReader, RgbaImage};

pub const DEFAULT_CACHE_CAPACITY: usize = 256;

pub type ImageHandle = Arc<RgbaImage>;

/// Least-recently-used store of decoded figures keyed by path.
pub struct ImageCache {
    capacity: usize,
    entries: HashMap<PathBuf, ImageHandle>,
    // Front is most recently used.
    usage: VecDeque<PathBuf>,
    decodes: usize,
}

impl Default for ImageCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }
}

impl ImageCache {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: HashMap::with_capacity(capacity),
            usage: VecDeque::with_capacity(capacity),
            decodes: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries.contains_key(path)
    }

    /// Number of decodes performed since the cache was created.
    pub fn decode_count(&self) -> usize {
        self.decodes
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.usage.clear();
    }

    pub fn get(&mut self, path: &Path) -> Result<ImageHandle> {
        if let Some(image) = self.entries.get(path).cloned() {
            self.touch(path);
            return Ok(image);
        }

        let image = Arc::new(decode_rgba(path)?);
        self.decodes += 1;

        if self.entries.len() >= self.capacity {
            if let Some(evicted) = self.usage.pop_back() {
                log::debug!("Evicting {} from image cache", evicted.display());
                self.entries.remove(&evicted);
            }
        }
        self.entries.insert(path.to_path_buf(), Arc::clone(&image));
        self.usage.push_front(path.to_path_buf());
        Ok(image)
    }

    fn touch(&mut self, path: &Path) {
        if let Some(position) = self.usage.iter().position(|entry| entry == path) {
            if let Some(entry) = self.usage.remove(position) {
                self.usage.push_front(entry);
            }
        }
    }
}

fn decode_rgba(path: &Path) -> Result<RgbaImage> {
    log::debug!("Decoding {}", path.display());
    let image = ImageReader::open(path)
        .with_context(|| format!("Could not open {}", path.display()))?
        .with_guessed_format()
        .with_context(|| format!("Could not read {}", path.display()))?
        .decode()
        .with_context(|| format!("Could not decode {}", path.display()))?;
    Ok(image.to_rgba8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use std::fs;

    fn scratch_dir(tag: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "ndplot-cache-{tag}-{}-{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        ));
        fs::create_dir_all(&path).expect("should create scratch dir");
        path
    }

    fn write_png(dir: &Path, name: &str, shade: u8) -> PathBuf {
        let path = dir.join(name);
        RgbaImage::from_pixel(2, 2, Rgba([shade, shade, shade, 255]))
            .save(&path)
            .expect("should write fixture png");
        path
    }

    #[test]
    fn repeated_get_returns_the_same_handle() {
        let dir = scratch_dir("hit");
        let path = write_png(&dir, "a=1.png", 10);
        let mut cache = ImageCache::default();

        let first = cache.get(&path).expect("first load");
        let second = cache.get(&path).expect("second load");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.decode_count(), 1);
        assert_eq!(first.dimensions(), (2, 2));
        assert_eq!(first.get_pixel(0, 0), &Rgba([10, 10, 10, 255]));

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn rgb_sources_are_normalized_to_rgba() {
        let dir = scratch_dir("rgb");
        let path = dir.join("a=1.png");
        image::RgbImage::from_pixel(1, 1, image::Rgb([1, 2, 3]))
            .save(&path)
            .expect("should write fixture png");

        let mut cache = ImageCache::default();
        let image = cache.get(&path).expect("load");
        assert_eq!(image.get_pixel(0, 0), &Rgba([1, 2, 3, 255]));

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn full_cache_evicts_least_recently_used() {
        let dir = scratch_dir("lru");
        let a = write_png(&dir, "a=1.png", 1);
        let b = write_png(&dir, "a=2.png", 2);
        let c = write_png(&dir, "a=3.png", 3);
        let mut cache = ImageCache::with_capacity(2);

        cache.get(&a).expect("load a");
        cache.get(&b).expect("load b");
        // Touch `a` so `b` becomes the eviction candidate.
        cache.get(&a).expect("reload a");
        cache.get(&c).expect("load c");

        assert_eq!(cache.len(), 2);
        assert!(cache.contains(&a));
        assert!(!cache.contains(&b));
        assert!(cache.contains(&c));
        assert_eq!(cache.decode_count(), 3);

        cache.get(&b).expect("reload b");
        assert!(!cache.contains(&a));
        assert_eq!(cache.decode_count(), 4);

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn decode_failures_propagate_and_are_not_cached() {
        let dir = scratch_dir("corrupt");
        let path = dir.join("a=1.png");
        fs::write(&path, b"not an image").expect("should write fixture");
        let mut cache = ImageCache::default();

        assert!(cache.get(&path).is_err());
        assert!(cache.get(&dir.join("a=2.png")).is_err());
        assert!(cache.is_empty());
        assert_eq!(cache.decode_count(), 0);

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn clear_resets_entries() {
        let dir = scratch_dir("clear");
        let path = write_png(&dir, "a=1.png", 5);
        let mut cache = ImageCache::with_capacity(0);
        assert_eq!(cache.capacity(), 1);

        cache.get(&path).expect("load");
        cache.clear();
        assert!(cache.is_empty());
        cache.get(&path).expect("reload");
        assert_eq!(cache.decode_count(), 2);

        let _ = fs::remove_dir_all(dir);
    }
}
