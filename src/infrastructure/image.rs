// src/infrastructure/image.rs
use crate::constants::{
    DEFAULT_IMAGE_WIDTH, DEFAULT_JPEG_QUALITY, IMAGE_COUNTER_KEY, IMAGE_KEY_PREFIX,
};
use crate::domain::{ImageError, StorageError};
use crate::infrastructure::markdown::ImageSource;
use crate::infrastructure::storage::KeyValueStore;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{Rgb, RgbImage};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct ImageSettings {
    #[serde(default = "default_target_width")]
    pub target_width: u32,
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
}

fn default_target_width() -> u32 {
    DEFAULT_IMAGE_WIDTH
}

fn default_jpeg_quality() -> u8 {
    DEFAULT_JPEG_QUALITY
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self {
            target_width: default_target_width(),
            jpeg_quality: default_jpeg_quality(),
        }
    }
}

/// Decode `bytes`, scale to the target width keeping the aspect ratio,
/// flatten onto white and return a `data:image/jpeg;base64,` URI.
#[instrument(level = "debug", skip(bytes), fields(input_bytes = bytes.len()))]
pub fn resize_to_data_uri(bytes: &[u8], settings: &ImageSettings) -> Result<String, ImageError> {
    let source = image::load_from_memory(bytes)?;
    if source.width() == 0 || source.height() == 0 {
        return Err(ImageError::Empty);
    }

    let width = settings.target_width.max(1);
    let ratio = f64::from(source.height()) / f64::from(source.width());
    let height = (f64::from(width) * ratio).round().max(1.0);
    let max = u32::from(u16::MAX);
    if width > max || height > f64::from(max) {
        return Err(ImageError::TooLarge {
            width,
            height: height.min(f64::from(u32::MAX)) as u32,
            max,
        });
    }
    let height = height as u32;
    debug!(from_w = source.width(), from_h = source.height(), width, height, "Resizing");

    let resized = source.resize_exact(width, height, FilterType::Triangle).to_rgba8();
    drop(source);

    let mut canvas = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));
    for (x, y, pixel) in resized.enumerate_pixels() {
        let [r, g, b, a] = pixel.0;
        let alpha = u16::from(a);
        let blend = |channel: u8| ((u16::from(channel) * alpha + 255 * (255 - alpha)) / 255) as u8;
        canvas.put_pixel(x, y, Rgb([blend(r), blend(g), blend(b)]));
    }

    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, settings.jpeg_quality)
        .encode_image(&canvas)
        .map_err(|e| ImageError::Encode(e.to_string()))?;

    Ok(format!("data:image/jpeg;base64,{}", STANDARD.encode(&jpeg)))
}

/// A stored image: full storage key and short name (`image_{n}`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    pub key: String,
    pub name: String,
}

/// Images kept in the key-value store as data URIs, named `image_{n}` with a
/// persistent counter.
#[derive(Debug)]
pub struct ImageStore<S: KeyValueStore> {
    store: S,
    counter: u64,
    settings: ImageSettings,
}

impl<S: KeyValueStore> ImageStore<S> {
    pub fn open(store: S, settings: ImageSettings) -> Result<Self, StorageError> {
        let counter = match store.get(IMAGE_COUNTER_KEY)? {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                warn!(value = %raw, "Ignoring unreadable image counter");
                0
            }),
            None => 0,
        };
        Ok(Self {
            store,
            counter,
            settings,
        })
    }

    pub fn counter(&self) -> u64 {
        self.counter
    }

    /// Re-encode and store an image. Returns the stored entry.
    #[instrument(level = "debug", skip(self, bytes))]
    pub fn save_image(&mut self, bytes: &[u8]) -> Result<StoredImage, ImageError> {
        let data_uri = resize_to_data_uri(bytes, &self.settings)?;

        let next = self.counter + 1;
        let name = format!("image_{next}");
        let key = format!("{IMAGE_KEY_PREFIX}{name}");

        self.store.set(&key, &data_uri)?;
        self.store.set(IMAGE_COUNTER_KEY, &next.to_string())?;
        self.counter = next;

        debug!(%name, bytes = data_uri.len(), "Stored image");
        Ok(StoredImage { key, name })
    }

    /// Data URI stored under the full key.
    pub fn image_data(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.store.get(key)
    }

    pub fn image_data_by_name(&self, name: &str) -> Result<Option<String>, StorageError> {
        self.store.get(&format!("{IMAGE_KEY_PREFIX}{name}"))
    }

    pub fn all_images(&self) -> Result<Vec<StoredImage>, StorageError> {
        Ok(self
            .store
            .keys()?
            .into_iter()
            .filter(|key| key != IMAGE_COUNTER_KEY)
            .filter_map(|key| {
                let name = key.strip_prefix(IMAGE_KEY_PREFIX)?.to_string();
                Some(StoredImage { key, name })
            })
            .collect())
    }
}

impl<S: KeyValueStore> ImageSource for ImageStore<S> {
    fn image_data_by_name(&self, name: &str) -> Option<String> {
        ImageStore::image_data_by_name(self, name).unwrap_or_else(|e| {
            warn!(error = %e, image = name, "Failed to read stored image");
            None
        })
    }
}
