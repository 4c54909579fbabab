use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use engine::{load_bitmap, AssetError, Bitmap};
use tracing::debug;

/// Decoded puzzle pictures keyed by file name. Entries are never evicted;
/// failed loads are not cached so a later attempt retries the disk.
#[derive(Debug)]
pub(crate) struct ImageSource {
    images_dir: PathBuf,
    canonical_size: u32,
    originals: HashMap<String, Arc<Bitmap>>,
    canonical: HashMap<String, Arc<Bitmap>>,
}

impl ImageSource {
    pub(crate) fn new(images_dir: PathBuf, canonical_size: u32) -> Self {
        Self {
            images_dir,
            canonical_size,
            originals: HashMap::new(),
            canonical: HashMap::new(),
        }
    }

    /// The picture as decoded from disk.
    pub(crate) fn original(&mut self, file_name: &str) -> Result<Arc<Bitmap>, AssetError> {
        if let Some(bitmap) = self.originals.get(file_name) {
            return Ok(Arc::clone(bitmap));
        }
        let path = self.images_dir.join(file_name);
        let bitmap = Arc::new(load_bitmap(&path)?);
        debug!(
            image = file_name,
            width = bitmap.width(),
            height = bitmap.height(),
            "image_decoded"
        );
        self.originals
            .insert(file_name.to_string(), Arc::clone(&bitmap));
        Ok(bitmap)
    }

    /// The picture scaled to the square canonical size used for slicing.
    pub(crate) fn canonical(&mut self, file_name: &str) -> Result<Arc<Bitmap>, AssetError> {
        if let Some(bitmap) = self.canonical.get(file_name) {
            return Ok(Arc::clone(bitmap));
        }
        let original = self.original(file_name)?;
        let scaled = Arc::new(original.resized(self.canonical_size, self.canonical_size));
        self.canonical
            .insert(file_name.to_string(), Arc::clone(&scaled));
        Ok(scaled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_png(dir: &std::path::Path, name: &str, width: u32, height: u32) {
        image::RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]))
            .save(dir.join(name))
            .expect("save png");
    }

    #[test]
    fn canonical_is_scaled_and_cached() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_png(dir.path(), "1.png", 37, 91);
        let mut source = ImageSource::new(dir.path().to_path_buf(), 400);

        let first = source.canonical("1.png").expect("load");
        assert_eq!((first.width(), first.height()), (400, 400));

        std::fs::remove_file(dir.path().join("1.png")).expect("remove");
        let second = source.canonical("1.png").expect("cached");
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn missing_image_is_reported_and_not_cached() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut source = ImageSource::new(dir.path().to_path_buf(), 400);

        let error = source.canonical("3.png").expect_err("missing");
        assert!(error.is_missing());

        write_png(dir.path(), "3.png", 8, 8);
        assert!(source.canonical("3.png").is_ok());
    }

    #[test]
    fn corrupt_image_is_a_decode_failure() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("2.png"), b"not an image").expect("write");
        let mut source = ImageSource::new(dir.path().to_path_buf(), 400);

        let error = source.canonical("2.png").expect_err("corrupt");
        assert!(matches!(error, AssetError::Decode { .. }));
    }
}
