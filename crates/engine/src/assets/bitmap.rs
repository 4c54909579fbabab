use std::fmt;
use std::path::Path;

use image::imageops::{self, FilterType};
use image::{ImageReader, RgbaImage};

use super::AssetError;

/// Decoded RGBA8 image owned by the engine.
///
/// Bitmaps are immutable once built; slicing and scaling return new bitmaps so
/// callers can share them behind `Arc` between the logic and the draw list.
#[derive(Clone, PartialEq, Eq)]
pub struct Bitmap {
    image: RgbaImage,
}

impl fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bitmap")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

impl Bitmap {
    pub fn from_rgba(width: u32, height: u32, rgba: Vec<u8>) -> Option<Self> {
        RgbaImage::from_raw(width, height, rgba).map(|image| Self { image })
    }

    pub fn filled(width: u32, height: u32, color: [u8; 4]) -> Self {
        Self {
            image: RgbaImage::from_pixel(width, height, image::Rgba(color)),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn rgba(&self) -> &[u8] {
        self.image.as_raw()
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        Some(self.image.get_pixel(x, y).0)
    }

    /// Smooth rescale to exactly `width` x `height`.
    pub fn resized(&self, width: u32, height: u32) -> Bitmap {
        if width == self.width() && height == self.height() {
            return self.clone();
        }
        let width = width.max(1);
        let height = height.max(1);
        Bitmap {
            image: imageops::resize(&self.image, width, height, FilterType::Triangle),
        }
    }

    /// Copies the `width` x `height` region at (`x`, `y`), clipped to the bitmap.
    pub fn cropped(&self, x: u32, y: u32, width: u32, height: u32) -> Bitmap {
        let x = x.min(self.width());
        let y = y.min(self.height());
        let width = width.min(self.width() - x);
        let height = height.min(self.height() - y);
        Bitmap {
            image: imageops::crop_imm(&self.image, x, y, width, height).to_image(),
        }
    }
}

pub fn load_bitmap(path: &Path) -> Result<Bitmap, AssetError> {
    let reader = ImageReader::open(path).map_err(|source| AssetError::from_io(path, source))?;
    let reader = reader
        .with_guessed_format()
        .map_err(|source| AssetError::from_io(path, source))?;
    let decoded = reader.decode().map_err(|error| AssetError::Decode {
        path: path.to_path_buf(),
        reason: error.to_string(),
    })?;
    Ok(Bitmap {
        image: decoded.to_rgba8(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn checker(width: u32, height: u32) -> Bitmap {
        let mut rgba = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                let v = if (x + y) % 2 == 0 { 255 } else { 0 };
                rgba.extend_from_slice(&[v, x as u8, y as u8, 255]);
            }
        }
        Bitmap::from_rgba(width, height, rgba).expect("valid rgba")
    }

    #[test]
    fn from_rgba_rejects_short_buffer() {
        assert!(Bitmap::from_rgba(2, 2, vec![0; 15]).is_none());
        assert!(Bitmap::from_rgba(2, 2, vec![0; 16]).is_some());
    }

    #[test]
    fn cropped_copies_requested_region() {
        let bitmap = checker(8, 6);
        let piece = bitmap.cropped(2, 3, 4, 2);
        assert_eq!((piece.width(), piece.height()), (4, 2));
        assert_eq!(piece.pixel(0, 0), bitmap.pixel(2, 3));
        assert_eq!(piece.pixel(3, 1), bitmap.pixel(5, 4));
    }

    #[test]
    fn cropped_clips_to_bounds() {
        let bitmap = checker(8, 6);
        let piece = bitmap.cropped(6, 5, 10, 10);
        assert_eq!((piece.width(), piece.height()), (2, 1));
    }

    #[test]
    fn resized_hits_exact_dimensions() {
        let bitmap = checker(37, 91);
        let scaled = bitmap.resized(400, 400);
        assert_eq!((scaled.width(), scaled.height()), (400, 400));
        assert_eq!(bitmap.resized(37, 91), bitmap);
    }

    #[test]
    fn load_missing_file_reports_missing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let error = load_bitmap(&dir.path().join("nope.png")).expect_err("missing");
        assert!(error.is_missing());
    }

    #[test]
    fn load_garbage_reports_decode_failure() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("broken.png");
        fs::write(&path, b"definitely not a png").expect("write");
        let error = load_bitmap(&path).expect_err("decode failure");
        assert!(matches!(error, AssetError::Decode { .. }));
        assert_eq!(error.path(), path.as_path());
    }

    #[test]
    fn load_round_trips_png_pixels() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("tile.png");
        let bitmap = checker(5, 4);
        bitmap.image.save(&path).expect("save png");

        let loaded = load_bitmap(&path).expect("load");
        assert_eq!(loaded, bitmap);
    }
}
