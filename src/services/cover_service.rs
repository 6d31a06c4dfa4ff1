//! Cover image storage
//!
//! Covers live as plain files in one directory and are referenced by filename.
//! Every stored cover fits inside a `max_dimension` square; larger images are
//! downscaled keeping their aspect ratio, smaller ones are left alone.

use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::domain::DomainError;
use crate::utils::sanitize_filename;

const MAX_NAME_ATTEMPTS: usize = 8;

#[derive(Debug, Clone)]
pub struct CoverStore {
    dir: PathBuf,
    max_dimension: u32,
}

impl CoverStore {
    pub fn new(dir: impl Into<PathBuf>, max_dimension: u32) -> Self {
        Self {
            dir: dir.into(),
            max_dimension: max_dimension.max(1),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Decode downloaded bytes, shrink them and save as `{uuid}.jpg`.
    pub fn store_remote(&self, bytes: &[u8]) -> Result<String, DomainError> {
        let img = image::load_from_memory(bytes)
            .map_err(|e| DomainError::Validation(format!("Undecodable cover image: {}", e)))?;
        let img = self.constrain(img);

        fs::create_dir_all(&self.dir)?;
        let filename = format!("{}.jpg", uuid::Uuid::new_v4());
        let path = self.dir.join(&filename);

        // JPEG has no alpha channel
        DynamicImage::ImageRgb8(img.to_rgb8())
            .save_with_format(&path, ImageFormat::Jpeg)
            .map_err(|e| DomainError::Internal(format!("Failed to save cover: {}", e)))?;

        tracing::debug!("Stored downloaded cover as {}", filename);
        Ok(filename)
    }

    /// Save an uploaded file under its sanitized name, then shrink it in place.
    ///
    /// An existing file with the same name is never overwritten: the new file
    /// gets a short random prefix instead. Files that fail to decode are removed.
    pub fn store_upload(&self, original_name: &str, bytes: &[u8]) -> Result<String, DomainError> {
        let sanitized = sanitize_filename(original_name);
        if sanitized.is_empty() {
            return Err(DomainError::Validation(format!(
                "Unusable cover filename: {:?}",
                original_name
            )));
        }

        fs::create_dir_all(&self.dir)?;
        let (filename, mut file) = self.create_unique(&sanitized)?;
        let path = self.dir.join(&filename);

        let written = file.write_all(bytes).map_err(DomainError::from);
        drop(file);

        if let Err(e) = written.and_then(|_| self.constrain_in_place(&path)) {
            let _ = fs::remove_file(&path);
            return Err(e);
        }

        tracing::debug!("Stored uploaded cover as {}", filename);
        Ok(filename)
    }

    /// Atomically claim `name`, or a randomly prefixed variant if it is taken
    fn create_unique(&self, name: &str) -> Result<(String, fs::File), DomainError> {
        let mut candidate = name.to_string();

        for _ in 0..MAX_NAME_ATTEMPTS {
            match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(self.dir.join(&candidate))
            {
                Ok(file) => return Ok((candidate, file)),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    let token = uuid::Uuid::new_v4().simple().to_string();
                    candidate = format!("{}_{}", &token[..8], name);
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(DomainError::Internal(format!(
            "No free cover filename for {:?}",
            name
        )))
    }

    /// Remove a stored cover. Missing files are not an error.
    pub fn remove(&self, filename: &str) -> Result<(), DomainError> {
        if sanitize_filename(filename) != filename {
            return Err(DomainError::Validation(format!(
                "Refusing to remove {:?}",
                filename
            )));
        }

        match fs::remove_file(self.dir.join(filename)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn constrain_in_place(&self, path: &Path) -> Result<(), DomainError> {
        let reader = ImageReader::open(path)?.with_guessed_format()?;
        let format = reader
            .format()
            .ok_or_else(|| DomainError::Validation("Unrecognized cover image format".to_string()))?;
        let img = reader
            .decode()
            .map_err(|e| DomainError::Validation(format!("Undecodable cover image: {}", e)))?;

        if self.fits(&img) {
            return Ok(());
        }

        let img = self.constrain(img);
        let img = match format {
            ImageFormat::Jpeg => DynamicImage::ImageRgb8(img.to_rgb8()),
            _ => img,
        };

        img.save_with_format(path, format)
            .map_err(|e| DomainError::Internal(format!("Failed to save cover: {}", e)))
    }

    fn fits(&self, img: &DynamicImage) -> bool {
        img.width() <= self.max_dimension && img.height() <= self.max_dimension
    }

    fn constrain(&self, img: DynamicImage) -> DynamicImage {
        if self.fits(&img) {
            img
        } else {
            img.resize(self.max_dimension, self.max_dimension, FilterType::Lanczos3)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};
    use std::io::Cursor;

    // The directory is removed when the returned guard drops
    fn temp_store(max: u32) -> (tempfile::TempDir, CoverStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = CoverStore::new(dir.path().join("covers"), max);
        (dir, store)
    }

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([200, 30, 30, 128]));
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, Rgb([10, 120, 200]));
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut out, ImageFormat::Jpeg)
            .unwrap();
        out.into_inner()
    }

    fn dimensions(store: &CoverStore, filename: &str) -> (u32, u32) {
        image::image_dimensions(store.dir().join(filename)).unwrap()
    }

    #[test]
    fn remote_cover_is_bounded_jpeg() {
        let (_dir, store) = temp_store(300);
        let filename = store.store_remote(&png_bytes(1200, 600)).unwrap();

        assert!(filename.ends_with(".jpg"));
        let (w, h) = dimensions(&store, &filename);
        assert!(w <= 300 && h <= 300, "got {w}x{h}");
        assert_eq!(w, 300);
        assert_eq!(h, 150);
    }

    #[test]
    fn small_upload_is_not_upscaled() {
        let (_dir, store) = temp_store(300);
        let filename = store.store_upload("tiny.png", &png_bytes(40, 60)).unwrap();
        assert_eq!(filename, "tiny.png");
        assert_eq!(dimensions(&store, &filename), (40, 60));
    }

    #[test]
    fn tall_upload_is_shrunk_in_place() {
        let (_dir, store) = temp_store(300);
        let filename = store
            .store_upload("../My Cover.jpg", &jpeg_bytes(500, 1000))
            .unwrap();

        assert_eq!(filename, "My_Cover.jpg");
        let (w, h) = dimensions(&store, &filename);
        assert!(w <= 300 && h <= 300, "got {w}x{h}");
    }

    #[test]
    fn same_name_does_not_overwrite() {
        let (_dir, store) = temp_store(300);
        let first = store.store_upload("cover.png", &png_bytes(10, 10)).unwrap();
        let second = store.store_upload("cover.png", &png_bytes(20, 20)).unwrap();

        assert_ne!(first, second);
        assert!(second.ends_with("_cover.png"));
        assert_eq!(dimensions(&store, &first), (10, 10));
    }

    #[test]
    fn concurrent_uploads_with_same_name_keep_every_file() {
        let (_dir, store) = temp_store(300);

        let handles: Vec<_> = (0..4u32)
            .map(|i| {
                let store = store.clone();
                let bytes = png_bytes(10 + i, 10);
                std::thread::spawn(move || store.store_upload("same.png", &bytes).unwrap())
            })
            .collect();

        let names: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        let mut widths: Vec<u32> = names.iter().map(|n| dimensions(&store, n).0).collect();
        widths.sort();
        assert_eq!(widths, vec![10, 11, 12, 13]);
    }

    #[test]
    fn garbage_upload_is_rejected_and_removed() {
        let (_dir, store) = temp_store(300);
        let err = store
            .store_upload("notes.png", b"definitely not an image")
            .expect_err("must not decode");
        assert!(matches!(err, DomainError::Validation(_)));
        assert!(!store.dir().join("notes.png").exists());
    }

    #[test]
    fn unusable_name_is_rejected() {
        let (_dir, store) = temp_store(300);
        assert!(store.store_upload("...", &png_bytes(5, 5)).is_err());
    }

    #[test]
    fn remove_is_lenient_but_safe() {
        let (_dir, store) = temp_store(300);
        let filename = store.store_upload("gone.png", &png_bytes(5, 5)).unwrap();
        store.remove(&filename).unwrap();
        store.remove(&filename).unwrap();
        assert!(store.remove("../outside.png").is_err());
    }
}
