use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::Context;
use async_trait::async_trait;
use image::{DynamicImage, ImageFormat};

use crate::{
    constants::{ALLOWED_IMAGE_EXTENSIONS, IMAGE_NAME_BYTES},
    errors::AppError,
    repositories::image_store::ImageStore,
};

/// Stores resized uploads in a directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalImageStore {
    root: PathBuf,
    max_dimension: u32,
}

impl LocalImageStore {
    pub fn new(root: impl Into<PathBuf>, max_dimension: u32) -> Self {
        LocalImageStore {
            root: root.into(),
            max_dimension,
        }
    }

    pub async fn ensure_dir(&self) -> anyhow::Result<()> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .with_context(|| format!("creating upload directory {}", self.root.display()))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, stored_filename: &str) -> Result<PathBuf, AppError> {
        if is_stored_name(stored_filename) {
            Ok(self.root.join(stored_filename))
        } else {
            Err(AppError::NotFound("Image not found".to_string()))
        }
    }
}

/// Lower-cased extension of the uploaded file, if it is one we accept.
pub fn upload_extension(original_filename: &str) -> Result<String, AppError> {
    let ext = Path::new(original_filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    if ALLOWED_IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        Ok(ext)
    } else {
        Err(AppError::field(
            "photo",
            &format!("File type not allowed. Use one of: {}", ALLOWED_IMAGE_EXTENSIONS.join(", ")),
        ))
    }
}

pub fn random_image_name(ext: &str) -> String {
    let token: [u8; IMAGE_NAME_BYTES] = rand::random();
    format!("{}.{}", hex::encode(token), ext)
}

/// Names we generate are plain `[0-9a-z]+.ext`; anything else never hits the disk.
fn is_stored_name(name: &str) -> bool {
    match name.split_once('.') {
        Some((stem, ext)) => {
            !stem.is_empty()
                && stem.chars().all(|c| c.is_ascii_alphanumeric())
                && ALLOWED_IMAGE_EXTENSIONS.contains(&ext)
        }
        None => false,
    }
}

/// Shrinks to fit a `max`×`max` box keeping the aspect ratio. Smaller images are left alone.
pub fn shrink_to_fit(img: DynamicImage, max: u32) -> DynamicImage {
    if img.width() <= max && img.height() <= max {
        img
    } else {
        img.thumbnail(max, max)
    }
}

fn write_thumbnail(data: &[u8], ext: &str, path: &Path, max: u32) -> Result<(), AppError> {
    let format = ImageFormat::from_extension(ext)
        .ok_or_else(|| AppError::field("photo", "Unsupported image format"))?;

    let img = image::load_from_memory(data)
        .map_err(|_| AppError::field("photo", "Uploaded file could not be read as an image"))?;

    let img = match format {
        // JPEG has no alpha channel
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(shrink_to_fit(img, max).to_rgb8()),
        _ => shrink_to_fit(img, max),
    };

    img.save_with_format(path, format)
        .with_context(|| format!("writing thumbnail {}", path.display()))?;

    Ok(())
}

#[async_trait]
impl ImageStore for LocalImageStore {
    async fn save_upload(&self, data: Vec<u8>, original_filename: &str) -> Result<String, AppError> {
        let ext = upload_extension(original_filename)?;

        if !infer::is_image(&data) {
            return Err(AppError::field("photo", "Uploaded file is not an image"));
        }

        let file_name = random_image_name(&ext);
        let path = self.root.join(&file_name);
        let max = self.max_dimension;

        tokio::task::spawn_blocking(move || write_thumbnail(&data, &ext, &path, max))
            .await
            .map_err(|e| AppError::InternalError(format!("Image task failed: {}", e)))??;

        tracing::debug!(file = %file_name, original = %original_filename, "Stored upload");
        Ok(file_name)
    }

    async fn read(&self, stored_filename: &str) -> Result<Vec<u8>, AppError> {
        let path = self.path_for(stored_filename)?;

        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(AppError::NotFound("Image not found".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn remove(&self, stored_filename: &str) -> Result<(), AppError> {
        let path = self.path_for(stored_filename)?;

        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
