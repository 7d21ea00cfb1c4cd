use async_trait::async_trait;

use crate::errors::AppError;

/// File storage for uploaded photos.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Stores a resized copy of the upload and returns the generated file name
    /// (random hex token plus the original extension).
    async fn save_upload(&self, data: Vec<u8>, original_filename: &str) -> Result<String, AppError>;

    async fn read(&self, stored_filename: &str) -> Result<Vec<u8>, AppError>;

    async fn remove(&self, stored_filename: &str) -> Result<(), AppError>;
}
