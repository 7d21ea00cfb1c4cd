use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::constants::IMAGE_URL_PREFIX;
use crate::entities::category::{Category, CategoryLinkReport};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Photo {
    pub id: i64,
    pub title: String,
    pub image_file: String, // stored name inside the upload directory
    pub date_posted: DateTime<Utc>,
    pub user_id: i64,
    pub is_favorite: bool,
}

#[derive(Debug, Clone)]
pub struct PhotoInsert {
    pub title: String,
    pub image_file: String,
    pub user_id: i64,
    pub date_posted: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewPhoto {
    #[validate(length(min = 1, max = 100, message = "Title must be between 1 and 100 characters"))]
    pub title: String,

    #[serde(default)]
    pub category_ids: Vec<i64>,
}

impl NewPhoto {
    pub fn trimmed(self) -> Self {
        NewPhoto {
            title: self.title.trim().to_string(),
            ..self
        }
    }

    pub fn prepare_for_insert(&self, user_id: i64, image_file: String) -> PhotoInsert {
        PhotoInsert {
            title: self.title.trim().to_string(),
            image_file,
            user_id,
            date_posted: Utc::now(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PhotoResponse {
    pub id: i64,
    pub title: String,
    pub image_file: String,
    pub image_url: String,
    pub date_posted: DateTime<Utc>,
    pub is_favorite: bool,
}

impl From<Photo> for PhotoResponse {
    fn from(photo: Photo) -> Self {
        PhotoResponse {
            id: photo.id,
            image_url: format!("{}/{}", IMAGE_URL_PREFIX, photo.image_file),
            title: photo.title,
            image_file: photo.image_file,
            date_posted: photo.date_posted,
            is_favorite: photo.is_favorite,
        }
    }
}

/// Everything the home page shows for one user.
#[derive(Debug, Serialize)]
pub struct GalleryView {
    pub photos: Vec<PhotoResponse>,
    pub categories: Vec<Category>,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub photo: PhotoResponse,
    pub categories: CategoryLinkReport,
}

#[derive(Debug, Serialize)]
pub struct PhotoActionResponse {
    pub message: String,
    pub photo: PhotoResponse,
}
