use std::sync::Arc;

use validator::Validate;

use crate::{
    entities::{
        category::{CategoryLinkReport, CategoryPhotosResponse, PhotoCategoriesForm},
        photo::{GalleryView, NewPhoto, Photo, PhotoResponse, UploadResponse},
    },
    errors::AppError,
    repositories::{category::CategoryRepository, image_store::ImageStore, photo::PhotoRepository},
};

/// Gallery operations. Every call takes the acting user's id and only ever
/// touches that user's photos and categories.
pub struct PhotoHandler {
    pub photo_repo: Arc<dyn PhotoRepository>,
    pub category_repo: Arc<dyn CategoryRepository>,
    pub image_store: Arc<dyn ImageStore>,
}

fn responses(photos: Vec<Photo>) -> Vec<PhotoResponse> {
    photos.into_iter().map(PhotoResponse::from).collect()
}

/// Keeps the first occurrence of each id.
fn dedup_ids(ids: &[i64]) -> Vec<i64> {
    let mut unique = Vec::with_capacity(ids.len());
    for id in ids {
        if !unique.contains(id) {
            unique.push(*id);
        }
    }
    unique
}

impl PhotoHandler {
    pub fn new(
        photo_repo: Arc<dyn PhotoRepository>,
        category_repo: Arc<dyn CategoryRepository>,
        image_store: Arc<dyn ImageStore>,
    ) -> Self {
        PhotoHandler {
            photo_repo,
            category_repo,
            image_store,
        }
    }

    /// The user's photos and categories, as shown on the home page
    pub async fn gallery(&self, user_id: i64) -> Result<GalleryView, AppError> {
        let photos = self.photo_repo.list_photos(user_id).await?;
        let categories = self.category_repo.list_categories(user_id).await?;

        Ok(GalleryView {
            photos: responses(photos),
            categories,
        })
    }

    pub async fn favorites(&self, user_id: i64) -> Result<Vec<PhotoResponse>, AppError> {
        let photos = self.photo_repo.list_favorites(user_id).await?;
        Ok(responses(photos))
    }

    /// Stores the image, records the photo and links it to the requested categories
    pub async fn upload(
        &self,
        user_id: i64,
        request: NewPhoto,
        original_filename: &str,
        data: Vec<u8>,
    ) -> Result<UploadResponse, AppError> {
        let request = request.trimmed();
        request.validate()?;

        let image_file = self.image_store.save_upload(data, original_filename).await?;
        let insert = request.prepare_for_insert(user_id, image_file);

        let photo = match self.photo_repo.create_photo(&insert).await {
            Ok(photo) => photo,
            Err(e) => {
                if let Err(cleanup) = self.image_store.remove(&insert.image_file).await {
                    tracing::warn!("Failed to remove orphaned upload {}: {}", insert.image_file, cleanup);
                }
                return Err(e);
            }
        };

        let categories = if request.category_ids.is_empty() {
            CategoryLinkReport::new(photo.id)
        } else {
            match self.category_repo
                .link_categories(photo.id, user_id, &dedup_ids(&request.category_ids))
                .await
            {
                Ok(report) => report,
                Err(e) => {
                    self.discard_upload(&photo).await;
                    return Err(e);
                }
            }
        };

        tracing::info!(user_id, photo_id = photo.id, "Photo uploaded");
        Ok(UploadResponse {
            message: "Your photo has been uploaded!".to_string(),
            photo: photo.into(),
            categories,
        })
    }

    /// Undoes a half-finished upload. Failures are only logged; the caller
    /// reports the original error.
    async fn discard_upload(&self, photo: &Photo) {
        if let Err(e) = self.photo_repo.delete_photo(photo.id, photo.user_id).await {
            tracing::warn!("Failed to remove photo {} after a failed upload: {}", photo.id, e);
        }
        if let Err(e) = self.image_store.remove(&photo.image_file).await {
            tracing::warn!("Failed to remove orphaned upload {}: {}", photo.image_file, e);
        }
    }

    /// Sets or clears the favorite flag. Repeating the call changes nothing.
    pub async fn set_favorite(&self, user_id: i64, photo_id: i64, value: bool) -> Result<Photo, AppError> {
        self.photo_repo.set_favorite(photo_id, user_id, value).await
    }

    /// Deletes the photo row (its category links cascade) and then its stored image.
    pub async fn delete_photo(&self, user_id: i64, photo_id: i64) -> Result<Photo, AppError> {
        let photo = self.photo_repo.delete_photo(photo_id, user_id).await?;

        if let Err(e) = self.image_store.remove(&photo.image_file).await {
            tracing::warn!("Photo {} deleted but its image {} was not removed: {}", photo.id, photo.image_file, e);
        }

        tracing::info!(user_id, photo_id, "Photo deleted");
        Ok(photo)
    }

    /// Links a photo to categories. Ids that do not name one of the user's
    /// categories are reported as `not_found` instead of failing the request.
    pub async fn add_categories(
        &self,
        user_id: i64,
        photo_id: i64,
        category_ids: &[i64],
    ) -> Result<CategoryLinkReport, AppError> {
        self.photo_repo.get_photo(photo_id, user_id).await?;

        let ids = dedup_ids(category_ids);
        if ids.is_empty() {
            return Ok(CategoryLinkReport::new(photo_id));
        }

        self.category_repo.link_categories(photo_id, user_id, &ids).await
    }

    pub async fn categories_form(&self, user_id: i64, photo_id: i64) -> Result<PhotoCategoriesForm, AppError> {
        let photo = self.photo_repo.get_photo(photo_id, user_id).await?;
        let categories = self.category_repo.list_categories(user_id).await?;
        let linked_category_ids = self.category_repo.linked_category_ids(photo.id).await?;

        Ok(PhotoCategoriesForm {
            photo: photo.into(),
            categories,
            linked_category_ids,
        })
    }

    /// Photos in one of the user's categories. Another user's category is not found.
    pub async fn photos_by_category(
        &self,
        user_id: i64,
        category_id: i64,
    ) -> Result<CategoryPhotosResponse, AppError> {
        let category = self.category_repo
            .find_category(category_id, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Category not found".to_string()))?;

        let photos = self.photo_repo.photos_by_category(category_id, user_id).await?;

        Ok(CategoryPhotosResponse {
            category,
            photos: responses(photos),
        })
    }

    pub async fn open_image(&self, user_id: i64, image_file: &str) -> Result<Vec<u8>, AppError> {
        if !self.photo_repo.owns_image(user_id, image_file).await? {
            return Err(AppError::NotFound("Image not found".to_string()));
        }

        self.image_store.read(image_file).await
    }
}
