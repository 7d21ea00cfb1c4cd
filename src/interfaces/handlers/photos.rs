use actix_multipart::form::{tempfile::TempFile, text::Text, MultipartForm};
use actix_web::{get, post, route, web, HttpResponse};
use tracing::instrument;

use crate::entities::{
    category::AddToCategoryRequest,
    form,
    photo::{NewPhoto, PhotoActionResponse},
};
use crate::errors::AppError;
use crate::use_cases::extractors::CurrentUser;
use crate::AppState;

#[derive(Debug, MultipartForm)]
pub struct UploadForm {
    pub photo: TempFile,
    pub title: Text<String>,
    /// Repeated field, one id per entry
    pub categories: Vec<Text<i64>>,
}

#[get("/upload")]
#[instrument(skip_all, fields(user_id = user.id))]
pub async fn upload_form(state: web::Data<AppState>, user: CurrentUser) -> Result<HttpResponse, AppError> {
    let categories = state.category_handler.list_categories(user.id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "form": form::upload_form(),
        "categories": categories,
    })))
}

#[post("/upload")]
#[instrument(skip_all, fields(user_id = user.id))]
pub async fn upload(
    state: web::Data<AppState>,
    user: CurrentUser,
    MultipartForm(form): MultipartForm<UploadForm>,
) -> Result<HttpResponse, AppError> {
    let original_filename = form.photo.file_name
        .clone()
        .filter(|name| !name.is_empty())
        .ok_or_else(|| AppError::field("photo", "A photo file is required"))?;

    let data = tokio::fs::read(form.photo.file.path()).await?;

    let request = NewPhoto {
        title: form.title.into_inner(),
        category_ids: form.categories.into_iter().map(Text::into_inner).collect(),
    };

    let response = state.photo_handler
        .upload(user.id, request, &original_filename, data)
        .await?;

    Ok(HttpResponse::Created().json(response))
}

#[route("/add_favorite/{photo_id}", method = "GET", method = "POST")]
#[instrument(skip_all, fields(user_id = user.id))]
pub async fn add_favorite(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let photo = state.photo_handler.set_favorite(user.id, path.into_inner(), true).await?;

    Ok(HttpResponse::Ok().json(PhotoActionResponse {
        message: "Photo added to favorites!".to_string(),
        photo: photo.into(),
    }))
}

#[route("/remove_favorite/{photo_id}", method = "GET", method = "POST")]
#[instrument(skip_all, fields(user_id = user.id))]
pub async fn remove_favorite(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let photo = state.photo_handler.set_favorite(user.id, path.into_inner(), false).await?;

    Ok(HttpResponse::Ok().json(PhotoActionResponse {
        message: "Photo removed from favorites!".to_string(),
        photo: photo.into(),
    }))
}

#[route("/delete_photo/{photo_id}", method = "GET", method = "POST")]
#[instrument(skip_all, fields(user_id = user.id))]
pub async fn delete_photo(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let photo = state.photo_handler.delete_photo(user.id, path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(PhotoActionResponse {
        message: "Photo deleted!".to_string(),
        photo: photo.into(),
    }))
}

#[get("/add_to_category/{photo_id}")]
#[instrument(skip_all, fields(user_id = user.id))]
pub async fn add_to_category_form(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let form = state.photo_handler.categories_form(user.id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(form))
}

#[post("/add_to_category/{photo_id}")]
#[instrument(skip_all, fields(user_id = user.id))]
pub async fn add_to_category(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<i64>,
    body: web::Json<AddToCategoryRequest>,
) -> Result<HttpResponse, AppError> {
    let report = state.photo_handler
        .add_categories(user.id, path.into_inner(), &body.category_ids)
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Photo added to categories!",
        "report": report,
    })))
}

#[get("/category/{category_id}")]
#[instrument(skip_all, fields(user_id = user.id))]
pub async fn category_photos(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let response = state.photo_handler.photos_by_category(user.id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[get("/images/{filename}")]
#[instrument(skip_all, fields(user_id = user.id))]
pub async fn image(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let bytes = state.photo_handler.open_image(user.id, &path).await?;

    let content_type = infer::get(&bytes)
        .map(|kind| kind.mime_type())
        .unwrap_or("application/octet-stream");

    Ok(HttpResponse::Ok().content_type(content_type).body(bytes))
}
