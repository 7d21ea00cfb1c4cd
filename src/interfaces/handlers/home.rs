use actix_web::{get, routes, web, HttpResponse};
use tracing::instrument;

use crate::{errors::AppError, use_cases::extractors::CurrentUser, AppState};

#[routes]
#[get("/")]
#[get("/home")]
#[instrument(skip_all, fields(user_id = user.id))]
pub async fn home(state: web::Data<AppState>, user: CurrentUser) -> Result<HttpResponse, AppError> {
    let gallery = state.photo_handler.gallery(user.id).await?;
    Ok(HttpResponse::Ok().json(gallery))
}

#[get("/favorite")]
#[instrument(skip_all, fields(user_id = user.id))]
pub async fn favorites(state: web::Data<AppState>, user: CurrentUser) -> Result<HttpResponse, AppError> {
    let photos = state.photo_handler.favorites(user.id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "photos": photos })))
}
