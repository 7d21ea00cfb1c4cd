use actix_web::{get, post, web, HttpResponse};
use tracing::instrument;

use crate::{
    entities::{category::NewCategory, form},
    errors::AppError,
    use_cases::extractors::CurrentUser,
    AppState,
};

#[get("/create_category")]
pub async fn create_category_form(_user: CurrentUser) -> HttpResponse {
    HttpResponse::Ok().json(form::category_form())
}

#[post("/create_category")]
#[instrument(skip_all, fields(user_id = user.id))]
pub async fn create_category(
    state: web::Data<AppState>,
    user: CurrentUser,
    body: web::Json<NewCategory>,
) -> Result<HttpResponse, AppError> {
    let response = state.category_handler
        .create_category(user.id, body.into_inner())
        .await?;

    Ok(HttpResponse::Created().json(response))
}
