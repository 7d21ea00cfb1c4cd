use actix_web::{
    cookie::{time::Duration, Cookie, SameSite},
    get, http::header, post, web, HttpRequest, HttpResponse,
};
use serde::Deserialize;
use tracing::instrument;

use crate::constants::SESSION_COOKIE;
use crate::entities::{form, token::IssuedToken, user::{LoginUser, NewUser}};
use crate::errors::{AppError, AuthError};
use crate::middlewares::auth::session_token;
use crate::use_cases::extractors::CurrentUser;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

/// Only local paths are followed after login; anything else lands on the home page.
fn redirect_target(next: Option<&str>) -> String {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.starts_with("/\\") => {
            path.to_string()
        }
        _ => "/home".to_string(),
    }
}

fn see_other_home() -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, "/home"))
        .finish()
}

fn session_cookie(issued: &IssuedToken, remember: bool, secure: bool) -> Cookie<'static> {
    let mut builder = Cookie::build(SESSION_COOKIE, issued.token.clone())
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure);

    // without max-age the cookie dies with the browser session
    if remember {
        builder = builder.max_age(Duration::seconds(issued.lifetime_secs));
    }

    builder.finish()
}

#[get("/register")]
pub async fn register_form(user: Option<CurrentUser>) -> HttpResponse {
    if user.is_some() {
        return see_other_home();
    }
    HttpResponse::Ok().json(form::register_form())
}

#[post("/register")]
#[instrument(skip_all)]
pub async fn register(
    state: web::Data<AppState>,
    user: Option<CurrentUser>,
    body: web::Json<NewUser>,
) -> Result<HttpResponse, AppError> {
    if user.is_some() {
        return Ok(see_other_home());
    }

    let response = state.auth_handler.register(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(response))
}

#[get("/login")]
pub async fn login_form(user: Option<CurrentUser>) -> HttpResponse {
    if user.is_some() {
        return see_other_home();
    }
    HttpResponse::Ok().json(form::login_form())
}

#[post("/login")]
#[instrument(skip_all)]
pub async fn login(
    state: web::Data<AppState>,
    user: Option<CurrentUser>,
    query: web::Query<NextQuery>,
    body: web::Json<LoginUser>,
) -> Result<HttpResponse, AuthError> {
    if user.is_some() {
        return Ok(see_other_home());
    }

    let request = body.into_inner();
    let remember = request.remember;
    let (mut response, issued) = state.auth_handler.login(request).await?;
    response.redirect_to = redirect_target(query.next.as_deref());

    Ok(HttpResponse::Ok()
        .cookie(session_cookie(&issued, remember, state.secure_cookies))
        .json(response))
}

#[get("/logout")]
#[instrument(skip_all)]
pub async fn logout(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AuthError> {
    let token = session_token(&req);
    state.auth_handler.logout(token.as_deref()).await?;

    let mut removal = Cookie::build(SESSION_COOKIE, "").path("/").finish();
    removal.make_removal();

    Ok(HttpResponse::Ok()
        .cookie(removal)
        .json(serde_json::json!({
            "message": "You have been logged out.",
            "redirect_to": "/login"
        })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_must_be_a_local_path() {
        assert_eq!(redirect_target(Some("/favorite")), "/favorite");
        assert_eq!(redirect_target(Some("//evil.example")), "/home");
        assert_eq!(redirect_target(Some("/\\evil.example")), "/home");
        assert_eq!(redirect_target(Some("/category/3")), "/category/3");
        assert_eq!(redirect_target(Some("https://evil.example")), "/home");
        assert_eq!(redirect_target(None), "/home");
    }
}
