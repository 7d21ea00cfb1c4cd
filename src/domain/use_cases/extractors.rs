use actix_web::{FromRequest, HttpMessage, HttpRequest};
use futures_util::future::{ready, Ready};
use crate::{entities::token::Claims, errors::AppError};

/// The authenticated caller, resolved by the auth middleware from the session token.
/// Handlers take this instead of reading any global "current user".
/// Returns 401 if the request carries no valid session.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i64,
    pub username: String,
}

impl TryFrom<&Claims> for CurrentUser {
    type Error = AppError;

    fn try_from(claims: &Claims) -> Result<Self, Self::Error> {
        let id = claims.sub.parse::<i64>().map_err(|_| AppError::UnauthorizedAccess)?;
        Ok(CurrentUser {
            id,
            username: claims.username.clone(),
        })
    }
}

impl FromRequest for CurrentUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let user = match req.extensions().get::<Claims>() {
            Some(claims) => CurrentUser::try_from(claims),
            None => Err(AppError::UnauthorizedAccess),
        };
        ready(user.map_err(Into::into))
    }
}
