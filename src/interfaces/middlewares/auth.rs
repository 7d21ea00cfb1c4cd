use actix_web::{
    body::BoxBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    web, Error, HttpMessage, HttpRequest, ResponseError,
};
use futures_util::future::{ok, Ready, LocalBoxFuture};
use std::{rc::Rc, task::{Context, Poll}};

use crate::{constants::SESSION_COOKIE, errors::{AppError, AuthError}, AppState};

/// Resolves the session token into `Claims` for every request and turns away
/// anonymous callers on everything but the public routes.
pub struct AuthMiddleware;

impl<S> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error> + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(AuthMiddlewareService {
            service: Rc::new(service),
        })
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
}

impl<S> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error> + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            let public = is_public_route(req.path(), req.method().as_str());

            let Some(state) = req.app_data::<web::Data<AppState>>().cloned() else {
                tracing::error!("AppState missing in middleware");
                let res = AuthError::SessionStore("application state missing".into()).error_response();
                return Ok(req.into_response(res));
            };

            // bad, expired and revoked tokens all count as "not logged in"
            let claims = match session_token(req.request()) {
                Some(token) => match state.auth_handler.authenticate(&token).await {
                    Ok(claims) => Some(claims),
                    Err(AuthError::SessionStore(e)) => {
                        tracing::error!("Session store unavailable, treating request as anonymous: {}", e);
                        None
                    }
                    Err(e) => {
                        tracing::debug!("Ignoring session token: {}", e);
                        None
                    }
                },
                None => None,
            };

            match claims {
                Some(claims) => {
                    req.extensions_mut().insert(claims);
                }
                None if !public => {
                    tracing::warn!("Anonymous request to protected path {}", req.path());
                    let res = AppError::UnauthorizedAccess.error_response();
                    return Ok(req.into_response(res));
                }
                None => {}
            }

            service.call(req).await
        })
    }
}

fn is_public_route(path: &str, method: &str) -> bool {
    if method == "OPTIONS" {
        return true;
    }

    matches!(path, "/register" | "/login" | "/logout" | "/health")
}

/// Session token from `Authorization: Bearer`, falling back to the session cookie.
pub fn session_token(req: &HttpRequest) -> Option<String> {
    let bearer = req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|header| {
            let parts: Vec<&str> = header.split_whitespace().collect();
            if parts.len() == 2 && parts[0].eq_ignore_ascii_case("bearer") {
                Some(parts[1].to_string())
            } else {
                None
            }
        });

    bearer.or_else(|| {
        req.cookie(SESSION_COOKIE)
            .map(|cookie| cookie.value().to_string())
            .filter(|value| !value.is_empty())
    })
}
