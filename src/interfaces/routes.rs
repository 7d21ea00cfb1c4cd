use actix_web::web;

mod auth;
mod gallery;
mod json_error;

pub use json_error::multipart_config;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(crate::handlers::system::health_check);

    cfg.configure(auth::config_routes)
        .configure(gallery::config_routes)
        .configure(json_error::config_routes);
}
