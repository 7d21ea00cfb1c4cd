use actix_web::web;

use crate::handlers::{categories, home, photos};

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(home::home)
        .service(home::favorites)
        .service(photos::upload_form)
        .service(photos::upload)
        .service(photos::add_favorite)
        .service(photos::remove_favorite)
        .service(photos::delete_photo)
        .service(photos::add_to_category_form)
        .service(photos::add_to_category)
        .service(photos::category_photos)
        .service(photos::image)
        .service(categories::create_category_form)
        .service(categories::create_category);
}
