//! HTTP handlers and route configuration.

mod auth;
mod health;
mod posts;

use actix_web::web;

use crate::middleware::error::json_error_handler;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .service(
            web::scope("/api")
                // Public routes
                .route("/health", web::get().to(health::health_check))
                // Auth routes
                .service(
                    web::scope("/auth")
                        .route("/register", web::post().to(auth::register))
                        .route("/login", web::post().to(auth::login))
                        .route("/me", web::get().to(auth::me)),
                )
                // Post routes, all authenticated
                .service(
                    web::scope("/posts")
                        .route("", web::get().to(posts::index))
                        .route("", web::post().to(posts::store))
                        .route("/{id}", web::get().to(posts::show))
                        .route("/{id}", web::put().to(posts::update))
                        .route("/{id}", web::delete().to(posts::destroy)),
                ),
        );
}
