use actix_web::web;
use crate::web::{handlers, pages};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(handlers::json_error))
        .service(
            web::scope("/api")
                .route("/ai", web::post().to(handlers::chat))
                .route("/contact", web::post().to(handlers::contact))
                .route("/contact/whatsapp", web::post().to(handlers::whatsapp))
                .route("/services-preview", web::get().to(handlers::services_preview))
                .route("/pricing-preview", web::get().to(handlers::pricing_preview))
        )
        .route("/", web::get().to(pages::index))
        .route("/about", web::get().to(pages::about))
        .route("/services", web::get().to(pages::services))
        .route("/pricing", web::get().to(pages::pricing))
        .route("/contact", web::get().to(pages::contact))
        .route("/privacy", web::get().to(pages::privacy))
        .route("/terms", web::get().to(pages::terms))
        .route("/sitemap.xml", web::get().to(pages::sitemap))
        .route("/robots.txt", web::get().to(pages::robots))
        .route("/health", web::get().to(handlers::health_check));
}
