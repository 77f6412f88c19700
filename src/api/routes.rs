// src/api/routes.rs
use actix_web::web;
use crate::api::handlers;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .route("/health", web::get().to(handlers::health_check))
            .route("/setup", web::get().to(handlers::get_setup))
            .route("/setup", web::post().to(handlers::setup))
            // Scripts
            .route("/scripts/templates", web::get().to(handlers::list_templates))
            .route("/scripts/purposes", web::get().to(handlers::list_purposes))
            .route("/scripts/generate", web::post().to(handlers::generate_script))
            .route("/scripts", web::get().to(handlers::list_scripts))
            .route("/scripts", web::post().to(handlers::save_script))
            .route("/scripts/{name}", web::get().to(handlers::get_script))
            // Calls
            .route("/calls", web::get().to(handlers::list_active_calls))
            .route("/calls", web::post().to(handlers::initiate_call))
            .route("/calls/{call_id}", web::get().to(handlers::call_status))
            .route("/calls/{call_id}/transcript", web::get().to(handlers::call_transcript))
            .route("/calls/{call_id}/turns", web::post().to(handlers::append_turn))
            .route("/calls/{call_id}/end", web::post().to(handlers::end_call))
            // Provider progress events
            .route("/calls/{call_id}/activate", web::post().to(handlers::activate_call))
            .route("/calls/{call_id}/fail", web::post().to(handlers::fail_call))
            // Analytics
            .route("/analytics", web::get().to(handlers::analytics))
            .route("/history", web::get().to(handlers::call_history))
            .route("/history/export", web::get().to(handlers::export_history))
    );
}
