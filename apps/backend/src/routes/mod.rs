use actix_web::web;

pub mod config;
pub mod health;
pub mod realtime;

/// Registers every HTTP and WebSocket route.
///
/// `main.rs` adds CORS on top; tests call this directly.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(health::root));
    cfg.configure(health::configure_routes);
    cfg.service(web::scope("/api").configure(config::configure_routes));
    cfg.configure(realtime::configure_routes);
}
