use actix_web::{web, App, HttpServer};
use nightfall_backend::config::ServerConfig;
use nightfall_backend::routes;
use nightfall_backend::telemetry;
use nightfall_backend::{cors_middleware, AppState, RequestLog};
use tracing::info;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    telemetry::init_tracing();

    // Environment variables must be set by the runtime environment:
    // - Docker: env_file / --env-file
    // - Local dev: source an env file manually (set -a; . ./.env; set +a)
    let server = match ServerConfig::from_env() {
        Ok(server) => server,
        Err(e) => {
            eprintln!("❌ {e}");
            std::process::exit(1);
        }
    };

    let app_state = match AppState::from_env() {
        Ok(state) => state,
        Err(e) => {
            eprintln!("❌ Failed to build application state: {e}");
            std::process::exit(1);
        }
    };

    info!(
        host = %server.host,
        port = server.port,
        players = app_state.config.player_count,
        decision_provider = app_state.backend.name(),
        "Starting Nightfall backend"
    );

    let data = web::Data::new(app_state);

    HttpServer::new(move || {
        App::new()
            .wrap(cors_middleware())
            .wrap(RequestLog)
            .app_data(data.clone())
            .configure(routes::configure)
    })
    .bind((server.host.as_str(), server.port))?
    .run()
    .await
}
