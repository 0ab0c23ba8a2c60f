use actix_web::{web, HttpResponse};
use serde::Serialize;

use crate::config::GameConfig;
use crate::domain::Role;
use crate::error::AppError;
use crate::state::app_state::AppState;

#[derive(Serialize)]
struct RoleInfo {
    role: Role,
    name: &'static str,
    description: &'static str,
    count: u8,
}

#[derive(Serialize)]
struct ConfigResponse<'a> {
    #[serde(flatten)]
    game: &'a GameConfig,
    roles: Vec<RoleInfo>,
}

/// Settings new sessions start with, plus the role table.
async fn game_config(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let config = &app_state.config;
    let roles = Role::ALL
        .iter()
        .map(|role| RoleInfo {
            role: *role,
            name: role.display_name(),
            description: role.description(),
            count: config.role_counts.count(*role),
        })
        .collect();

    Ok(HttpResponse::Ok().json(ConfigResponse {
        game: config,
        roles,
    }))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/config", web::get().to(game_config));
}
