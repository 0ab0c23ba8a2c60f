use std::env;

use actix_cors::Cors;
use actix_web::http::header;

const DEV_ORIGINS: [&str; 2] = ["http://localhost:5173", "http://127.0.0.1:5173"];

/// Parses `CORS_ALLOWED_ORIGINS`, keeping only http(s) origins.
fn allowed_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty() && *s != "null")
        .filter(|s| s.starts_with("http://") || s.starts_with("https://"))
        .map(str::to_string)
        .collect()
}

/// CORS for the browser client. Falls back to the local dev origins when
/// nothing valid is configured.
pub fn cors_middleware() -> Cors {
    let configured = allowed_origins(&env::var("CORS_ALLOWED_ORIGINS").unwrap_or_default());
    let origins = if configured.is_empty() {
        DEV_ORIGINS.iter().map(|s| s.to_string()).collect()
    } else {
        configured
    };

    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "OPTIONS"])
        .allowed_headers(vec![header::CONTENT_TYPE, header::ACCEPT])
        .max_age(3600);

    for origin in origins {
        cors = cors.allowed_origin(&origin);
    }

    cors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_only_http_origins() {
        let origins = allowed_origins(" https://play.example , null,,ftp://x, http://localhost:3000");
        assert_eq!(origins, vec!["https://play.example", "http://localhost:3000"]);
    }
}
