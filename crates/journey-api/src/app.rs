use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    services::ServeDir,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{
    config::Config,
    middleware::logging,
    routes::{health, leads, openapi, pages, threads},
    state::AppState,
    ws::socket,
};

pub fn build_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        // Pages
        .route("/", get(pages::chat_page))
        .route("/leads_generated", get(pages::leads_page))
        // Leads
        .route("/get_lead_datalist", get(leads::lead_datalist))
        // Health
        .route("/health", get(health::health_check))
        // Threads
        .route("/threads/:thread_id", get(threads::get_thread))
        .route("/threads/:thread_id/messages", get(threads::list_messages))
        // Docs
        .route("/api/openapi.json", get(openapi::openapi_json))
        .nest_service("/assets", ServeDir::new(&state.config.paths.assets_dir));

    // No request timeout on upgrades.
    let ws_routes = Router::new().route("/ws/:handler/:user_id/:thread_id", get(socket::ws_handler));

    let timeout = Duration::from_secs(state.config.server.request_timeout_secs);

    Router::new()
        .merge(api_routes.layer(TimeoutLayer::new(timeout)).layer(CompressionLayer::new()))
        .merge(ws_routes)
        .layer(middleware::from_fn(logging::log_request))
        .layer(build_cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn build_cors_layer(config: &Config) -> CorsLayer {
    if !config.cors.enabled {
        return CorsLayer::permissive();
    }

    let cors = CorsLayer::new()
        .allow_methods([axum::http::Method::GET, axum::http::Method::OPTIONS])
        .allow_headers(Any);

    if config.cors.origins.iter().any(|o| o == "*") {
        cors.allow_origin(Any)
    } else {
        let origins: Vec<axum::http::HeaderValue> = config
            .cors
            .origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        cors.allow_origin(origins)
    }
}

pub fn init_logging(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    match config.logging.format.as_str() {
        "json" => {
            registry.with(tracing_subscriber::fmt::layer().json()).init();
        }
        _ => {
            registry.with(tracing_subscriber::fmt::layer().pretty()).init();
        }
    }
}
