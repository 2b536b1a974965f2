pub mod app;
pub mod chat;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod ws;

pub use app::{build_router, init_logging};
pub use config::Config;
pub use state::AppState;
