use axum::{extract::State, response::Html};
use std::path::Path;
use std::sync::Arc;

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

/// Chat page with company and assistant names filled in.
pub async fn chat_page(State(state): State<Arc<AppState>>) -> ApiResult<Html<String>> {
    let template = read_asset(&state.config.paths.assets_dir, "chat.html").await?;
    let chat = &state.config.chat;
    Ok(Html(
        template
            .replace("@@@company_name@@@", &chat.company_name)
            .replace("@@@chatbot_name@@@", &chat.chatbot_name)
            .replace("@@@company_moto@@@", &chat.company_motto),
    ))
}

pub async fn leads_page(State(state): State<Arc<AppState>>) -> ApiResult<Html<String>> {
    Ok(Html(
        read_asset(&state.config.paths.assets_dir, "leads_generated.html").await?,
    ))
}

async fn read_asset(dir: &Path, name: &str) -> ApiResult<String> {
    match tokio::fs::read_to_string(dir.join(name)).await {
        Ok(content) => Ok(content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(ApiError::AssetNotFound(name.to_string())),
        Err(e) => Err(e.into()),
    }
}
