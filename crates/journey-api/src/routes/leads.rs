use axum::{extract::State, Json};
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::{error::ApiResult, state::AppState};

/// Every stored lead summary
#[utoipa::path(
    get,
    path = "/get_lead_datalist",
    responses(
        (status = 200, description = "Lead summaries ordered by lead key")
    ),
    tag = "leads"
)]
pub async fn lead_datalist(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Map<String, Value>>>> {
    Ok(Json(state.leads.leads().await?))
}
