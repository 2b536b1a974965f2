use axum::Json;
use utoipa::OpenApi;

use super::{health, leads, threads};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        threads::get_thread,
        threads::list_messages,
        leads::lead_datalist,
    ),
    components(schemas(health::HealthResponse, threads::ThreadResponse)),
    tags(
        (name = "health", description = "Service status"),
        (name = "threads", description = "Conversation threads"),
        (name = "leads", description = "Captured leads")
    )
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
