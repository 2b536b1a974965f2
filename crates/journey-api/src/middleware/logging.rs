use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;

/// Request logging middleware
pub async fn log_request(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let start = Instant::now();

    let response = next.run(req).await;

    let status = response.status();
    if uri.path().starts_with("/ws/") {
        // Upgrades log here once; the session itself logs from the socket task.
        tracing::info!(method = %method, uri = %uri, status = %status, "WebSocket upgrade");
    } else {
        tracing::info!(
            method = %method,
            uri = %uri,
            status = %status,
            duration_ms = %start.elapsed().as_millis(),
            "Request processed"
        );
    }

    response
}
