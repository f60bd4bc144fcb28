use axum::http::StatusCode;

/// Liveness probe; says "OK" while the process is serving requests
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Process is alive", content_type = "text/plain", body = String)
    ),
    tag = "Health"
)]
pub async fn health() -> (StatusCode, &'static str) {
    (StatusCode::OK, "OK")
}
