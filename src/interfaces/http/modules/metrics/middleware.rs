//! HTTP request metrics middleware

use std::time::Instant;

use axum::{body::Body, extract::MatchedPath, http::Request, middleware::Next, response::Response};

/// Records for every request:
///
/// - `hmis_http_requests_total` counter, labels `method`, `path`, `status`
/// - `hmis_http_request_duration_seconds` histogram, labels `method`, `path`
///
/// `path` is the matched route template (`/api/patients/{id}`), so ids do
/// not explode label cardinality.
pub async fn http_metrics_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().to_string();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|mp| mp.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let start = Instant::now();
    let response = next.run(request).await;
    let duration = start.elapsed().as_secs_f64();

    let status = response.status().as_u16().to_string();
    metrics::counter!(
        "hmis_http_requests_total",
        "method" => method.clone(),
        "path" => path.clone(),
        "status" => status
    )
    .increment(1);
    metrics::histogram!(
        "hmis_http_request_duration_seconds",
        "method" => method,
        "path" => path
    )
    .record(duration);

    response
}
