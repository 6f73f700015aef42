use axum::{
    body::{Bytes, to_bytes},
    extract::Request,
    http::{HeaderMap, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{
    error::AppError,
    response::{JsonApiResponse, log_app_error},
};

const MAX_ERROR_BODY_BYTES: usize = 16 * 1024;

/// Rewrites plain-text error bodies (extractor rejections, unknown routes)
/// into the JSON envelope. JSON bodies and browser requests pass through.
pub async fn json_error_middleware(req: Request, next: Next) -> Response {
    let wants_html = header_contains(req.headers(), header::ACCEPT, &["text/html"]);
    let response = next.run(req).await;

    let status = response.status();
    if !status.is_client_error() && !status.is_server_error() {
        return response;
    }
    if wants_html
        || header_contains(
            response.headers(),
            header::CONTENT_TYPE,
            &["application/json", "+json", "text/html"],
        )
    {
        return response;
    }

    let (parts, body) = response.into_parts();
    let message = match to_bytes(body, MAX_ERROR_BODY_BYTES).await {
        Ok(bytes) => message_from_body(status, bytes),
        Err(_) => default_message(status),
    };
    let err = error_for_status(status, message);
    if status.is_server_error() {
        log_app_error(&err, status);
    }

    let mut rewritten = JsonApiResponse::from_error(&err).into_response();
    for (name, value) in &parts.headers {
        if name != header::CONTENT_TYPE && name != header::CONTENT_LENGTH {
            rewritten.headers_mut().append(name.clone(), value.clone());
        }
    }
    rewritten
}

fn header_contains(headers: &HeaderMap, name: header::HeaderName, needles: &[&str]) -> bool {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(|value| {
            let value = value.to_ascii_lowercase();
            needles.iter().any(|needle| value.contains(needle))
        })
        .unwrap_or(false)
}

fn message_from_body(status: StatusCode, bytes: Bytes) -> String {
    let message = String::from_utf8_lossy(&bytes).trim().to_string();
    if message.is_empty() {
        default_message(status)
    } else {
        message
    }
}

fn default_message(status: StatusCode) -> String {
    status
        .canonical_reason()
        .unwrap_or("Request failed")
        .to_string()
}

fn error_for_status(status: StatusCode, message: String) -> AppError {
    match status {
        StatusCode::UNAUTHORIZED => AppError::unauthorized(message),
        StatusCode::FORBIDDEN => AppError::forbidden(message),
        StatusCode::NOT_FOUND => AppError::not_found(message),
        StatusCode::CONFLICT => AppError::conflict(message),
        _ if status.is_client_error() => AppError::bad_request(message),
        _ => AppError::internal(message),
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        Router,
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
        middleware,
        routing::get,
    };
    use tower::ServiceExt;

    use super::json_error_middleware;

    fn app() -> Router {
        Router::new()
            .route("/teapot", get(|| async { (StatusCode::IM_A_TEAPOT, "short and stout") }))
            .layer(middleware::from_fn(json_error_middleware))
    }

    #[tokio::test]
    async fn plain_text_errors_become_json() {
        let response = app()
            .oneshot(Request::get("/teapot").body(Body::empty()).expect("request should build"))
            .await
            .expect("request should be served");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should read");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("body should be json");
        assert_eq!(json["message"], "short and stout");
        assert_eq!(json["status"], 400);
    }

    #[tokio::test]
    async fn browser_requests_are_left_alone() {
        let response = app()
            .oneshot(
                Request::get("/missing")
                    .header(header::ACCEPT, "text/html")
                    .body(Body::empty())
                    .expect("request should build"),
            )
            .await
            .expect("request should be served");

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.headers().get(header::CONTENT_TYPE).is_none());
    }
}
