use std::sync::Arc;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axon_ratelimit::{RateLimitError, RequestLimiter};
use http::StatusCode;

/// Rate limiting middleware
pub async fn rate_limit_middleware(limiter: Arc<RequestLimiter>, request: Request, next: Next) -> Response {
    if let Err(e) = limiter.check_global() {
        return rate_limit_response(&e);
    }

    if let Some(ip) = extract_client_ip(&request)
        && let Err(e) = limiter.check_ip(&ip)
    {
        return rate_limit_response(&e);
    }

    next.run(request).await
}

fn extract_client_ip(request: &Request) -> Option<String> {
    // X-Forwarded-For carries the original client first
    if let Some(forwarded) = request.headers().get("x-forwarded-for")
        && let Ok(val) = forwarded.to_str()
        && let Some(first) = val.split(',').next()
    {
        return Some(first.trim().to_string());
    }

    if let Some(real_ip) = request.headers().get("x-real-ip")
        && let Ok(val) = real_ip.to_str()
    {
        return Some(val.trim().to_string());
    }

    None
}

fn rate_limit_response(error: &RateLimitError) -> Response {
    match error {
        RateLimitError::Exceeded { retry_after } => {
            let body = serde_json::json!({
                "error": {
                    "type": "rate_limit_error",
                    "message": format!("rate limit exceeded, retry after {retry_after}s"),
                }
            });

            let mut response = (StatusCode::TOO_MANY_REQUESTS, axum::Json(body)).into_response();

            if let Ok(val) = retry_after.to_string().parse() {
                response.headers_mut().insert("retry-after", val);
            }

            response
        }
        RateLimitError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "rate limiter error").into_response(),
    }
}
