use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use axon_core::RequestContext;

/// Middleware that attaches a `RequestContext` to the request
///
/// Captures the HTTP parts so downstream handlers and the backend client
/// can see the original request metadata.
pub async fn request_context_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();

    let context = RequestContext { parts: parts.clone() };

    let mut request = Request::from_parts(parts, body);
    request.extensions_mut().insert(context);

    next.run(request).await
}
