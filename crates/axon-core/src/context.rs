/// Runtime context for a single inbound request
///
/// Carried from the server middleware into the chat flow so the backend
/// client can see the original request metadata.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// HTTP request parts (method, URI, headers, extensions)
    pub parts: http::request::Parts,
}

impl RequestContext {
    /// Create a minimal context for embedded (non-HTTP) use
    ///
    /// Contains empty headers and a placeholder URI. Used by tests and
    /// library consumers that drive the chat flow directly.
    #[must_use]
    pub fn empty() -> Self {
        let (parts, ()) = http::Request::builder()
            .method(http::Method::GET)
            .uri("/")
            .body(())
            .expect("valid minimal request")
            .into_parts();

        Self { parts }
    }

    /// Access request headers
    #[must_use]
    pub fn headers(&self) -> &http::HeaderMap {
        &self.parts.headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_context_has_no_headers() {
        let ctx = RequestContext::empty();
        assert!(ctx.headers().is_empty());
    }
}
