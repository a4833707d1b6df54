//! Cookie plumbing for multi-request session tests.

use axum::http::{HeaderValue, Request, Response, header};

/// The `name=value` part of the first `Set-Cookie` header, if any.
pub fn session_cookie<B>(response: &Response<B>) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|pair| pair.trim().to_owned())
}

/// Attach `cookie` (as returned by [`session_cookie`]) to `request`.
pub fn with_cookie<B>(mut request: Request<B>, cookie: &str) -> Request<B> {
    request
        .headers_mut()
        .insert(header::COOKIE, HeaderValue::from_str(cookie).unwrap());
    request
}
