//! Ambient HTTP middleware: request timing, security headers, a body-size
//! guard, and a CORS preflight responder. No auth/2FA/rate-limit layers -
//! this crate trusts the already-authenticated `X-User-ID` header
//! rather than implementing a session of its own.

use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::time::Instant;

use crate::error::ApiError;

/// Logs any request that takes longer than a second; everything else is
/// logged at `debug`.
pub async fn timing_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let uri = req.uri().clone();

    let response = next.run(req).await;

    let elapsed = start.elapsed();
    if elapsed.as_millis() > 1000 {
        tracing::warn!(method = %method, uri = %uri, elapsed_ms = elapsed.as_millis(), "slow request detected");
    } else {
        tracing::debug!(
            method = %method,
            uri = %uri,
            elapsed_ms = elapsed.as_millis(),
            status = response.status().as_u16(),
            "request completed"
        );
    }

    response
}

pub async fn body_limit_middleware(req: Request, next: Next, max_size: usize) -> Result<Response, Response> {
    if let Some(content_length) = req.headers().get("content-length") {
        if let Ok(length_str) = content_length.to_str() {
            if let Ok(length) = length_str.parse::<usize>() {
                if length > max_size {
                    return Err(
                        ApiError::new(
                            StatusCode::PAYLOAD_TOO_LARGE,
                            "PAYLOAD_TOO_LARGE",
                            format!("request body too large, maximum size is {max_size} bytes"),
                        )
                        .into_response(),
                    );
                }
            }
        }
    }

    Ok(next.run(req).await)
}

pub async fn security_headers_middleware(req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    headers.insert("X-Content-Type-Options", "nosniff".parse().unwrap());
    headers.insert("X-Frame-Options", "DENY".parse().unwrap());
    headers.insert("X-XSS-Protection", "1; mode=block".parse().unwrap());
    headers.insert("Referrer-Policy", "strict-origin-when-cross-origin".parse().unwrap());
    headers.insert("Cache-Control", "no-store, no-cache, must-revalidate".parse().unwrap());
    headers.insert("Pragma", "no-cache".parse().unwrap());

    response
}
