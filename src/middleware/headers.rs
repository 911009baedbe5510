// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Response header middleware.

use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
};

/// Edge caching for successful reads.
pub const CACHEABLE: &str = "public, s-maxage=300, stale-while-revalidate=1800";
pub const NO_STORE: &str = "no-store";

/// Add `nosniff` everywhere, and a `Cache-Control` that only lets
/// successful GETs be cached.
pub async fn add_response_headers(req: Request, next: Next) -> Response {
    let cacheable_method = *req.method() == Method::GET;
    let mut response = next.run(req).await;
    let cacheable = cacheable_method && response.status().is_success();
    let headers = response.headers_mut();

    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(if cacheable { CACHEABLE } else { NO_STORE }),
    );

    response
}
