// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Middleware modules (trigger authentication, response headers).

pub mod headers;
pub mod trigger_auth;

pub use headers::add_response_headers;
pub use trigger_auth::require_trigger_token;
