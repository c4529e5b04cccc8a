//! REST API client module for the unichess backend.
//!
//! This module provides the `ApiClient` for logging in and for
//! user-account requests. Login returns an opaque bearer token that later
//! requests carry in the `Authorization` header.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::{ApiError, MALFORMED_RESPONSE_MESSAGE, NETWORK_ERROR_MESSAGE};
