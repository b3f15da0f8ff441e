//! Request middleware.
//!
//! - [`api_key::require_api_key`] -- Resolves the calling [`api_key::ApiClient`]
//!   from the `X-API-Key` header or `api_key` query parameter.

pub mod api_key;
