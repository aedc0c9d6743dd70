//! Paths on the configured API host.

use chatapp_net::{ApiRequest, CachePolicy, RequestExecutor, default_headers};
use serde_json::Value;

pub const FETCH_USER: &str = "/users";
pub const FETCH_MESSAGE: &str = "/messages";
/// Stores go to the same collection the fetch reads.
pub const STORE_MESSAGE: &str = "/messages";

/// GET against the executor's configured host with the default headers.
pub(crate) fn get(executor: &RequestExecutor, path: &str, cache_policy: Option<CachePolicy>) -> ApiRequest {
    let config = executor.config();
    let request = ApiRequest::get(&config.api_host, path)
        .with_headers(default_headers())
        .with_timeout(config.timeout());
    match cache_policy {
        Some(policy) => request.with_cache_policy(policy),
        None => request,
    }
}

pub(crate) fn post(executor: &RequestExecutor, path: &str, body: Value) -> ApiRequest {
    let config = executor.config();
    ApiRequest::post_json(&config.api_host, path, body)
        .with_headers(default_headers())
        .with_timeout(config.timeout())
}
