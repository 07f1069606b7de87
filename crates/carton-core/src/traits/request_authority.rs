// # Request Authority Trait
//
// Remote source of truth for requests that cannot be built locally.
//
// ## Implementations
//
// - HTTP: `carton-api-http` crate (`GET /requests/{id}`)
//
// ## Contract
//
// An authority performs exactly one fetch per call and hands back the raw
// response body. Decoding the `{"Results": ...}` envelope happens in the
// resolver so that every authority shares the same decode path.
//
// Authorities must not:
// - retry or back off (a failure is returned to the caller as is)
// - cache responses between calls
// - fall back to building the request from the payload

use async_trait::async_trait;

/// Trait for remote request authorities
#[async_trait]
pub trait RequestAuthority: Send + Sync {
    /// Fetch the raw body of request `id`
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<u8>)`: The full response body
    /// - `Err(Error)`: Connect, status or read failure
    async fn fetch_request(&self, id: &str) -> Result<Vec<u8>, crate::Error>;

    /// Authority name (for logging)
    fn authority_name(&self) -> &'static str;
}
