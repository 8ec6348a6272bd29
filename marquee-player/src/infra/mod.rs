/// HTTP client for the media server
pub mod api_client;
pub mod api_types;
pub mod constants;
pub mod runtime_config;
/// Service traits and their production adapters
pub mod services;

#[cfg(any(test, feature = "testing"))]
pub mod testing;
