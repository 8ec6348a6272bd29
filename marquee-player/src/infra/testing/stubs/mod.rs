/// Scriptable media server
pub mod media_server;

pub use media_server::{ServerCall, TestMediaServer};
