//! In-process stand-ins for external services

/// Recording service doubles
pub mod stubs;
