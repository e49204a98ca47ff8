//! # Observability Infrastructure
//!
//! Structured logging for the translation helpers.

pub mod logging;

pub use logging::init_logging;
