//! # kammer-observability
//!
//! Structured Logging fuer Relay und Clients via tracing-subscriber
//! (Text oder JSON, Level per `EnvFilter`).

pub mod logging;

pub use logging::{logging_initialisieren, LogFormat, LoggingEinstellungen, LoggingError};
