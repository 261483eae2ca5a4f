//! Photodrop Infrastructure Library
//!
//! Shared process-level infrastructure for Photodrop binaries. Currently this is the
//! tracing subscriber setup.

pub mod telemetry;

pub use telemetry::{init_telemetry, shutdown_telemetry};
