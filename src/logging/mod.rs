//! Logging/telemetry support beyond what `main::init_tracing` sets up
//! directly — currently just [`secret_scrubbing`].

pub mod secret_scrubbing;

pub use secret_scrubbing::scrub_message;
