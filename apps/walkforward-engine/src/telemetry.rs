//! Tracing Setup
//!
//! Console logging through `tracing-subscriber`.
//!
//! # Configuration
//!
//! - `RUST_LOG`: filter directives (default: `info`)
//! - `NO_COLOR`: set to disable ANSI colors
//!
//! # Usage
//!
//! ```rust,ignore
//! use walkforward_engine::telemetry::init_tracing;
//!
//! fn main() {
//!     init_tracing();
//!     // ... application code
//! }
//! ```

use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber.
///
/// Logs go to stderr so stdout stays free for the report. Calling this more
/// than once is harmless; later calls leave the first subscriber in place.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let ansi = std::env::var_os("NO_COLOR").is_none();

    let result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(ansi)
        .try_init();

    if result.is_ok() {
        tracing::debug!(ansi, "Tracing initialized");
    }
}
