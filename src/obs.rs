//! Tracing initialization for the relay process.

// crates.io
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` takes precedence; otherwise the relay logs at `info`. Repeated calls are
/// harmless, which keeps test binaries free to initialize eagerly.
pub fn init_tracing() {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
	let _ = tracing_subscriber::registry().with(filter).with(fmt::layer()).try_init();
}
