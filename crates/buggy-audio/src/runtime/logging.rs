use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Used when `RUST_LOG` is unset. Structural edits and possession changes
/// in the engine-sound crate log at debug.
pub const DEFAULT_LOG_FILTER: &str = "info,buggy_audio=debug,engine_sound=debug";

/// Initialize the tracing subscriber with optional JSON output.
///
/// `log` records from the engine-sound crate are forwarded into the same
/// subscriber.
pub fn init_tracing(json_output: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    if json_output {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().pretty())
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_enables_library_debug() {
        assert!(EnvFilter::try_new(DEFAULT_LOG_FILTER).is_ok());
        assert!(DEFAULT_LOG_FILTER
            .split(',')
            .any(|directive| directive == "engine_sound=debug"));
    }
}
