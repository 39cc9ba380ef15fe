//! Logging utilities and structured logging support

pub use log::{debug, error, info, trace, warn, LevelFilter};

/// Initialize the logging system at `Info`, overridable through `RUST_LOG`
///
/// Safe to call more than once; later calls are ignored.
pub fn init() {
    init_with_level(LevelFilter::Info);
}

/// Initialize the logging system with a default level
///
/// `RUST_LOG` still takes precedence over `level`.
pub fn init_with_level(level: LevelFilter) {
    let _ = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp_millis()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init_with_level(LevelFilter::Debug);
        init();
        debug!("logging initialised twice without panicking");
    }
}
