use log::LevelFilter;

/// Install the global logger. `RUST_LOG` overrides `default_level`.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logger(default_level: LevelFilter) {
    let result = env_logger::Builder::new()
        .filter_level(default_level)
        .parse_default_env()
        .format_timestamp_millis()
        .try_init();
    if result.is_ok() {
        log::debug!("logger initialized at {}", default_level);
    }
}
