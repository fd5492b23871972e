/// Initialise `env_logger`. `RUST_LOG` wins; otherwise `info`, or `debug` with `--verbose`.
pub fn init(verbose: bool) {
    let default_level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    let mut builder = env_logger::Builder::new();
    builder.filter_level(default_level).format_timestamp(None);
    if let Ok(spec) = std::env::var("RUST_LOG") {
        builder.parse_filters(&spec);
    }
    // A second init (tests, embedding) is not an error worth surfacing.
    let _ = builder.try_init();
}
