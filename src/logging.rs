use {
	std::io,
	tracing_subscriber::{fmt, EnvFilter},
};

/// Installs the stderr subscriber. `RUST_LOG` wins over `verbosity` (0 = info, 1 = debug, 2+ = trace).
pub fn initLogging(verbosity: u8) {
	let level = match verbosity {
		0 => "info",
		1 => "debug",
		_ => "trace",
	};
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
	// A second call (as in tests) keeps the first subscriber.
	_ = fmt().with_env_filter(filter).with_target(false).with_writer(io::stderr).try_init();
}
