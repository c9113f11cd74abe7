//! Subscriber setup for the `citymap` binary.
use tracing_subscriber::{fmt, EnvFilter};

/// Installs a stderr `fmt` subscriber.
///
/// `RUST_LOG` wins when set; otherwise `info` when verbose and `warn` when
/// quiet. Calling this more than once is harmless.
pub fn init(verbose: bool) {
  let default_level = if verbose { "info" } else { "warn" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

  let _ = fmt()
    .with_env_filter(filter)
    .with_target(false)
    .with_writer(std::io::stderr)
    .try_init();
}
