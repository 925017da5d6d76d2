//! Tracing subscriber setup for the node.
//!
//! Output goes to stderr so stdout stays clean for `keygen` output piped
//! into other tooling. The format enum lives with the CLI definition; this
//! module only wires the subscriber.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::LogFormat;

/// Installs the global subscriber. `default_directives` applies when
/// `RUST_LOG` is unset. Panics if called twice.
pub fn init_logging(default_directives: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_line_number(true),
            )
            .init(),
    }

    tracing::info!(?format, "logging initialized");
}
