use std::fmt;

use tracing_subscriber::{
    EnvFilter,
    fmt::{format::Writer, time::FormatTime},
};

use crate::models::config::Verbosity;

/// Local wall-clock timestamp, e.g. `2026-Oct-16 14:03:22`.
struct LocalTimestamp;

impl FormatTime for LocalTimestamp {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        write!(w, "{}", chrono::Local::now().format("%Y-%b-%d %H:%M:%S"))
    }
}

pub struct LoggerUtils {}

impl LoggerUtils {
    pub fn init(verbosity: Verbosity) {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env() // RUST_LOG still refines per target
                    .add_directive(verbosity.level().into()),
            )
            .with_writer(std::io::stderr)
            .with_timer(LocalTimestamp)
            .with_target(false)
            .with_level(true)
            .compact()
            .init();
    }
}
