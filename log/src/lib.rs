use std::sync::Mutex;

use slog::Drain;
use slog::Fuse;
use slog_async::Async;
use slog_json::Json;

pub use slog::{debug, error, info, o, trace, warn, Logger};

/// Builds the root logger: newline-delimited JSON on stderr, drained
/// asynchronously, stamped with the build metadata. With the
/// `env_logging` feature the output is additionally filtered through
/// `RUST_LOG`.
pub fn initialize_logger() -> slog::Logger {
    let drain = Mutex::new(Json::default(std::io::stderr())).map(Fuse);
    let drain = Async::new(drain).build().fuse();

    #[cfg(feature = "env_logging")]
    let drain = slog_envlogger::new(drain).fuse();

    Logger::root(
        drain,
        o!("version" => info::VERSION, "revision" => info::REVISION, "build_timestamp" => info::BUILD_TIMESTAMP),
    )
}
