//! Logging Infrastructure
//!
//! `RUST_LOG` wins over the configured level. With a log directory the
//! output goes to a daily rolling file instead of stdout.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const DEFAULT_DIRECTIVES: &str = "dine_server=info,tower_http=info";

/// Initialize the logger to stdout
pub fn init_logger() {
    // stdout logging never yields a guard
    let _ = init_logger_with_file(None, false, None);
}

/// Initialize the logger with optional JSON formatting and file output.
///
/// The returned guard flushes the file writer on drop and must live as long
/// as the process.
pub fn init_logger_with_file(
    log_level: Option<&str>,
    json: bool,
    log_dir: Option<&str>,
) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let directives = match log_level {
            Some(level) => format!("dine_server={level},tower_http={level}"),
            None => DEFAULT_DIRECTIVES.to_string(),
        };
        EnvFilter::new(directives)
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(true);

    if let Some(dir) = log_dir {
        let log_path = Path::new(dir);
        if std::fs::create_dir_all(log_path).is_ok() {
            let file_appender = tracing_appender::rolling::daily(log_path, "dine-server");
            let (writer, guard) = tracing_appender::non_blocking(file_appender);
            let builder = builder.with_writer(writer).with_ansi(false);
            let installed = if json {
                builder.json().try_init()
            } else {
                builder.try_init()
            };
            if installed.is_err() {
                eprintln!("logger already initialized");
            }
            return Some(guard);
        }
        eprintln!("cannot create log directory {dir}, logging to stdout");
    }

    let installed = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if installed.is_err() {
        eprintln!("logger already initialized");
    }
    None
}
