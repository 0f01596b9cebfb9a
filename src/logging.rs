use std::path::PathBuf;
use std::sync::OnceLock;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Builds the level filter. Without debug logging the level is forced to
/// `info` even if `RUST_LOG` is set; with it, `RUST_LOG` may override the
/// `debug` default.
pub fn build_filter(debug: bool) -> EnvFilter {
    if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::new("info")
    }
}

/// Initialise logging, writing to `log_file` when given and to stderr
/// otherwise. Returns `false` if a global subscriber was already installed.
pub fn init(debug: bool, log_file: Option<PathBuf>) -> bool {
    let filter = build_filter(debug);

    let Some(path) = log_file else {
        return tracing_subscriber::fmt()
            .with_env_filter(filter)
            .try_init()
            .is_ok();
    };

    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    let file_name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| "roof_sketch.log".into());
    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(writer)
        .try_init()
        .is_ok();
    if installed {
        let _ = LOG_GUARD.set(guard);
    }
    installed
}
