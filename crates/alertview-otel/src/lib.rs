use once_cell::sync::OnceCell;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::{
    fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
    EnvFilter,
};

static FILE_GUARD: OnceCell<tracing_appender::non_blocking::WorkerGuard> = OnceCell::new();

/// Installs the process-wide subscriber: console output filtered by
/// `RUST_LOG` (default `info`), plus a rolling file log when
/// `ALERTVIEW_LOG_DIR` is set. Calling it again is a no-op.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    install(filter);
}

/// Same as [`init`] with an explicit default directive, used when
/// `RUST_LOG` is unset.
pub fn init_with_default(directive: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));
    install(filter);
}

fn install(filter: EnvFilter) {
    let console = fmt::layer().with_writer(std::io::stderr);
    let registry = tracing_subscriber::registry().with(console.with_filter(filter));

    let Ok(dir) = std::env::var("ALERTVIEW_LOG_DIR") else {
        let _ = registry.try_init();
        return;
    };
    let prefix = std::env::var("ALERTVIEW_LOG_PREFIX").unwrap_or_else(|_| "alertview".into());
    let rotation = std::env::var("ALERTVIEW_LOG_ROTATION").unwrap_or_else(|_| "daily".into());
    if std::fs::create_dir_all(&dir).is_err() {
        let _ = registry.try_init();
        tracing::warn!(directory = %dir, "failed to create log directory");
        return;
    }

    let (writer, guard) = tracing_appender::non_blocking(rolling_writer(&rotation, &dir, &prefix));
    let _ = FILE_GUARD.set(guard);
    let file_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_writer(writer)
        .with_filter(file_filter);
    let _ = registry.with(file_layer).try_init();
}

fn rolling_writer(rotation: &str, dir: &str, prefix: &str) -> RollingFileAppender {
    match rotation.to_lowercase().as_str() {
        "hourly" => tracing_appender::rolling::hourly(dir, prefix),
        "minutely" => tracing_appender::rolling::minutely(dir, prefix),
        _ => tracing_appender::rolling::daily(dir, prefix),
    }
}
