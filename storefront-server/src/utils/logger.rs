//! Logging Infrastructure
//!
//! `tracing-subscriber` 输出到 stdout，或在配置 `LOG_DIR` 时按天滚动写文件。
//! 过滤规则优先取 `RUST_LOG`，否则使用 `LOG_LEVEL`。

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::core::LogConfig;

/// Log file name prefix (`storefront-server.YYYY-MM-DD`)
const LOG_FILE_PREFIX: &str = "storefront-server";

/// Initialize the global subscriber
///
/// 写文件时返回 [`WorkerGuard`]，调用方需持有到进程退出，否则尾部日志会丢失。
pub fn init_logger(config: &LogConfig) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = build_filter(std::env::var("RUST_LOG").ok().as_deref(), &config.level)?;

    let (writer, guard) = match &config.dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            (BoxMakeWriter::new(non_blocking), Some(guard))
        }
        None => (BoxMakeWriter::new(std::io::stdout), None),
    };

    let layer = fmt::layer()
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_ansi(config.dir.is_none() && !config.json)
        .with_writer(writer);

    let registry = tracing_subscriber::registry().with(filter);
    if config.json {
        registry.with(layer.json()).try_init()?;
    } else {
        registry.with(layer).try_init()?;
    }

    Ok(guard)
}

/// `RUST_LOG` wins over the configured level
fn build_filter(rust_log: Option<&str>, level: &str) -> anyhow::Result<EnvFilter> {
    let directives = rust_log.filter(|v| !v.trim().is_empty()).unwrap_or(level);
    Ok(EnvFilter::try_new(directives)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_prefers_rust_log() {
        let filter = build_filter(Some("storefront_server=debug"), "info").unwrap();
        assert!(filter.to_string().contains("storefront_server=debug"));
    }

    #[test]
    fn test_filter_falls_back_to_level() {
        let filter = build_filter(None, "warn").unwrap();
        assert!(filter.to_string().contains("warn"));

        let filter = build_filter(Some("  "), "info,tower_http=debug").unwrap();
        assert!(filter.to_string().contains("tower_http=debug"));
    }
}
