//! 日志配置

use log::LevelFilter;

pub const LOG_LEVEL_ENV: &str = "SHABYT_LOG_LEVEL";

pub fn parse_log_level(value: &str) -> Option<LevelFilter> {
    match value.trim().to_lowercase().as_str() {
        "trace" => Some(LevelFilter::Trace),
        "debug" => Some(LevelFilter::Debug),
        "info" => Some(LevelFilter::Info),
        "warn" => Some(LevelFilter::Warn),
        "error" => Some(LevelFilter::Error),
        "off" => Some(LevelFilter::Off),
        _ => None,
    }
}

/// 命令行参数优先，其次环境变量，默认 info
pub fn resolve_level(cli_level: Option<&str>) -> LevelFilter {
    let raw = cli_level
        .map(str::to_string)
        .or_else(|| std::env::var(LOG_LEVEL_ENV).ok());

    match raw {
        Some(value) => parse_log_level(&value).unwrap_or_else(|| {
            eprintln!("Warning: invalid log level '{}', falling back to info", value);
            LevelFilter::Info
        }),
        None => LevelFilter::Info,
    }
}

pub fn setup_logging(level: LevelFilter) -> Result<(), fern::InitError> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .level_for("reqwest", LevelFilter::Warn)
        .level_for("hyper", LevelFilter::Warn)
        .chain(std::io::stderr())
        .apply()?;

    Ok(())
}
