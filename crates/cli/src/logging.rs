use tracing_subscriber::EnvFilter;

use attestor_config::{LogFormat, LogLevel};

/// Chatty dependencies only log warnings, unless `RUST_LOG` says otherwise.
const QUIET_TARGETS: &[&str] = &["hyper", "hyper_util", "reqwest", "rustls", "h2"];

/// Initializes the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level when set.
pub fn init(log_level: LogLevel, log_format: LogFormat) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(build_filter(log_level))
        .with_target(false);

    match log_format {
        LogFormat::Plaintext => builder.init(),
        LogFormat::Json => builder.json().with_current_span(true).init(),
    }
}

fn build_filter(log_level: LogLevel) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives(log_level)))
}

fn directives(log_level: LogLevel) -> String {
    let mut directives = log_level.to_string();

    for target in QUIET_TARGETS {
        directives.push_str(&format!(",{target}=warn"));
    }

    directives
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directives_quiet_dependencies() {
        assert_eq!(
            directives(LogLevel::Debug),
            "debug,hyper=warn,hyper_util=warn,reqwest=warn,rustls=warn,h2=warn"
        );
    }

    #[test]
    fn directives_parse() {
        for level in [LogLevel::Trace, LogLevel::Info, LogLevel::Error] {
            assert!(EnvFilter::try_new(directives(level)).is_ok());
        }
    }
}
