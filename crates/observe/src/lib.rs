use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Filter used when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_FILTER: &str = "info,consentui_runtime=debug";

/// `RUST_LOG` if set, otherwise `fallback`.
pub fn env_filter_or(fallback: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
}

/// Human-readable subscriber on stderr for development.
pub fn init_fmt_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter_or(DEFAULT_FILTER))
        .with_writer(std::io::stderr)
        .init();
}

/// Line-delimited JSON on stderr, with the current span list on each event.
pub fn init_json_tracing() {
    tracing_subscriber::registry()
        .with(env_filter_or(DEFAULT_FILTER))
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(true)
                .with_writer(std::io::stderr),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_parses() {
        let filter = EnvFilter::try_new(DEFAULT_FILTER);
        assert!(filter.is_ok());
    }
}
