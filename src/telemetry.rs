//! Tracing setup and standardized spans.

use tracing_subscriber::EnvFilter;

/// Install the global subscriber. `RUST_LOG` overrides the default filter;
/// `RELAYD_LOG_FORMAT=json` switches to JSON output.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("RELAYD_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Standardized span constructors.
pub mod spans {
    use tracing::{Span, info_span};

    /// Span covering the handshake of one connection.
    pub fn handshake() -> Span {
        info_span!("handshake")
    }

    /// Span covering the message loop of an authenticated member.
    pub fn member(username: &str) -> Span {
        info_span!("member", username = %username)
    }
}
