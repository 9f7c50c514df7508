//! Prometheus metrics collection for relayd.
//!
//! - `relay_connections_accepted_total` - TCP connections accepted
//! - `relay_members` - authenticated sessions currently in the registry
//! - `relay_auth_total{outcome}` - handshake results
//! - `relay_messages_broadcast_total` - lines fanned out
//! - `relay_message_fanout` - recipients per broadcast (histogram)
//! - `relay_deliveries_dropped_total{reason}` - per-recipient delivery failures
//! - `relay_store_errors_total{operation}` - credential/transcript store failures
//!
//! Recording before [`init`] is a no-op, so unit tests never need a registry.

use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use std::sync::OnceLock;

/// Global Prometheus registry for all metrics.
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::new)
}

pub static CONNECTIONS_ACCEPTED: OnceLock<IntCounter> = OnceLock::new();

pub static MEMBERS: OnceLock<IntGauge> = OnceLock::new();

pub static AUTH_OUTCOMES: OnceLock<IntCounterVec> = OnceLock::new();

pub static MESSAGES_BROADCAST: OnceLock<IntCounter> = OnceLock::new();

pub static MESSAGE_FANOUT: OnceLock<Histogram> = OnceLock::new();

pub static DELIVERIES_DROPPED: OnceLock<IntCounterVec> = OnceLock::new();

pub static STORE_ERRORS: OnceLock<IntCounterVec> = OnceLock::new();

/// Initialize the Prometheus metrics registry.
///
/// Must be called once at server startup before any metrics are recorded.
pub fn init() {
    let r = registry();

    macro_rules! register {
        ($metric:ident, $init:expr) => {
            let m = $init.expect(concat!(stringify!($metric), " creation failed"));
            if let Err(e) = r.register(Box::new(m.clone())) {
                tracing::warn!(error = %e, concat!("Failed to register metric ", stringify!($metric)));
            }
            let _ = $metric.set(m);
        };
    }

    register!(CONNECTIONS_ACCEPTED, IntCounter::new("relay_connections_accepted_total", "TCP connections accepted"));
    register!(MEMBERS, IntGauge::new("relay_members", "Authenticated sessions in the registry"));
    register!(AUTH_OUTCOMES, IntCounterVec::new(Opts::new("relay_auth_total", "Handshake results"), &["outcome"]));
    register!(MESSAGES_BROADCAST, IntCounter::new("relay_messages_broadcast_total", "Lines broadcast"));
    register!(MESSAGE_FANOUT, Histogram::with_opts(
        HistogramOpts::new("relay_message_fanout", "Recipients per broadcast")
            .buckets(vec![0.0, 1.0, 2.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0])));
    register!(DELIVERIES_DROPPED, IntCounterVec::new(Opts::new("relay_deliveries_dropped_total", "Per-recipient delivery failures"), &["reason"]));
    register!(STORE_ERRORS, IntCounterVec::new(Opts::new("relay_store_errors_total", "Store operation failures"), &["operation"]));
}

/// Gather all metrics and encode them in Prometheus text format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = registry().gather();
    let mut buffer = vec![];
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode Prometheus metrics");
        return String::new();
    }
    match String::from_utf8(buffer) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Prometheus metrics were not valid UTF-8");
            String::new()
        }
    }
}

#[inline]
pub fn record_connection() {
    if let Some(c) = CONNECTIONS_ACCEPTED.get() {
        c.inc();
    }
}

#[inline]
pub fn set_members(count: usize) {
    if let Some(g) = MEMBERS.get() {
        g.set(count as i64);
    }
}

#[inline]
pub fn record_auth(outcome: &str) {
    if let Some(c) = AUTH_OUTCOMES.get() {
        c.with_label_values(&[outcome]).inc();
    }
}

/// Record one broadcast and how many recipients it reached.
#[inline]
pub fn record_broadcast(recipients: usize) {
    if let Some(c) = MESSAGES_BROADCAST.get() {
        c.inc();
    }
    if let Some(h) = MESSAGE_FANOUT.get() {
        h.observe(recipients as f64);
    }
}

#[inline]
pub fn record_dropped(reason: &str) {
    if let Some(c) = DELIVERIES_DROPPED.get() {
        c.with_label_values(&[reason]).inc();
    }
}

#[inline]
pub fn record_store_error(operation: &str) {
    if let Some(c) = STORE_ERRORS.get() {
        c.with_label_values(&[operation]).inc();
    }
}
