//! Thin wrapper around `prometheus`, in the shape of the teacher's `lighthouse_metrics`: a
//! process-wide default registry plus fallible `try_create_*` constructors so a metric name
//! clash logs a warning instead of panicking a whole binary.

pub use prometheus::{Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts};
use prometheus::{Encoder, Registry, TextEncoder};

lazy_static::lazy_static! {
    static ref DEFAULT_REGISTRY: Registry = Registry::new();
}

pub fn default_registry() -> &'static Registry {
    &DEFAULT_REGISTRY
}

pub fn try_create_int_counter(name: &str, help: &str) -> prometheus::Result<IntCounter> {
    let counter = IntCounter::new(name, help)?;
    DEFAULT_REGISTRY.register(Box::new(counter.clone()))?;
    Ok(counter)
}

pub fn try_create_int_counter_vec(
    name: &str,
    help: &str,
    labels: &[&str],
) -> prometheus::Result<IntCounterVec> {
    let counter = IntCounterVec::new(Opts::new(name, help), labels)?;
    DEFAULT_REGISTRY.register(Box::new(counter.clone()))?;
    Ok(counter)
}

pub fn try_create_int_gauge(name: &str, help: &str) -> prometheus::Result<IntGauge> {
    let gauge = IntGauge::new(name, help)?;
    DEFAULT_REGISTRY.register(Box::new(gauge.clone()))?;
    Ok(gauge)
}

pub fn try_create_histogram(name: &str, help: &str) -> prometheus::Result<Histogram> {
    let histogram = Histogram::with_opts(HistogramOpts::new(name, help))?;
    DEFAULT_REGISTRY.register(Box::new(histogram.clone()))?;
    Ok(histogram)
}

pub fn inc_counter(counter: &prometheus::Result<IntCounter>) {
    if let Ok(counter) = counter {
        counter.inc();
    }
}

pub fn inc_counter_vec(counter: &prometheus::Result<IntCounterVec>, label_values: &[&str]) {
    if let Ok(counter) = counter {
        counter.with_label_values(label_values).inc();
    }
}

pub fn set_gauge(gauge: &prometheus::Result<IntGauge>, value: i64) {
    if let Ok(gauge) = gauge {
        gauge.set(value);
    }
}

pub fn observe(histogram: &prometheus::Result<Histogram>, value: f64) {
    if let Ok(histogram) = histogram {
        histogram.observe(value);
    }
}

/// Renders the default registry in Prometheus text exposition format, for an external
/// `/metrics` HTTP handler to serve verbatim.
pub fn gather_text() -> String {
    let metric_families = DEFAULT_REGISTRY.gather();
    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();
    if encoder.encode(&metric_families, &mut buffer).is_err() {
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}
