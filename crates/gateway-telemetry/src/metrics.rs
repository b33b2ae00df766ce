//! Prometheus metrics for the gateway.

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};

/// Process-wide metrics registry.
///
/// Constructed once at startup and shared via the application state; all
/// counters are safe for unsynchronized concurrent use.
pub struct Metrics {
    registry: Registry,
    requests_total: IntCounterVec,
    request_duration_seconds: HistogramVec,
    rate_limited_total: IntCounter,
    llm_tokens_total: IntCounterVec,
}

impl Metrics {
    /// Create and register the gateway metrics.
    ///
    /// # Errors
    /// Returns an error if a collector cannot be registered (duplicate
    /// names, which only happens if this is called twice on one registry).
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let requests_total = IntCounterVec::new(
            Opts::new("gateway_requests_total", "Total HTTP requests processed"),
            &["method", "status"],
        )?;
        registry.register(Box::new(requests_total.clone()))?;

        let request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "gateway_request_duration_seconds",
                "HTTP request latency in seconds",
            ),
            &["method"],
        )?;
        registry.register(Box::new(request_duration_seconds.clone()))?;

        let rate_limited_total = IntCounter::new(
            "gateway_rate_limited_total",
            "Requests rejected by the rate limiter",
        )?;
        registry.register(Box::new(rate_limited_total.clone()))?;

        let llm_tokens_total = IntCounterVec::new(
            Opts::new("gateway_llm_tokens_total", "LLM tokens consumed"),
            &["provider", "model"],
        )?;
        registry.register(Box::new(llm_tokens_total.clone()))?;

        Ok(Self {
            registry,
            requests_total,
            request_duration_seconds,
            rate_limited_total,
            llm_tokens_total,
        })
    }

    /// Record one completed HTTP request.
    pub fn record_request(&self, method: &str, status: u16, duration_secs: f64) {
        self.requests_total
            .with_label_values(&[method, &status.to_string()])
            .inc();
        self.request_duration_seconds
            .with_label_values(&[method])
            .observe(duration_secs);
    }

    /// Record a rate-limit rejection.
    pub fn record_rate_limited(&self) {
        self.rate_limited_total.inc();
    }

    /// Record LLM token usage.
    pub fn record_llm_tokens(&self, provider: &str, model: &str, total_tokens: u64) {
        self.llm_tokens_total
            .with_label_values(&[provider, model])
            .inc_by(total_tokens);
    }

    /// Render the registry in Prometheus text exposition format.
    #[must_use]
    pub fn gather(&self) -> String {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        let encoder = TextEncoder::new();
        if encoder.encode(&metric_families, &mut buffer).is_err() {
            return String::new();
        }
        String::from_utf8(buffer).unwrap_or_default()
    }
}
