use prometheus::{Encoder, TextEncoder, HistogramVec, HistogramOpts, IntCounterVec, GaugeVec, Opts, Registry};
use once_cell::sync::Lazy;
use anyhow::{Context, Result};
use std::path::Path;

use crate::prober::{RequestOutcome, Target};

static REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);

static LATENCY_GAUGE: Lazy<GaugeVec> = Lazy::new(|| {
    let opts = Opts::new("http_latency_milliseconds_current", "Latest request latency in milliseconds");
    let gauge = GaugeVec::new(opts, &["target"]).expect("creating gauge");
    REGISTRY.register(Box::new(gauge.clone())).expect("registering gauge");
    gauge
});

static LATENCY_HIST: Lazy<HistogramVec> = Lazy::new(|| {
    let opts = HistogramOpts::new("http_latency_milliseconds", "Request latency in milliseconds")
        .buckets(vec![
            1.0, 2.0, 5.0, 10.0, 20.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 2500.0, 5000.0,
        ]);
    let hist = HistogramVec::new(opts, &["target"]).expect("creating histogram");
    REGISTRY.register(Box::new(hist.clone())).expect("registering histogram");
    hist
});

static ERROR_COUNTER: Lazy<IntCounterVec> = Lazy::new(|| {
    let opts = Opts::new("http_request_errors_total", "Total number of failed requests");
    let ctr = IntCounterVec::new(opts, &["target"]).expect("creating counter");
    REGISTRY.register(Box::new(ctr.clone())).expect("registering counter");
    ctr
});

static TIMEOUT_COUNTER: Lazy<IntCounterVec> = Lazy::new(|| {
    let opts = Opts::new("http_request_timeout_total", "Total number of requests abandoned at the round deadline");
    let ctr = IntCounterVec::new(opts, &["target"]).expect("creating counter");
    REGISTRY.register(Box::new(ctr.clone())).expect("registering counter");
    ctr
});

pub fn observe_outcome(outcome: &RequestOutcome) {
    let target = outcome.target.as_str();
    if outcome.is_success() {
        let latency_ms = outcome.elapsed.as_secs_f64() * 1000.0;
        LATENCY_GAUGE.with_label_values(&[target]).set(latency_ms);
        LATENCY_HIST.with_label_values(&[target]).observe(latency_ms);
    } else {
        ERROR_COUNTER.with_label_values(&[target]).inc();
    }
}

pub fn inc_timeout(target: &Target) {
    TIMEOUT_COUNTER.with_label_values(&[target.as_str()]).inc();
}

/// Prometheus text exposition of everything recorded so far.
pub fn render() -> Result<String> {
    let encoder = TextEncoder::new();
    let mut buf = Vec::new();
    encoder.encode(&REGISTRY.gather(), &mut buf)?;
    Ok(String::from_utf8(buf)?)
}

pub async fn write_textfile(path: &Path) -> Result<()> {
    let body = render()?;
    tokio::fs::write(path, body)
        .await
        .with_context(|| format!("cannot write metrics to {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn outcome(url: &str, ms: u64, failed: bool) -> RequestOutcome {
        RequestOutcome {
            slot: 0,
            target: Target::parse(url).unwrap(),
            elapsed: Duration::from_millis(ms),
            error: failed.then(|| anyhow::anyhow!("refused")),
        }
    }

    #[test]
    fn records_latency_errors_and_timeouts() {
        observe_outcome(&outcome("http://metrics-ok.test/", 42, false));
        observe_outcome(&outcome("http://metrics-err.test/", 3, true));
        inc_timeout(&Target::parse("http://metrics-slow.test/").unwrap());
        inc_timeout(&Target::parse("http://metrics-slow.test/").unwrap());

        let text = render().unwrap();
        assert!(text.contains(r#"http_latency_milliseconds_current{target="http://metrics-ok.test/"} 42"#));
        assert!(text.contains(r#"http_request_errors_total{target="http://metrics-err.test/"} 1"#));
        assert!(text.contains(r#"http_request_timeout_total{target="http://metrics-slow.test/"} 2"#));
    }

    #[tokio::test]
    async fn writes_textfile() {
        inc_timeout(&Target::parse("http://metrics-file.test/").unwrap());
        let path = std::env::temp_dir().join(format!("http-latency-{}.prom", std::process::id()));

        write_textfile(&path).await.unwrap();

        let written = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(written.contains("http_request_timeout_total"));
        let _ = tokio::fs::remove_file(&path).await;
    }
}
