use crate::prelude::*;
use crate::Result;
use serde::Deserialize;
use std::net::SocketAddr;

/// Histogram buckets to measure the distribution of request durations in seconds
const DEFAULT_DURATION_BUCKETS: &[f64] = &[
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Address of the Prometheus scrape endpoint. Metrics are not exported
    /// at all if this isn't set.
    pub(crate) listen_addr: Option<SocketAddr>,
}

/// Installs the Prometheus exporter. Must be called inside of the tokio runtime.
pub fn init_metrics(config: &Config) -> Result {
    let Some(listen_addr) = config.listen_addr else {
        debug!("Metrics listen address is not configured, metrics won't be exported");
        return Ok(());
    };

    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(listen_addr)
        .set_buckets(DEFAULT_DURATION_BUCKETS)
        .fatal_ctx(|| "Invalid histogram buckets")?
        .add_global_label("source", env!("CARGO_PKG_NAME"))
        .add_global_label("app_version", env!("CARGO_PKG_VERSION"))
        .install()
        .fatal_ctx(|| format!("Failed to start the metrics listener at {listen_addr}"))?;

    info!(%listen_addr, "Metrics listener started");

    Ok(())
}
