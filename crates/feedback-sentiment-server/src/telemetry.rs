//! Logging and metrics initialisation

use crate::config::MetricsConfig;
use tracing::info;

pub const REQUESTS_TOTAL: &str = "feedback_analyze_requests_total";
pub const FALLBACKS_TOTAL: &str = "feedback_analyze_fallbacks_total";
pub const CLASSIFICATION_LATENCY_US: &str = "feedback_classification_latency_us";

/// Initialize tracing/logging on stdout
pub fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("feedback_sentiment=debug,tower_http=debug")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("feedback_sentiment=info,tower_http=warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout))
        .init();
}

/// Install the Prometheus recorder and its scrape listener when enabled
pub fn init_metrics(config: &MetricsConfig) -> anyhow::Result<()> {
    use metrics_exporter_prometheus::PrometheusBuilder;

    if !config.enabled {
        return Ok(());
    }

    PrometheusBuilder::new()
        .with_http_listener(config.listen)
        .install()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics: {}", e))?;

    metrics::describe_counter!(REQUESTS_TOTAL, "Total number of analyze requests");
    metrics::describe_counter!(
        FALLBACKS_TOTAL,
        "Analyze requests answered with the neutral fallback, by reason"
    );
    metrics::describe_histogram!(
        CLASSIFICATION_LATENCY_US,
        metrics::Unit::Microseconds,
        "Classifier latency in microseconds"
    );

    info!("Metrics exporter listening on http://{}/metrics", config.listen);
    Ok(())
}
