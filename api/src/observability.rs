use anyhow::Result;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry::KeyValue;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::runtime::Tokio;
use opentelemetry_sdk::trace::TracerProvider;
use opentelemetry_sdk::Resource;
use prometheus::Registry;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LogFormat;
use crate::metrics;

pub struct Observability {
    pub registry: Registry,
    tracer_provider: Option<TracerProvider>,
}

/// Prometheus registry with every application metric registered
pub fn new_registry() -> prometheus::Result<Registry> {
    let registry = Registry::new_custom(Some("blog".into()), None)?;
    metrics::register_all(&registry)?;
    Ok(registry)
}

/// Batch-exporting tracer provider tagged with this service's name and version
pub fn otlp_tracer_provider(endpoint: &str) -> Result<TracerProvider> {
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()?;

    Ok(TracerProvider::builder()
        .with_batch_exporter(exporter, Tokio)
        .with_resource(Resource::new(vec![
            KeyValue::new("service.name", "blog-api"),
            KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
        ]))
        .build())
}

impl Observability {
    /// Install the global tracing subscriber.
    ///
    /// Spans are exported over OTLP only when `OTEL_EXPORTER_OTLP_ENDPOINT`
    /// is set.
    pub fn init(format: LogFormat) -> Result<Self> {
        let registry = new_registry()?;

        let tracer_provider = match std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT") {
            Ok(endpoint) if !endpoint.is_empty() => Some(otlp_tracer_provider(&endpoint)?),
            _ => None,
        };

        let otel_layer = tracer_provider
            .as_ref()
            .map(|provider| tracing_opentelemetry::layer().with_tracer(provider.tracer("blog-api")));

        let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "api=info,tower_http=info".into());

        let (text_layer, json_layer) = match format {
            LogFormat::Text => (Some(tracing_subscriber::fmt::layer().with_target(false)), None),
            LogFormat::Json => (None, Some(tracing_subscriber::fmt::layer().json())),
        };

        tracing_subscriber::registry()
            .with(env_filter)
            .with(text_layer)
            .with(json_layer)
            .with(otel_layer)
            .init();

        tracing::info!(
            otlp = tracer_provider.is_some(),
            "Observability stack initialized"
        );
        Ok(Self {
            registry,
            tracer_provider,
        })
    }

    /// Flush pending spans
    pub fn shutdown(&self) {
        if let Some(provider) = &self.tracer_provider {
            if let Err(err) = provider.shutdown() {
                eprintln!("failed to shut down tracer provider: {err}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opentelemetry::trace::TracerProvider as _;

    #[test]
    fn test_registry_creation() {
        let registry = new_registry().unwrap();
        crate::metrics::BLOGS_DELETED.inc();
        let families = registry.gather();
        assert!(families
            .iter()
            .any(|fam| fam.get_name() == "blog_blogs_deleted_total"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_otlp_provider_builds_without_collector() {
        let provider = otlp_tracer_provider("http://127.0.0.1:4317").unwrap();
        let _tracer = provider.tracer("blog-api");
    }
}
