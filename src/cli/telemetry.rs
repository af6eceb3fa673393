//! Logging and optional OTLP trace export.
//!
//! Logs always go to stdout through `tracing-subscriber`. Spans are exported
//! over OTLP/gRPC only when `OTEL_EXPORTER_OTLP_ENDPOINT` is set.

use anyhow::Result;
use once_cell::sync::OnceCell;
use opentelemetry::propagation::TextMapCompositePropagator;
use opentelemetry::{global, trace::TracerProvider as _, KeyValue};
use opentelemetry_otlp::{Compression, WithExportConfig, WithTonicConfig};
use opentelemetry_sdk::{
    propagation::{BaggagePropagator, TraceContextPropagator},
    trace::{SdkTracerProvider, Tracer},
    Resource,
};
use std::{env::var, time::Duration};
use tonic::transport::ClientTlsConfig;
use tracing::{debug, Level, Subscriber};
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Registry};
use ulid::Ulid;

pub const OTLP_ENDPOINT_ENV: &str = "OTEL_EXPORTER_OTLP_ENDPOINT";

static TRACER_PROVIDER: OnceCell<SdkTracerProvider> = OnceCell::new();

/// Collector endpoint, if trace export is requested.
#[must_use]
pub fn otlp_endpoint() -> Option<String> {
    var(OTLP_ENDPOINT_ENV)
        .ok()
        .map(|ep| ep.trim().to_string())
        .filter(|ep| !ep.is_empty())
}

fn normalize_endpoint(ep: String) -> String {
    if ep.starts_with("http://") || ep.starts_with("https://") {
        ep
    } else {
        // Default to https for gRPC if no scheme supplied
        format!("https://{}", ep.trim_end_matches('/'))
    }
}

fn init_tracer(endpoint: String) -> Result<Tracer> {
    let endpoint = normalize_endpoint(endpoint);

    let mut builder = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(&endpoint)
        .with_compression(Compression::Gzip)
        .with_timeout(Duration::from_secs(3));

    if let Some(host) = endpoint
        .strip_prefix("https://")
        .and_then(|s| s.split('/').next())
        .and_then(|h| h.split(':').next())
    {
        let tls = ClientTlsConfig::new()
            .domain_name(host.to_string())
            .with_native_roots();
        builder = builder.with_tls_config(tls);
    }

    let exporter = builder.build()?;

    let instance_id = var("OTEL_SERVICE_INSTANCE_ID").unwrap_or_else(|_| Ulid::new().to_string());

    let trace_provider = SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_resource(
            Resource::builder_empty()
                .with_attributes(vec![
                    KeyValue::new("service.name", env!("CARGO_PKG_NAME")),
                    KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
                    KeyValue::new("service.instance.id", instance_id),
                ])
                .build(),
        )
        .build();

    let _ = TRACER_PROVIDER.set(trace_provider.clone());

    global::set_tracer_provider(trace_provider.clone());
    global::set_text_map_propagator(TextMapCompositePropagator::new(vec![
        Box::new(TraceContextPropagator::new()),
        Box::new(BaggagePropagator::new()),
    ]));

    Ok(trace_provider.tracer(env!("CARGO_PKG_NAME")))
}

/// Build the subscriber: fmt + filter, plus the OTLP layer when an endpoint is set.
///
/// # Errors
///
/// Returns an error if a filter directive or the exporter cannot be built.
pub fn subscriber(verbosity_level: Level) -> Result<Box<dyn Subscriber + Send + Sync>> {
    let fmt_layer = fmt::layer()
        .with_file(true)
        .with_line_number(true)
        .with_thread_ids(true)
        .with_target(false);

    // RUST_LOG=
    let filter = EnvFilter::builder()
        .with_default_directive(verbosity_level.into())
        .from_env_lossy()
        .add_directive("hyper=error".parse()?)
        .add_directive("opentelemetry_sdk=warn".parse()?);

    if let Some(endpoint) = otlp_endpoint() {
        let tracer = init_tracer(endpoint)?;
        let otel_layer = tracing_opentelemetry::layer().with_tracer(tracer);

        Ok(Box::new(
            Registry::default()
                .with(fmt_layer)
                .with(otel_layer)
                .with(filter),
        ))
    } else {
        Ok(Box::new(Registry::default().with(fmt_layer).with(filter)))
    }
}

/// Install the global subscriber.
///
/// # Errors
///
/// Returns an error if the subscriber cannot be built or one is already installed.
pub fn init(verbosity_level: Level) -> Result<()> {
    tracing::subscriber::set_global_default(subscriber(verbosity_level)?)?;

    Ok(())
}

/// Flush and stop the exporter (noop if tracing export is off)
pub fn shutdown_tracer() {
    if let Some(tp) = TRACER_PROVIDER.get() {
        debug!("shutting down tracer provider");
        let _ = tp.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_unset_installs_without_exporter() {
        temp_env::with_vars([(OTLP_ENDPOINT_ENV, None::<&str>)], || {
            assert!(otlp_endpoint().is_none());

            let subscriber = subscriber(Level::DEBUG);
            assert!(subscriber.is_ok());
            if let Ok(subscriber) = subscriber {
                tracing::subscriber::with_default(subscriber, || {
                    tracing::debug!("logging without an exporter");
                });
            }

            assert!(TRACER_PROVIDER.get().is_none());
        });
    }

    #[test]
    fn blank_endpoint_counts_as_unset() {
        temp_env::with_vars([(OTLP_ENDPOINT_ENV, Some("  "))], || {
            assert!(otlp_endpoint().is_none());
        });
    }

    #[test]
    fn endpoint_is_read_from_env() {
        temp_env::with_vars([(OTLP_ENDPOINT_ENV, Some("http://collector:4317"))], || {
            assert_eq!(otlp_endpoint().as_deref(), Some("http://collector:4317"));
        });
    }

    #[test]
    fn test_normalize_endpoint() {
        assert_eq!(
            normalize_endpoint("http://localhost:4317".to_string()),
            "http://localhost:4317"
        );
        assert_eq!(
            normalize_endpoint("collector.example.com:4317/".to_string()),
            "https://collector.example.com:4317"
        );
    }

    #[test]
    fn test_shutdown_tracer_no_provider() {
        shutdown_tracer();
    }
}
