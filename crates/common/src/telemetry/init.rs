use anyhow::Result;
use opentelemetry::{trace::TracerProvider, KeyValue};
use opentelemetry_appender_tracing::layer::OpenTelemetryTracingBridge;
use opentelemetry_otlp::{LogExporter, SpanExporter, WithExportConfig};
use opentelemetry_sdk::{
    logs::LoggerProvider,
    propagation::TraceContextPropagator,
    runtime,
    trace::{RandomIdGenerator, Sampler, TracerProvider as SdkTracerProvider},
    Resource,
};
use tracing::Subscriber;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use super::{TelemetryConfig, TelemetryProviders};

/// Instrumentation scope name for spans exported by this service
const TRACER_NAME: &str = "send-legal-mail";

/// JSON stdout layer. Built per subscriber stack since its type depends on the stack below it.
fn json_stdout_layer<S>() -> impl Layer<S> + Send + Sync
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    tracing_subscriber::fmt::layer()
        .json()
        .with_span_list(true)
        .with_current_span(true)
}

fn env_filter(config: &TelemetryConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level))
}

/// OTLP trace and log pipelines sharing one service resource
fn build_otlp_providers(config: &TelemetryConfig) -> Result<TelemetryProviders> {
    let resource = Resource::new(vec![KeyValue::new(
        opentelemetry_semantic_conventions::resource::SERVICE_NAME,
        config.service_name.clone(),
    )]);

    let tracer_provider = SdkTracerProvider::builder()
        .with_batch_exporter(
            SpanExporter::builder()
                .with_tonic()
                .with_endpoint(&config.otel_endpoint)
                .build()?,
            runtime::Tokio,
        )
        .with_sampler(Sampler::AlwaysOn)
        .with_id_generator(RandomIdGenerator::default())
        .with_resource(resource.clone())
        .build();

    let logger_provider = LoggerProvider::builder()
        .with_batch_exporter(
            LogExporter::builder()
                .with_tonic()
                .with_endpoint(&config.otel_endpoint)
                .build()?,
            runtime::Tokio,
        )
        .with_resource(resource)
        .build();

    Ok(TelemetryProviders {
        tracer_provider,
        logger_provider,
    })
}

/// Install the global subscriber.
///
/// JSON logs always go to stdout. With OTEL enabled, spans and log events are
/// also exported to `otel_endpoint` and W3C trace context propagation is
/// installed; the returned providers must be passed to [`shutdown_telemetry`].
pub fn init_telemetry(config: &TelemetryConfig) -> Result<Option<TelemetryProviders>> {
    if !config.otel_enabled {
        tracing_subscriber::registry()
            .with(env_filter(config))
            .with(json_stdout_layer())
            .try_init()?;
        return Ok(None);
    }

    opentelemetry::global::set_text_map_propagator(TraceContextPropagator::new());
    let providers = build_otlp_providers(config)?;

    // Trace layer before the log bridge so exported records carry the span context
    tracing_subscriber::registry()
        .with(env_filter(config))
        .with(
            tracing_opentelemetry::layer()
                .with_tracer(providers.tracer_provider.tracer(TRACER_NAME)),
        )
        .with(OpenTelemetryTracingBridge::new(&providers.logger_provider))
        .with(json_stdout_layer())
        .try_init()?;

    Ok(Some(providers))
}

/// Flush and shut down the OTLP providers, if any were created
pub fn shutdown_telemetry(providers: Option<TelemetryProviders>) {
    if let Some(providers) = providers {
        providers.shutdown();
    }
}
