use crate::types::params::OTELConfig;
use crate::OrchestratorResult;
use opentelemetry::{global, KeyValue};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::metrics::SdkMeterProvider;
use opentelemetry_sdk::{runtime, Resource};
use std::time::Duration;
use tracing::warn;
use url::Url;

/// OTLP metrics instrumentation for the orchestrator.
///
/// Traces and logs stay on the console subscriber; metrics are exported to
/// the configured collector endpoint. When no endpoint is set the whole layer
/// is skipped and the metric instruments record into a no-op provider.
pub struct OrchestratorInstrumentation {
    pub otel_config: OTELConfig,
    pub meter_provider: Option<SdkMeterProvider>,
}

impl OrchestratorInstrumentation {
    pub fn new(config: &OTELConfig) -> OrchestratorResult<Self> {
        match config.endpoint {
            None => {
                warn!("OTEL endpoint is not set. Skipping instrumentation.");
                Ok(Self { otel_config: config.clone(), meter_provider: None })
            }
            Some(ref endpoint) => {
                let meter_provider = Self::instrument_metric_provider(config, endpoint)?;
                Ok(Self { otel_config: config.clone(), meter_provider: Some(meter_provider) })
            }
        }
    }

    fn instrument_metric_provider(config: &OTELConfig, endpoint: &Url) -> OrchestratorResult<SdkMeterProvider> {
        let exporter = opentelemetry_otlp::new_exporter().tonic().with_endpoint(endpoint.to_string());

        let provider = opentelemetry_otlp::new_pipeline()
            .metrics(runtime::Tokio)
            .with_exporter(exporter)
            .with_resource(Resource::new(vec![KeyValue::new(
                opentelemetry_semantic_conventions::resource::SERVICE_NAME,
                format!("{}{}", config.service_name, "_meter_service"),
            )]))
            .with_period(Duration::from_secs(5))
            .build()?;

        global::set_meter_provider(provider.clone());
        Ok(provider)
    }

    pub fn shutdown(&self) -> OrchestratorResult<()> {
        match self.meter_provider {
            Some(ref meter_provider) => Ok(meter_provider.shutdown()?),
            None => {
                warn!("OTEL endpoint is not set. Skipping shutdown.");
                Ok(())
            }
        }
    }
}
