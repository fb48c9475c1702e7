use crate::cli::RunCmd;
use url::Url;

/// OTELConfig - OTLP exporter settings; instrumentation is skipped when no
/// endpoint is configured.
#[derive(Debug, Clone)]
pub struct OTELConfig {
    pub endpoint: Option<Url>,
    pub service_name: String,
}

impl From<&RunCmd> for OTELConfig {
    fn from(run_cmd: &RunCmd) -> Self {
        Self { endpoint: run_cmd.otel_collector_endpoint.clone(), service_name: run_cmd.otel_service_name.clone() }
    }
}
