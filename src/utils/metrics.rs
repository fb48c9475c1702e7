use once_cell::sync::Lazy;
use opentelemetry::global;
use opentelemetry::metrics::{Counter, Histogram, Meter};

pub static ORCHESTRATOR_METRICS: Lazy<OrchestratorMetrics> = Lazy::new(OrchestratorMetrics::register);

pub struct OrchestratorMetrics {
    pub successful_execution_operations: Counter<u64>,
    pub failed_execution_operations: Counter<u64>,
    pub executions_response_time: Histogram<f64>,
    pub db_calls_response_time: Histogram<f64>,
    pub scan_duration: Histogram<f64>,
    pub rules_evaluated: Counter<u64>,
}

impl OrchestratorMetrics {
    pub fn register() -> Self {
        let meter: Meter = global::meter("scan_orchestrator.opentelemetry");

        let successful_execution_operations = meter
            .u64_counter("successful_execution_operations")
            .with_description("Count of successful execution operations over time")
            .with_unit("executions")
            .init();

        let failed_execution_operations = meter
            .u64_counter("failed_execution_operations")
            .with_description("Count of failed execution operations over time")
            .with_unit("executions")
            .init();

        let executions_response_time = meter
            .f64_histogram("executions_response_time")
            .with_description("Time spent handling execution operations")
            .with_unit("s")
            .init();

        let db_calls_response_time = meter
            .f64_histogram("db_calls_response_time")
            .with_description("Response time of DB calls over time")
            .with_unit("s")
            .init();

        let scan_duration = meter
            .f64_histogram("scan_duration")
            .with_description("Wall-clock duration of compliance scans")
            .with_unit("s")
            .init();

        let rules_evaluated = meter
            .u64_counter("rules_evaluated")
            .with_description("Count of configuration rules evaluated across scans")
            .with_unit("rules")
            .init();

        Self {
            successful_execution_operations,
            failed_execution_operations,
            executions_response_time,
            db_calls_response_time,
            scan_duration,
            rules_evaluated,
        }
    }
}
