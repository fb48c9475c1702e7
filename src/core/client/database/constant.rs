/// Evidence records; owned by the evidence-management service. This
/// orchestrator reads them and writes only the latest-execution pointer.
pub const EVIDENCE_COLLECTION: &str = "evidence";

pub const TEMPLATES_COLLECTION: &str = "scan_templates";

pub const EXECUTIONS_COLLECTION: &str = "scan_executions";
