use crate::types::template::ScanKind;
use crate::worker::event_handler::kinds::{config_rules::ConfigRulesScanHandler, ScanKindHandler};

/// Resolves the handler registered for a scan kind.
///
/// The kind set is a closed enum, so the registry is exhaustive by
/// construction: an unsupported kind cannot survive past template validation.
pub fn get_scan_handler(scan_kind: ScanKind) -> Box<dyn ScanKindHandler> {
    match scan_kind {
        ScanKind::ConfigRules => Box::new(ConfigRulesScanHandler),
    }
}
