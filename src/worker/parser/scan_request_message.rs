use crate::error::event::{ConsumptionError, EventSystemError, EventSystemResult};
use crate::error::other::OtherError;
use crate::worker::traits::message::MessageParser;
use omniqueue::Delivery;
use serde::{Deserialize, Serialize};

/// The queue message requesting a scan for one piece of evidence.
///
/// Intentionally minimal and unversioned: template and parameters are re-read
/// from durable storage at consumption time so the message never goes stale.
/// Unknown extra fields from older producers are ignored on decode.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ScanRequest {
    pub control_id: String,
    pub evidence_id: String,
}

impl MessageParser for ScanRequest {
    fn parse_message(message: &Delivery) -> EventSystemResult<Box<Self>> {
        let payload = message
            .borrow_payload()
            .ok_or_else(|| ConsumptionError::Other(OtherError::from("Empty payload".to_string())))?;
        let request: ScanRequest =
            serde_json::from_slice(payload).map_err(|e| EventSystemError::PayloadSerdeError(e.to_string()))?;
        Ok(Box::new(request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_request_decodes_the_wire_format() {
        let decoded: ScanRequest =
            serde_json::from_str(r#"{"control_id": "ctl-7", "evidence_id": "ev-42"}"#).unwrap();
        assert_eq!(decoded, ScanRequest { control_id: "ctl-7".to_string(), evidence_id: "ev-42".to_string() });
    }

    #[test]
    fn legacy_messages_with_extra_fields_still_decode() {
        let decoded: ScanRequest = serde_json::from_str(
            r#"{"control_id": "ctl-7", "evidence_id": "ev-42", "requested_by": "user-1"}"#,
        )
        .unwrap();
        assert_eq!(decoded.evidence_id, "ev-42");
    }

    #[test]
    fn messages_missing_the_id_pair_fail_to_decode() {
        assert!(serde_json::from_str::<ScanRequest>(r#"{"control_id": "ctl-7"}"#).is_err());
    }
}
