use chrono::{DateTime, Utc};
use mongodb::bson::serde_helpers::{chrono_datetime_as_bson_datetime, uuid_1_as_binary};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};
use thiserror::Error;
use uuid::Uuid;

/// Closed set of supported scan kinds.
///
/// Adding a kind means adding a variant here, a parameter struct, and a
/// handler registration in the worker factory; the dispatch loop itself never
/// changes.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ScanKind {
    ConfigRules,
}

/// Parameters for a configuration-rule compliance scan.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ConfigRuleScanParams {
    /// Rule-name prefixes to scan. A discovered rule is included when any
    /// prefix matches; the first match wins so a rule is counted once.
    pub rule_prefixes: Vec<String>,
    /// Region of the target account to scan.
    pub region: String,
}

/// Scan parameters, tagged by kind.
///
/// Persisted as a tagged document and decoded back into this enum immediately
/// after load, so parameter shape mismatches surface at the storage boundary
/// rather than mid-scan.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "scan_kind", rename_all = "snake_case")]
pub enum ScanParameters {
    ConfigRules(ConfigRuleScanParams),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TemplateValidationError {
    #[error("Unknown scan kind: {0}")]
    UnknownScanKind(String),

    #[error("Invalid parameters for scan kind {kind}: {message}")]
    InvalidParameters { kind: ScanKind, message: String },

    #[error("Template name must not be empty")]
    EmptyName,
}

impl ScanParameters {
    pub fn kind(&self) -> ScanKind {
        match self {
            ScanParameters::ConfigRules(_) => ScanKind::ConfigRules,
        }
    }

    /// Decodes and validates raw creation input into typed parameters.
    ///
    /// An unknown `scan_kind` or parameters that do not decode against the
    /// kind's schema are rejected here, at creation time, never at execution
    /// time.
    pub fn from_parts(scan_kind: &str, parameters: serde_json::Value) -> Result<Self, TemplateValidationError> {
        let kind: ScanKind = scan_kind
            .parse()
            .map_err(|_| TemplateValidationError::UnknownScanKind(scan_kind.to_string()))?;
        Self::decode_for_kind(kind, parameters)
    }

    /// Decodes parameters against an already-known kind (template updates).
    pub fn decode_for_kind(kind: ScanKind, parameters: serde_json::Value) -> Result<Self, TemplateValidationError> {
        let decoded = match kind {
            ScanKind::ConfigRules => {
                let params: ConfigRuleScanParams = serde_json::from_value(parameters)
                    .map_err(|e| TemplateValidationError::InvalidParameters { kind, message: e.to_string() })?;
                ScanParameters::ConfigRules(params)
            }
        };
        decoded.validate()?;
        Ok(decoded)
    }

    pub fn validate(&self) -> Result<(), TemplateValidationError> {
        match self {
            ScanParameters::ConfigRules(params) => {
                if params.rule_prefixes.is_empty() || params.rule_prefixes.iter().any(|p| p.is_empty()) {
                    return Err(TemplateValidationError::InvalidParameters {
                        kind: self.kind(),
                        message: "rule_prefixes must contain at least one non-empty prefix".to_string(),
                    });
                }
                if params.region.is_empty() {
                    return Err(TemplateValidationError::InvalidParameters {
                        kind: self.kind(),
                        message: "region must not be empty".to_string(),
                    });
                }
                Ok(())
            }
        }
    }
}

/// A named, reusable scan configuration.
///
/// Identity is immutable; `parameters`, `description` and `active` are the
/// only mutable fields. Retired templates are deactivated, never deleted.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ScanTemplate {
    #[serde(with = "uuid_1_as_binary")]
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub parameters: ScanParameters,
    pub active: bool,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl ScanTemplate {
    pub fn new(name: String, description: String, parameters: ScanParameters) -> Result<Self, TemplateValidationError> {
        if name.trim().is_empty() {
            return Err(TemplateValidationError::EmptyName);
        }
        parameters.validate()?;
        let now = Utc::now();
        Ok(Self { id: Uuid::new_v4(), name, description, parameters, active: true, created_at: now, updated_at: now })
    }

    pub fn scan_kind(&self) -> ScanKind {
        self.parameters.kind()
    }
}

/// Changes applicable to a template; identity and creation time never change.
#[derive(Debug, Default, Clone)]
pub struct TemplateUpdates {
    pub description: Option<String>,
    pub parameters: Option<ScanParameters>,
    pub active: Option<bool>,
}

impl TemplateUpdates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update_description(mut self, description: String) -> Self {
        self.description = Some(description);
        self
    }

    pub fn update_parameters(mut self, parameters: ScanParameters) -> Self {
        self.parameters = Some(parameters);
        self
    }

    pub fn update_active(mut self, active: bool) -> Self {
        self.active = Some(active);
        self
    }

    pub fn build(self) -> Self {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_scan_kind_is_rejected_at_creation() {
        let result = ScanParameters::from_parts("port_scan", json!({}));
        assert_eq!(result, Err(TemplateValidationError::UnknownScanKind("port_scan".to_string())));
    }

    #[test]
    fn config_rules_parameters_decode() {
        let params = ScanParameters::from_parts(
            "config_rules",
            json!({"rule_prefixes": ["s3-bucket-"], "region": "us-east-1"}),
        )
        .unwrap();
        assert_eq!(params.kind(), ScanKind::ConfigRules);
    }

    #[test]
    fn empty_rule_prefixes_are_rejected() {
        let result = ScanParameters::from_parts("config_rules", json!({"rule_prefixes": [], "region": "us-east-1"}));
        assert!(matches!(result, Err(TemplateValidationError::InvalidParameters { .. })));
    }

    #[test]
    fn empty_region_is_rejected() {
        let result = ScanParameters::from_parts("config_rules", json!({"rule_prefixes": ["iam-"], "region": ""}));
        assert!(matches!(result, Err(TemplateValidationError::InvalidParameters { .. })));
    }

    #[test]
    fn undecodable_parameters_are_rejected() {
        let result = ScanParameters::from_parts("config_rules", json!({"rule_prefixes": "not-a-list"}));
        assert!(matches!(result, Err(TemplateValidationError::InvalidParameters { .. })));
    }

    #[test]
    fn template_requires_a_name() {
        let parameters = ScanParameters::ConfigRules(ConfigRuleScanParams {
            rule_prefixes: vec!["s3-".to_string()],
            region: "eu-west-1".to_string(),
        });
        assert_eq!(
            ScanTemplate::new("  ".to_string(), String::new(), parameters).unwrap_err(),
            TemplateValidationError::EmptyName
        );
    }

    #[test]
    fn new_templates_start_active() {
        let parameters = ScanParameters::ConfigRules(ConfigRuleScanParams {
            rule_prefixes: vec!["s3-".to_string()],
            region: "eu-west-1".to_string(),
        });
        let template = ScanTemplate::new("S3 baseline".to_string(), String::new(), parameters).unwrap();
        assert!(template.active);
        assert_eq!(template.scan_kind(), ScanKind::ConfigRules);
    }
}
