use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum_macros::{Display, EnumIter};

/// Per-rule compliance outcome as reported by the cloud configuration service.
///
/// The value set mirrors the external service's compliance types verbatim so
/// stored results stay comparable with the provider console. Anything the
/// service returns outside this set is coerced to `Error` rather than being
/// carried as an unknown value.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ComplianceOutcome {
    Compliant,
    NonCompliant,
    NotApplicable,
    InsufficientData,
    Error,
}

impl ComplianceOutcome {
    /// Maps a raw outcome string from the external service onto the closed set.
    pub fn coerce(raw: &str) -> Self {
        match raw {
            "COMPLIANT" => Self::Compliant,
            "NON_COMPLIANT" => Self::NonCompliant,
            "NOT_APPLICABLE" => Self::NotApplicable,
            "INSUFFICIENT_DATA" => Self::InsufficientData,
            _ => Self::Error,
        }
    }
}

/// Aggregate outcome counts for one scan.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ComplianceCounts {
    pub compliant: u64,
    pub non_compliant: u64,
    pub not_applicable: u64,
    pub insufficient_data: u64,
    pub error: u64,
}

impl ComplianceCounts {
    pub fn record(&mut self, outcome: ComplianceOutcome) {
        match outcome {
            ComplianceOutcome::Compliant => self.compliant += 1,
            ComplianceOutcome::NonCompliant => self.non_compliant += 1,
            ComplianceOutcome::NotApplicable => self.not_applicable += 1,
            ComplianceOutcome::InsufficientData => self.insufficient_data += 1,
            ComplianceOutcome::Error => self.error += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.compliant + self.non_compliant + self.not_applicable + self.insufficient_data + self.error
    }
}

/// Result of one compliance scan.
///
/// Invariant: `counts.total() == rules_scanned.len()`, and every scanned rule
/// has exactly one entry in `rule_details`. Constructing the summary through
/// [`ComplianceSummary::from_rule_outcomes`] keeps that invariant by design of
/// the single code path; nothing else mutates a summary after construction.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ComplianceSummary {
    pub counts: ComplianceCounts,
    pub rules_scanned: Vec<String>,
    pub rule_details: BTreeMap<String, ComplianceOutcome>,
}

impl ComplianceSummary {
    /// Builds a summary from the per-rule outcome map produced by a scan.
    pub fn from_rule_outcomes(outcomes: BTreeMap<String, ComplianceOutcome>) -> Self {
        let mut counts = ComplianceCounts::default();
        let mut rules_scanned = Vec::with_capacity(outcomes.len());
        for (rule_name, outcome) in &outcomes {
            counts.record(*outcome);
            rules_scanned.push(rule_name.clone());
        }
        Self { counts, rules_scanned, rule_details: outcomes }
    }
}

/// Typed result of a scan execution, tagged by scan kind.
///
/// Stored as an opaque document at the persistence boundary and decoded back
/// into this enum immediately after load.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScanOutput {
    ConfigRules(ComplianceSummary),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_coercion_covers_known_values() {
        assert_eq!(ComplianceOutcome::coerce("COMPLIANT"), ComplianceOutcome::Compliant);
        assert_eq!(ComplianceOutcome::coerce("NON_COMPLIANT"), ComplianceOutcome::NonCompliant);
        assert_eq!(ComplianceOutcome::coerce("NOT_APPLICABLE"), ComplianceOutcome::NotApplicable);
        assert_eq!(ComplianceOutcome::coerce("INSUFFICIENT_DATA"), ComplianceOutcome::InsufficientData);
    }

    #[test]
    fn unknown_outcome_strings_coerce_to_error() {
        assert_eq!(ComplianceOutcome::coerce("Compliant"), ComplianceOutcome::Error);
        assert_eq!(ComplianceOutcome::coerce("UNKNOWN_FUTURE_VALUE"), ComplianceOutcome::Error);
        assert_eq!(ComplianceOutcome::coerce(""), ComplianceOutcome::Error);
    }

    #[test]
    fn summary_counts_sum_to_rules_scanned() {
        let mut outcomes = BTreeMap::new();
        outcomes.insert("s3-bucket-public-read".to_string(), ComplianceOutcome::Compliant);
        outcomes.insert("s3-bucket-versioning".to_string(), ComplianceOutcome::NonCompliant);
        outcomes.insert("iam-root-key".to_string(), ComplianceOutcome::InsufficientData);

        let summary = ComplianceSummary::from_rule_outcomes(outcomes);
        assert_eq!(summary.counts.total(), summary.rules_scanned.len() as u64);
        assert_eq!(summary.rule_details.len(), summary.rules_scanned.len());
        assert_eq!(summary.counts.compliant, 1);
        assert_eq!(summary.counts.non_compliant, 1);
        assert_eq!(summary.counts.insufficient_data, 1);
    }

    #[test]
    fn empty_summary_has_zero_counts() {
        let summary = ComplianceSummary::from_rule_outcomes(BTreeMap::new());
        assert!(summary.rules_scanned.is_empty());
        assert_eq!(summary.counts.total(), 0);
    }

    #[test]
    fn scan_output_round_trips_through_json() {
        let mut outcomes = BTreeMap::new();
        outcomes.insert("ec2-instance-type".to_string(), ComplianceOutcome::Error);
        let output = ScanOutput::ConfigRules(ComplianceSummary::from_rule_outcomes(outcomes));

        let encoded = serde_json::to_value(&output).unwrap();
        assert_eq!(encoded.get("kind").and_then(|k| k.as_str()), Some("config_rules"));
        let decoded: ScanOutput = serde_json::from_value(encoded).unwrap();
        assert_eq!(decoded, output);
    }
}
