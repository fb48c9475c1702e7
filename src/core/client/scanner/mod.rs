pub mod aws_config_rules;
pub mod credentials;
pub mod error;

use crate::types::scan::{ComplianceOutcome, ComplianceSummary};
use async_trait::async_trait;
pub use error::ScannerError;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

/// Trait defining the compliance-scan operation consumed by the worker.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ComplianceScanClient: Send + Sync {
    /// Runs one compliance scan against a target account and region, returning
    /// the aggregated summary.
    async fn scan(
        &self,
        account_id: &str,
        region: &str,
        rule_prefixes: &[String],
    ) -> Result<ComplianceSummary, ScannerError>;
}

/// Trait abstracting the raw configuration-rule service surface so the
/// aggregation algorithm stays testable without a cloud account.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RulesApi: Send + Sync {
    /// Discovers all rule names defined in the account/region (paginated
    /// internally).
    async fn discover_rule_names(&self) -> Result<Vec<String>, ScannerError>;

    /// Queries compliance for the given rule names, returning raw outcome
    /// strings keyed by rule name. Rules the service omits are absent.
    async fn compliance_by_rule_names(&self, rule_names: &[String]) -> Result<HashMap<String, String>, ScannerError>;
}

/// Builds a [`RulesApi`] bound to a target account's assumed-role credentials.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RulesApiFactory: Send + Sync {
    async fn rules_api_for_account(&self, account_id: &str, region: &str) -> Result<Box<dyn RulesApi>, ScannerError>;
}

/// Reference scanner: configuration-rule compliance over an assumed role.
pub struct ConfigRulesScanner {
    factory: Box<dyn RulesApiFactory>,
}

impl ConfigRulesScanner {
    pub fn new(factory: Box<dyn RulesApiFactory>) -> Self {
        Self { factory }
    }
}

/// Filters discovered rule names down to those matching any prefix.
///
/// The first matching prefix wins, so a rule is included once even when
/// several prefixes would match. Discovery order is preserved.
pub(crate) fn filter_rules_by_prefixes(discovered: &[String], prefixes: &[String]) -> Vec<String> {
    discovered
        .iter()
        .filter(|rule_name| prefixes.iter().any(|prefix| rule_name.starts_with(prefix.as_str())))
        .cloned()
        .collect()
}

#[async_trait]
impl ComplianceScanClient for ConfigRulesScanner {
    async fn scan(
        &self,
        account_id: &str,
        region: &str,
        rule_prefixes: &[String],
    ) -> Result<ComplianceSummary, ScannerError> {
        // Role assumption and rule discovery failures are fatal to the scan.
        let rules_api = self.factory.rules_api_for_account(account_id, region).await?;
        let discovered = rules_api.discover_rule_names().await?;

        let filtered = filter_rules_by_prefixes(&discovered, rule_prefixes);
        debug!(
            account_id = %account_id,
            region = %region,
            discovered = discovered.len(),
            matched = filtered.len(),
            "Filtered configuration rules by prefix"
        );
        // No matching rules is not an error: an empty summary with zero counts.
        if filtered.is_empty() {
            return Ok(ComplianceSummary::default());
        }

        let mut outcomes: BTreeMap<String, ComplianceOutcome> = BTreeMap::new();
        match rules_api.compliance_by_rule_names(&filtered).await {
            Ok(raw_outcomes) => {
                for rule_name in &filtered {
                    // Rules the service silently omits degrade to INSUFFICIENT_DATA
                    // instead of vanishing from the summary.
                    let outcome = raw_outcomes
                        .get(rule_name)
                        .map(|raw| ComplianceOutcome::coerce(raw))
                        .unwrap_or(ComplianceOutcome::InsufficientData);
                    outcomes.insert(rule_name.clone(), outcome);
                }
            }
            Err(e) => {
                // A failing batch query degrades every rule to ERROR; a partial
                // external outage produces a degraded result, not a lost scan.
                warn!(
                    account_id = %account_id,
                    error = %e,
                    rules = filtered.len(),
                    "Compliance query failed; recording ERROR for all matched rules"
                );
                for rule_name in &filtered {
                    outcomes.insert(rule_name.clone(), ComplianceOutcome::Error);
                }
            }
        }

        Ok(ComplianceSummary::from_rule_outcomes(outcomes))
    }
}
