use crate::core::client::scanner::credentials::ScanRoleProvider;
use crate::core::client::scanner::{RulesApi, RulesApiFactory, ScannerError};
use crate::types::params::ScannerArgs;
use async_trait::async_trait;
use aws_config::{Region, SdkConfig};
use aws_credential_types::Credentials;
use std::collections::HashMap;
use tracing::debug;

/// AWS Config limits DescribeComplianceByConfigRule to 25 rule names per call.
const COMPLIANCE_QUERY_BATCH_SIZE: usize = 25;

/// AWS Config implementation of [`RulesApi`], bound to one account's
/// assumed-role credentials.
pub struct AwsConfigRulesApi {
    client: aws_sdk_config::Client,
}

impl AwsConfigRulesApi {
    pub fn new(client: aws_sdk_config::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RulesApi for AwsConfigRulesApi {
    async fn discover_rule_names(&self) -> Result<Vec<String>, ScannerError> {
        let mut rule_names = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let response = self
                .client
                .describe_config_rules()
                .set_next_token(next_token.clone())
                .send()
                .await
                .map_err(|e| ScannerError::RuleDiscoveryFailure(e.to_string()))?;

            for rule in response.config_rules() {
                if let Some(name) = rule.config_rule_name() {
                    rule_names.push(name.to_string());
                }
            }

            next_token = response.next_token().map(|token| token.to_string());
            if next_token.is_none() {
                break;
            }
        }

        debug!(rule_count = rule_names.len(), "Discovered configuration rules");
        Ok(rule_names)
    }

    async fn compliance_by_rule_names(&self, rule_names: &[String]) -> Result<HashMap<String, String>, ScannerError> {
        let mut outcomes = HashMap::with_capacity(rule_names.len());

        for chunk in rule_names.chunks(COMPLIANCE_QUERY_BATCH_SIZE) {
            let mut next_token: Option<String> = None;
            loop {
                let response = self
                    .client
                    .describe_compliance_by_config_rule()
                    .set_config_rule_names(Some(chunk.to_vec()))
                    .set_next_token(next_token.clone())
                    .send()
                    .await
                    .map_err(|e| ScannerError::ComplianceQueryFailure(e.to_string()))?;

                for entry in response.compliance_by_config_rules() {
                    let Some(rule_name) = entry.config_rule_name() else { continue };
                    let Some(compliance_type) =
                        entry.compliance().and_then(|compliance| compliance.compliance_type())
                    else {
                        continue;
                    };
                    outcomes.insert(rule_name.to_string(), compliance_type.as_str().to_string());
                }

                next_token = response.next_token().map(|token| token.to_string());
                if next_token.is_none() {
                    break;
                }
            }
        }

        Ok(outcomes)
    }
}

/// Factory building an [`AwsConfigRulesApi`] per scan: assumes the delegated
/// role for the target account, then constructs a Config-service client with
/// those temporary credentials pinned to the requested region.
pub struct AwsConfigRulesApiFactory {
    base_config: SdkConfig,
    role_provider: Box<dyn ScanRoleProvider>,
}

impl AwsConfigRulesApiFactory {
    pub fn new(base_config: SdkConfig, role_provider: Box<dyn ScanRoleProvider>) -> Self {
        Self { base_config, role_provider }
    }

    pub fn from_args(base_config: &SdkConfig, args: &ScannerArgs) -> Self {
        let role_provider =
            Box::new(super::credentials::StsScanRoleProvider::new(base_config, args)) as Box<dyn ScanRoleProvider>;
        Self::new(base_config.clone(), role_provider)
    }
}

#[async_trait]
impl RulesApiFactory for AwsConfigRulesApiFactory {
    async fn rules_api_for_account(&self, account_id: &str, region: &str) -> Result<Box<dyn RulesApi>, ScannerError> {
        let scan_credentials = self.role_provider.assume_scan_role(account_id).await?;
        let credentials = Credentials::from_keys(
            scan_credentials.access_key_id,
            scan_credentials.secret_access_key,
            Some(scan_credentials.session_token),
        );

        let config = aws_sdk_config::config::Builder::from(&self.base_config)
            .region(Region::new(region.to_string()))
            .credentials_provider(credentials)
            .build();
        let client = aws_sdk_config::Client::from_conf(config);

        Ok(Box::new(AwsConfigRulesApi::new(client)))
    }
}
