use crate::core::client::scanner::{
    filter_rules_by_prefixes, ComplianceScanClient, ConfigRulesScanner, MockRulesApi, MockRulesApiFactory,
    RulesApi, ScannerError,
};
use crate::types::scan::ComplianceOutcome;
use rstest::*;
use std::collections::HashMap;

fn scanner_with_api(api: MockRulesApi) -> ConfigRulesScanner {
    let mut factory = MockRulesApiFactory::new();
    factory
        .expect_rules_api_for_account()
        .withf(|account, region| account == "111122223333" && region == "us-east-1")
        .return_once(move |_, _| Ok(Box::new(api) as Box<dyn RulesApi>));
    ConfigRulesScanner::new(Box::new(factory))
}

fn prefixes(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

#[rstest]
#[tokio::test]
async fn only_prefix_matched_rules_are_scanned() {
    let mut api = MockRulesApi::new();
    api.expect_discover_rule_names()
        .returning(|| Ok(vec!["s3-bucket-public-read".to_string(), "ec2-instance-type".to_string()]));
    api.expect_compliance_by_rule_names()
        .withf(|names| names == ["s3-bucket-public-read".to_string()])
        .returning(|_| Ok(HashMap::from([("s3-bucket-public-read".to_string(), "COMPLIANT".to_string())])));

    let scanner = scanner_with_api(api);
    let summary = scanner.scan("111122223333", "us-east-1", &prefixes(&["s3-bucket-"])).await.unwrap();

    assert_eq!(summary.rules_scanned, vec!["s3-bucket-public-read".to_string()]);
    assert_eq!(summary.counts.compliant, 1);
    assert_eq!(summary.counts.total(), 1);
    assert_eq!(summary.rule_details.get("s3-bucket-public-read"), Some(&ComplianceOutcome::Compliant));
}

#[rstest]
#[tokio::test]
async fn rules_omitted_from_the_batch_response_degrade_to_insufficient_data() {
    let mut api = MockRulesApi::new();
    api.expect_discover_rule_names()
        .returning(|| Ok(vec!["s3-bucket-public-read".to_string(), "s3-bucket-versioning".to_string()]));
    api.expect_compliance_by_rule_names()
        .returning(|_| Ok(HashMap::from([("s3-bucket-public-read".to_string(), "NON_COMPLIANT".to_string())])));

    let scanner = scanner_with_api(api);
    let summary = scanner.scan("111122223333", "us-east-1", &prefixes(&["s3-bucket-"])).await.unwrap();

    assert_eq!(summary.counts.total(), summary.rules_scanned.len() as u64);
    assert_eq!(summary.rule_details.get("s3-bucket-versioning"), Some(&ComplianceOutcome::InsufficientData));
    assert_eq!(summary.counts.non_compliant, 1);
    assert_eq!(summary.counts.insufficient_data, 1);
}

#[rstest]
#[tokio::test]
async fn batch_query_failure_degrades_every_rule_to_error() {
    let mut api = MockRulesApi::new();
    api.expect_discover_rule_names()
        .returning(|| Ok(vec!["s3-bucket-public-read".to_string(), "s3-bucket-versioning".to_string()]));
    api.expect_compliance_by_rule_names()
        .returning(|_| Err(ScannerError::ComplianceQueryFailure("throttled".to_string())));

    let scanner = scanner_with_api(api);
    // A partial external outage degrades the result instead of discarding it.
    let summary = scanner.scan("111122223333", "us-east-1", &prefixes(&["s3-bucket-"])).await.unwrap();

    assert_eq!(summary.counts.error, 2);
    assert_eq!(summary.counts.total(), 2);
    assert!(summary.rule_details.values().all(|outcome| *outcome == ComplianceOutcome::Error));
}

#[rstest]
#[tokio::test]
async fn zero_matching_rules_yield_an_empty_summary_not_an_error() {
    let mut api = MockRulesApi::new();
    api.expect_discover_rule_names().returning(|| Ok(vec!["ec2-instance-type".to_string()]));
    // No compliance_by_rule_names expectation: it must not be queried at all.

    let scanner = scanner_with_api(api);
    let summary = scanner.scan("111122223333", "us-east-1", &prefixes(&["s3-bucket-"])).await.unwrap();

    assert!(summary.rules_scanned.is_empty());
    assert_eq!(summary.counts.total(), 0);
    assert!(summary.rule_details.is_empty());
}

#[rstest]
#[tokio::test]
async fn unrecognized_outcome_strings_are_coerced_to_error() {
    let mut api = MockRulesApi::new();
    api.expect_discover_rule_names().returning(|| Ok(vec!["s3-bucket-public-read".to_string()]));
    api.expect_compliance_by_rule_names()
        .returning(|_| Ok(HashMap::from([("s3-bucket-public-read".to_string(), "PARTIALLY_COMPLIANT".to_string())])));

    let scanner = scanner_with_api(api);
    let summary = scanner.scan("111122223333", "us-east-1", &prefixes(&["s3-bucket-"])).await.unwrap();

    assert_eq!(summary.rule_details.get("s3-bucket-public-read"), Some(&ComplianceOutcome::Error));
    assert_eq!(summary.counts.error, 1);
}

#[rstest]
#[tokio::test]
async fn role_assumption_failure_is_fatal_to_the_scan() {
    let mut factory = MockRulesApiFactory::new();
    factory.expect_rules_api_for_account().return_once(|account, _| {
        Err(ScannerError::AssumeRoleFailure { account_id: account.to_string(), message: "AccessDenied".to_string() })
    });
    let scanner = ConfigRulesScanner::new(Box::new(factory));

    let result = scanner.scan("111122223333", "us-east-1", &prefixes(&["s3-bucket-"])).await;
    assert!(matches!(result, Err(ScannerError::AssumeRoleFailure { .. })));
}

#[rstest]
#[tokio::test]
async fn rule_discovery_failure_is_fatal_to_the_scan() {
    let mut api = MockRulesApi::new();
    api.expect_discover_rule_names()
        .returning(|| Err(ScannerError::RuleDiscoveryFailure("ServiceUnavailable".to_string())));

    let scanner = scanner_with_api(api);
    let result = scanner.scan("111122223333", "us-east-1", &prefixes(&["s3-bucket-"])).await;
    assert!(matches!(result, Err(ScannerError::RuleDiscoveryFailure(_))));
}

#[test]
fn prefix_filter_counts_overlapping_prefixes_once() {
    let discovered = vec!["s3-bucket-public-read".to_string(), "iam-root-key".to_string()];
    let filtered = filter_rules_by_prefixes(&discovered, &prefixes(&["s3-", "s3-bucket-"]));
    assert_eq!(filtered, vec!["s3-bucket-public-read".to_string()]);
}

#[test]
fn prefix_filter_preserves_discovery_order() {
    let discovered =
        vec!["s3-bucket-b".to_string(), "ec2-instance-type".to_string(), "s3-bucket-a".to_string()];
    let filtered = filter_rules_by_prefixes(&discovered, &prefixes(&["s3-bucket-"]));
    assert_eq!(filtered, vec!["s3-bucket-b".to_string(), "s3-bucket-a".to_string()]);
}
