use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScannerError {
    /// The delegated role could not be assumed; fatal to the whole scan.
    #[error("Failed to assume scan role for account {account_id}: {message}")]
    AssumeRoleFailure { account_id: String, message: String },

    #[error("Role assumption returned no credentials for account {0}")]
    MissingCredentials(String),

    /// Rule discovery failed; fatal to the whole scan.
    #[error("Failed to discover configuration rules: {0}")]
    RuleDiscoveryFailure(String),

    /// The batched compliance query failed. Callers degrade the affected
    /// rules to `ERROR` instead of aborting the scan.
    #[error("Failed to query compliance status: {0}")]
    ComplianceQueryFailure(String),
}
