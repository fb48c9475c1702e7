use crate::core::client::scanner::ScannerError;
use crate::types::params::ScannerArgs;
use async_trait::async_trait;
use aws_config::SdkConfig;
use uuid::Uuid;

/// Temporary credentials scoped to one scan invocation.
///
/// Never cached or shared across evidence records or accounts; each scan
/// assumes the role afresh.
#[derive(Debug, Clone)]
pub struct ScanRoleCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: String,
}

/// Trait abstracting "assume the delegated scan role in account X".
///
/// The scanner never uses the orchestrator's own credentials against a
/// customer account; everything it does runs under these assumed-role
/// credentials.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ScanRoleProvider: Send + Sync {
    async fn assume_scan_role(&self, account_id: &str) -> Result<ScanRoleCredentials, ScannerError>;
}

/// STS-backed implementation of [`ScanRoleProvider`].
pub struct StsScanRoleProvider {
    client: aws_sdk_sts::Client,
    scan_role_name: String,
}

impl StsScanRoleProvider {
    pub fn new(aws_config: &SdkConfig, args: &ScannerArgs) -> Self {
        let sts_config_builder = aws_sdk_sts::config::Builder::from(aws_config);
        let client = aws_sdk_sts::Client::from_conf(sts_config_builder.build());
        Self { client, scan_role_name: args.scan_role_name.clone() }
    }

    fn role_arn(&self, account_id: &str) -> String {
        format!("arn:aws:iam::{}:role/{}", account_id, self.scan_role_name)
    }
}

#[async_trait]
impl ScanRoleProvider for StsScanRoleProvider {
    async fn assume_scan_role(&self, account_id: &str) -> Result<ScanRoleCredentials, ScannerError> {
        let role_arn = self.role_arn(account_id);
        let session_name = format!("scan-orchestrator-{}", Uuid::new_v4());

        let response = self
            .client
            .assume_role()
            .role_arn(&role_arn)
            .role_session_name(&session_name)
            .send()
            .await
            .map_err(|e| ScannerError::AssumeRoleFailure {
                account_id: account_id.to_string(),
                message: e.to_string(),
            })?;

        let credentials = response
            .credentials()
            .ok_or_else(|| ScannerError::MissingCredentials(account_id.to_string()))?;

        Ok(ScanRoleCredentials {
            access_key_id: credentials.access_key_id().to_string(),
            secret_access_key: credentials.secret_access_key().to_string(),
            session_token: credentials.session_token().to_string(),
        })
    }
}
