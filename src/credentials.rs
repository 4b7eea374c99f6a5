//! Temporary cross-account credentials.
//!
//! [`CredentialBroker`] assumes the organization access role in a member
//! account. Every call issues a fresh STS request; nothing is cached or
//! renewed.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::api::StsApi;
use crate::error::Error;

/// Role created in member accounts by AWS Organizations.
pub const ORGANIZATION_ROLE_NAME: &str = "OrganizationAccountAccessRole";

/// Session name sent with every assume-role call.
pub const ROLE_SESSION_NAME: &str = "AssumeRoleSession1";

/// Credentials issued by an assume-role call.
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TemporaryCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: String,
    pub expiration: DateTime<Utc>,
}

impl TemporaryCredentials {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expiration
    }
}

impl std::fmt::Debug for TemporaryCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemporaryCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("session_token", &"<redacted>")
            .field("expiration", &self.expiration)
            .finish()
    }
}

/// Issues temporary credentials for member accounts.
pub struct CredentialBroker {
    sts: Arc<dyn StsApi>,
    partition: String,
}

impl CredentialBroker {
    /// Create a broker for the standard `aws` partition.
    pub fn new(sts: Arc<dyn StsApi>) -> Self {
        Self::with_partition(sts, "aws")
    }

    pub fn with_partition(sts: Arc<dyn StsApi>, partition: impl Into<String>) -> Self {
        Self {
            sts,
            partition: partition.into(),
        }
    }

    /// ARN of the organization access role in `member_account_id`.
    pub fn role_arn(&self, member_account_id: &str) -> String {
        format!(
            "arn:{}:iam::{}:role/{}",
            self.partition, member_account_id, ORGANIZATION_ROLE_NAME
        )
    }

    /// Assume the organization access role in `member_account_id`.
    ///
    /// # Errors
    ///
    /// Provider refusals (access denied, unknown account) are returned as
    /// `Error::Remote` unchanged.
    pub async fn assume_role(&self, member_account_id: &str) -> Result<TemporaryCredentials, Error> {
        let role_arn = self.role_arn(member_account_id);
        tracing::debug!(role_arn = %role_arn, "Assuming role");

        let credentials = self.sts.assume_role(&role_arn, ROLE_SESSION_NAME).await?;

        tracing::info!(
            account_id = %member_account_id,
            access_key_id = %credentials.access_key_id,
            expiration = %credentials.expiration,
            "Issued temporary credentials"
        );
        Ok(credentials)
    }
}
