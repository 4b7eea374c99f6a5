//! AWS STS client over the query protocol, asking for JSON responses.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use serde_json::Value;

use super::signer::{uri_encode, SigningCredentials};
use super::transport::{AwsTransport, RawResponse};
use super::StsApi;
use crate::config::Config;
use crate::credentials::TemporaryCredentials;
use crate::error::{Error, RemoteApiError};

const SERVICE: &str = "sts";
const API_VERSION: &str = "2011-06-15";

/// STS client signing requests with SigV4.
pub struct StsHttpClient {
    transport: AwsTransport,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AssumeRoleEnvelope {
    assume_role_response: AssumeRoleResponse,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AssumeRoleResponse {
    assume_role_result: AssumeRoleResult,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AssumeRoleResult {
    credentials: WireCredentials,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireCredentials {
    access_key_id: String,
    secret_access_key: String,
    session_token: String,
    expiration: Value,
}

impl StsHttpClient {
    /// Create a client for the configured region's STS endpoint, or the
    /// configured override.
    pub fn new(config: &Config) -> Result<Self, Error> {
        Self::with_endpoint(
            config.signing_credentials(),
            &config.sts_endpoint(),
            config.region.clone(),
        )
    }

    pub fn with_endpoint(
        credentials: SigningCredentials,
        endpoint: &str,
        signing_region: impl Into<String>,
    ) -> Result<Self, Error> {
        Ok(Self {
            transport: AwsTransport::new(credentials, endpoint, signing_region, SERVICE)?,
        })
    }
}

/// Encode the form body of an AssumeRole call.
fn assume_role_form(role_arn: &str, session_name: &str) -> String {
    [
        ("Action", "AssumeRole"),
        ("RoleArn", role_arn),
        ("RoleSessionName", session_name),
        ("Version", API_VERSION),
    ]
    .iter()
    .map(|(k, v)| format!("{}={}", k, uri_encode(v)))
    .collect::<Vec<_>>()
    .join("&")
}

/// Expiration arrives as epoch seconds (JSON) or an ISO-8601 string.
fn parse_expiration(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => {
            let secs = n.as_f64()?;
            Utc.timestamp_opt(secs.trunc() as i64, 0).single()
        }
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|t| t.with_timezone(&Utc)),
        _ => None,
    }
}

/// Decode a query-protocol error body (`{"Error": {"Code", "Message"}}`,
/// optionally wrapped in `ErrorResponse`).
pub(crate) fn query_error(response: &RawResponse) -> RemoteApiError {
    let parsed: Value = serde_json::from_str(&response.body).unwrap_or(Value::Null);
    let error = parsed
        .get("ErrorResponse")
        .unwrap_or(&parsed)
        .get("Error");
    let code = error
        .and_then(|e| e.get("Code"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .or_else(|| response.error_type.clone())
        .unwrap_or_else(|| format!("HTTP{}", response.status));
    let message = error
        .and_then(|e| e.get("Message"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| response.body.clone());
    RemoteApiError::new(code, message).with_status(response.status)
}

fn decode_credentials(body: &str) -> Result<TemporaryCredentials, Error> {
    let envelope: AssumeRoleEnvelope = serde_json::from_str(body).map_err(|e| {
        Error::Transport(format!("Failed to parse AssumeRole response: {}", e))
    })?;
    let wire = envelope.assume_role_response.assume_role_result.credentials;
    let expiration = parse_expiration(&wire.expiration).ok_or_else(|| {
        Error::Transport(format!("Unrecognized credential expiration: {}", wire.expiration))
    })?;
    Ok(TemporaryCredentials {
        access_key_id: wire.access_key_id,
        secret_access_key: wire.secret_access_key,
        session_token: wire.session_token,
        expiration,
    })
}

#[async_trait]
impl StsApi for StsHttpClient {
    async fn assume_role(
        &self,
        role_arn: &str,
        session_name: &str,
    ) -> Result<TemporaryCredentials, Error> {
        let headers = [
            (
                "content-type",
                "application/x-www-form-urlencoded; charset=utf-8".to_string(),
            ),
            ("accept", "application/json".to_string()),
        ];
        let body = assume_role_form(role_arn, session_name).into_bytes();

        tracing::debug!(endpoint = %self.transport.endpoint(), "Calling STS AssumeRole");
        let response = self.transport.post(&headers, body).await?;
        if !response.is_success() {
            return Err(query_error(&response).into());
        }
        decode_credentials(&response.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::transport::test_server::serve_once;
    use crate::error::RemoteErrorKind;

    const ROLE_ARN: &str = "arn:aws:iam::123456789012:role/OrganizationAccountAccessRole";

    fn client(endpoint: &str) -> StsHttpClient {
        let credentials = SigningCredentials {
            access_key_id: "AKIDEXAMPLE".to_string(),
            secret_access_key: "secret".to_string(),
            session_token: Some("parent-token".to_string()),
        };
        StsHttpClient::with_endpoint(credentials, endpoint, "us-west-2").unwrap()
    }

    #[tokio::test]
    async fn test_assume_role_request_shape() {
        let (endpoint, server) = serve_once(
            200,
            r#"{"AssumeRoleResponse":{"AssumeRoleResult":{"Credentials":{
                "AccessKeyId":"ASIAEXAMPLE","SecretAccessKey":"s","SessionToken":"t",
                "Expiration":1700000000}}}}"#,
        )
        .await;

        let creds = client(&endpoint)
            .assume_role(ROLE_ARN, "AssumeRoleSession1")
            .await
            .unwrap();
        assert_eq!(creds.access_key_id, "ASIAEXAMPLE");
        assert_eq!(creds.session_token, "t");
        assert_eq!(creds.expiration.timestamp(), 1_700_000_000);

        let request = server.await.unwrap();
        assert!(request.request_line.starts_with("POST / "));
        assert_eq!(
            request.header("content-type"),
            Some("application/x-www-form-urlencoded; charset=utf-8")
        );
        assert_eq!(request.header("accept"), Some("application/json"));
        assert_eq!(request.header("x-amz-security-token"), Some("parent-token"));
        let authorization = request.header("authorization").unwrap();
        assert!(authorization.contains("/us-west-2/sts/aws4_request"));
        assert!(authorization
            .contains("SignedHeaders=accept;content-type;host;x-amz-date;x-amz-security-token"));
        assert_eq!(
            request.body,
            assume_role_form(ROLE_ARN, "AssumeRoleSession1")
        );
    }

    #[tokio::test]
    async fn test_assume_role_error_body() {
        let (endpoint, server) = serve_once(
            403,
            r#"{"Error":{"Code":"AccessDenied","Message":"not authorized to perform sts:AssumeRole"}}"#,
        )
        .await;

        let err = client(&endpoint)
            .assume_role(ROLE_ARN, "AssumeRoleSession1")
            .await
            .unwrap_err();
        assert!(err.is_access_denied());
        assert_eq!(err.remote().unwrap().status_code, Some(403));
        server.await.unwrap();
    }

    #[test]
    fn test_form_body_is_encoded() {
        let form = assume_role_form(
            "arn:aws:iam::123456789012:role/OrganizationAccountAccessRole",
            "AssumeRoleSession1",
        );
        assert_eq!(
            form,
            "Action=AssumeRole\
             &RoleArn=arn%3Aaws%3Aiam%3A%3A123456789012%3Arole%2FOrganizationAccountAccessRole\
             &RoleSessionName=AssumeRoleSession1\
             &Version=2011-06-15"
        );
    }

    #[test]
    fn test_decode_credentials_epoch_expiration() {
        let creds = decode_credentials(
            r#"{"AssumeRoleResponse":{"AssumeRoleResult":{
                "AssumedRoleUser":{"Arn":"arn:aws:sts::123456789012:assumed-role/R/S","AssumedRoleId":"AROA:S"},
                "Credentials":{"AccessKeyId":"ASIAEXAMPLE","SecretAccessKey":"secret",
                               "SessionToken":"token","Expiration":1.7e9}},
                "ResponseMetadata":{"RequestId":"r"}}}"#,
        )
        .unwrap();
        assert_eq!(creds.access_key_id, "ASIAEXAMPLE");
        assert_eq!(creds.expiration.timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_decode_credentials_iso_expiration() {
        let creds = decode_credentials(
            r#"{"AssumeRoleResponse":{"AssumeRoleResult":{"Credentials":{
                "AccessKeyId":"A","SecretAccessKey":"S","SessionToken":"T",
                "Expiration":"2024-01-01T12:00:00Z"}}}}"#,
        )
        .unwrap();
        assert_eq!(creds.expiration.to_rfc3339(), "2024-01-01T12:00:00+00:00");
    }

    #[test]
    fn test_query_error_access_denied() {
        let err = query_error(&RawResponse {
            status: 403,
            error_type: None,
            body: r#"{"Error":{"Code":"AccessDenied","Message":"not authorized","Type":"Sender"},"RequestId":"r"}"#
                .to_string(),
        });
        assert_eq!(err.kind, RemoteErrorKind::AccessDenied);
        assert_eq!(err.message, "not authorized");
    }

    #[test]
    fn test_query_error_wrapped() {
        let err = query_error(&RawResponse {
            status: 400,
            error_type: None,
            body: r#"{"ErrorResponse":{"Error":{"Code":"ValidationError","Message":"bad arn"}}}"#
                .to_string(),
        });
        assert_eq!(err.kind, RemoteErrorKind::Validation);
        assert_eq!(err.code, "ValidationError");
    }
}
