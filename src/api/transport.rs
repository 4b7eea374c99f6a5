//! Signed HTTPS transport shared by the budgets and STS clients.

use chrono::Utc;
use reqwest::Client;
use url::Url;

use super::signer::{SignatureV4, SigningCredentials};
use crate::error::Error;

/// Undecoded response from a signed call.
#[derive(Debug)]
pub(crate) struct RawResponse {
    pub status: u16,
    /// `x-amzn-ErrorType` header, when the provider sent one
    pub error_type: Option<String>,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// One endpoint of one service, signed with one set of credentials.
pub(crate) struct AwsTransport {
    client: Client,
    credentials: SigningCredentials,
    endpoint: Url,
    signing_region: String,
    service: &'static str,
}

impl AwsTransport {
    pub fn new(
        credentials: SigningCredentials,
        endpoint: &str,
        signing_region: impl Into<String>,
        service: &'static str,
    ) -> Result<Self, Error> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| Error::Transport(format!("Invalid endpoint '{}': {}", endpoint, e)))?;
        if endpoint.host_str().is_none() {
            return Err(Error::Transport(format!(
                "Endpoint '{}' has no host",
                endpoint
            )));
        }
        Ok(Self {
            client: Client::new(),
            credentials,
            endpoint,
            signing_region: signing_region.into(),
            service,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// POST `body` to the endpoint root with `headers`, signed.
    pub async fn post(
        &self,
        headers: &[(&str, String)],
        body: Vec<u8>,
    ) -> Result<RawResponse, Error> {
        let signer = SignatureV4::new(&self.credentials, &self.signing_region, self.service);
        let auth_headers = signer.sign("POST", &self.endpoint, headers, &body, Utc::now());

        let mut request = self.client.post(self.endpoint.clone());
        for (name, value) in headers {
            request = request.header(*name, value);
        }
        for (name, value) in &auth_headers {
            request = request.header(*name, value);
        }

        let response = match request.body(body).send().await {
            Ok(r) => r,
            Err(e) => {
                if e.is_timeout() {
                    return Err(Error::Transport(format!("Request timeout: {}", e)));
                } else if e.is_connect() {
                    return Err(Error::Transport(format!("Connection failed: {}", e)));
                } else {
                    return Err(Error::Transport(format!("Request failed: {}", e)));
                }
            }
        };

        let status = response.status().as_u16();
        let error_type = response
            .headers()
            .get("x-amzn-errortype")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response
            .text()
            .await
            .map_err(|e| Error::Transport(format!("Failed to read response body: {}", e)))?;

        tracing::debug!(
            service = self.service,
            status,
            bytes = body.len(),
            "Received response"
        );

        Ok(RawResponse {
            status,
            error_type,
            body,
        })
    }
}
