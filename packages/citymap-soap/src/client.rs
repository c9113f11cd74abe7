use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::envelope::{build_envelope, extract_tag, IMAGE_TAG};
use crate::service::{MapRequest, MapService, ServiceOutcome, SoapError};

pub const DEFAULT_ENDPOINT: &str = "http://cutmap-api.azurewebsites.net/ServiceCityMap";
pub const NAMESPACE: &str = "http://citymapsoap.com/service/";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Connection settings for [`SoapMapClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub endpoint: String,
    pub namespace: String,
    pub timeout: Duration,
    /// Sent as the `SOAPAction` header when set. The service does not need it.
    pub soap_action: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            namespace: NAMESPACE.to_string(),
            timeout: DEFAULT_TIMEOUT,
            soap_action: None,
        }
    }
}

/// [`MapService`] over SOAP 1.1 and HTTP.
pub struct SoapMapClient {
    config: ClientConfig,
    http: reqwest::Client,
}

impl SoapMapClient {
    pub fn new(config: ClientConfig) -> Result<Self, SoapError> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, http })
    }

    /// Request body for `request`, exactly as it is sent.
    pub fn envelope_for(&self, request: &MapRequest) -> String {
        build_envelope(&self.config.namespace, request.method(), &request.params())
    }

    async fn post_envelope(&self, envelope: String) -> Result<String, SoapError> {
        let mut builder = self
            .http
            .post(&self.config.endpoint)
            .header(reqwest::header::CONTENT_TYPE, "text/xml;charset=utf-8");
        if let Some(action) = &self.config.soap_action {
            builder = builder.header("SOAPAction", format!("\"{}\"", action));
        }

        let response = builder.body(envelope).send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!(status = status.as_u16(), "response dump:\n{}", body);

        if !status.is_success() {
            return Err(SoapError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }

    async fn request_image(&self, request: &MapRequest) -> Result<String, SoapError> {
        let envelope = self.envelope_for(request);
        debug!(method = request.method(), "request dump:\n{}", envelope);

        let body = self.post_envelope(envelope).await?;
        extract_tag(&body, IMAGE_TAG)
            .map(str::to_string)
            .ok_or(SoapError::MissingTag)
    }
}

#[async_trait]
impl MapService for SoapMapClient {
    async fn call(&self, request: MapRequest) -> ServiceOutcome {
        match self.request_image(&request).await {
            Ok(payload) => {
                debug!(method = request.method(), len = payload.len(), "received image payload");
                let outcome = ServiceOutcome::from_raw(payload);
                if let ServiceOutcome::Failure(message) = &outcome {
                    warn!(method = request.method(), "service reported: {}", message);
                }
                outcome
            }
            Err(err) => {
                warn!(method = request.method(), endpoint = %self.config.endpoint, "soap call failed: {}", err);
                ServiceOutcome::failure(err)
            }
        }
    }
}
