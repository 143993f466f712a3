use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{StatusCode, Url};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

use crate::credential::Credential;
use crate::models::ProductionReport;

pub mod handle;
#[cfg(test)]
pub(crate) mod testing;

pub use handle::DeviceHandle;

const PRODUCTION_PATH: &str = "production.json";
const PRODUCTION_QUERY: &str = "details=1";

#[derive(Error, Debug)]
pub enum DeviceError {
    #[error("Invalid device target {0:?}")]
    InvalidTarget(String),
    #[error("Token can not be used as an HTTP header value")]
    InvalidCredential,
    #[error("Unable to build HTTPS client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Device answered with HTTP {0}")]
    Status(StatusCode),
    #[error("Unable to decode production report: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("No answer within {0:?}")]
    Timeout(Duration),
}

/// Source of production reports, the Envoy itself or a stand-in for tests.
pub trait DeviceClient: Send + Sync + 'static {
    fn fetch_production(&self) -> impl Future<Output = Result<ProductionReport, DeviceError>> + Send;
}

/// HTTPS client for one Envoy.
///
/// The gateway serves a self-signed certificate on the local network, so
/// certificate validation is switched off for it. The token is sent as a
/// bearer header with every request.
#[derive(Debug, Clone)]
pub struct EnvoyClient {
    http: reqwest::Client,
    url: Url,
}

impl EnvoyClient {
    pub fn connect(target: &str, credential: &Credential, timeout: Duration) -> Result<Self, DeviceError> {
        let url = production_url(target)?;

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", credential.as_str()))
            .map_err(|_| DeviceError::InvalidCredential)?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .default_headers(headers)
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
            .map_err(DeviceError::Client)?;

        Ok(EnvoyClient { http, url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl DeviceClient for EnvoyClient {
    async fn fetch_production(&self) -> Result<ProductionReport, DeviceError> {
        debug!("GET {}", self.url);
        let response = self.http.get(self.url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DeviceError::Status(status));
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

/// Builds the report URL for a bare host (`envoy.local`, `192.168.1.20:443`)
/// or a base URL when the scheme is given explicitly.
pub fn production_url(target: &str) -> Result<Url, DeviceError> {
    let target = target.trim().trim_end_matches('/');
    let base = if target.starts_with("https://") || target.starts_with("http://") {
        format!("{target}/")
    } else {
        format!("https://{target}/")
    };

    let mut url = Url::parse(&base)
        .and_then(|base| base.join(PRODUCTION_PATH))
        .map_err(|_| DeviceError::InvalidTarget(target.to_string()))?;

    if url.host_str().map_or(true, str::is_empty) {
        return Err(DeviceError::InvalidTarget(target.to_string()));
    }

    url.set_query(Some(PRODUCTION_QUERY));
    Ok(url)
}
