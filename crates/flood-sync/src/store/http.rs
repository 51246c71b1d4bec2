use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::config::StoreConfig;
use crate::workflows::validation::{
    NewReport, Report, ReportId, ReportStore, SensorReading, SensorStore, StoreError,
};

/// Shared HTTP client for a json-server style store.
#[derive(Debug, Clone)]
pub struct StoreClient {
    http: Client,
    base_url: String,
}

impl StoreClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, StoreError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| StoreError::Unavailable(format!("http client error: {err}")))?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { http, base_url })
    }

    pub fn from_config(config: &StoreConfig) -> Result<Option<Self>, StoreError> {
        config
            .base_url
            .as_deref()
            .map(|url| Self::new(url, config.timeout))
            .transpose()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Base URL extended by `segments`, each percent-encoded as one path
    /// segment.
    fn url(&self, segments: &[&str]) -> Result<Url, StoreError> {
        let invalid = || StoreError::Unavailable(format!("invalid store url '{}'", self.base_url));
        let mut url = Url::parse(&self.base_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

/// Report store reached over `/reports`.
#[derive(Debug, Clone)]
pub struct HttpReportStore {
    client: StoreClient,
}

impl HttpReportStore {
    pub fn new(client: StoreClient) -> Self {
        Self { client }
    }
}

/// Read-only sensor feed reached over `/sensors`.
#[derive(Debug, Clone)]
pub struct HttpSensorStore {
    client: StoreClient,
}

impl HttpSensorStore {
    pub fn new(client: StoreClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ReportStore for HttpReportStore {
    async fn list(&self) -> Result<Vec<Report>, StoreError> {
        let response = self
            .client
            .http
            .get(self.client.url(&["reports"])?)
            .send()
            .await
            .map_err(transport_error)?;
        decode(response).await
    }

    async fn create(&self, report: NewReport) -> Result<Report, StoreError> {
        let response = self
            .client
            .http
            .post(self.client.url(&["reports"])?)
            .json(&report)
            .send()
            .await
            .map_err(transport_error)?;
        decode(response).await
    }

    async fn update(&self, id: &ReportId, report: Report) -> Result<Report, StoreError> {
        let response = self
            .client
            .http
            .put(self.client.url(&["reports", &id.0])?)
            .json(&report)
            .send()
            .await
            .map_err(transport_error)?;
        decode(response).await
    }

    async fn fetch(&self, id: &ReportId) -> Result<Option<Report>, StoreError> {
        let response = self
            .client
            .http
            .get(self.client.url(&["reports", &id.0])?)
            .send()
            .await
            .map_err(transport_error)?;
        match decode(response).await {
            Ok(report) => Ok(Some(report)),
            Err(StoreError::NotFound) => Ok(None),
            Err(err) => Err(err),
        }
    }
}

#[async_trait]
impl SensorStore for HttpSensorStore {
    async fn list(&self) -> Result<Vec<SensorReading>, StoreError> {
        let response = self
            .client
            .http
            .get(self.client.url(&["sensors"])?)
            .send()
            .await
            .map_err(transport_error)?;
        decode(response).await
    }
}

fn transport_error(err: reqwest::Error) -> StoreError {
    if err.is_timeout() {
        StoreError::Unavailable(format!("request timed out: {err}"))
    } else {
        StoreError::Unavailable(format!("request failed: {err}"))
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, StoreError> {
    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        return Err(StoreError::NotFound);
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(StoreError::Unavailable(format!("status {status}: {body}")));
    }
    response
        .json::<T>()
        .await
        .map_err(|err| StoreError::Decode(err.to_string()))
}
