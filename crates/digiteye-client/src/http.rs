//! reqwest-backed client for the classification service.

use std::time::Duration;

use async_trait::async_trait;
use digiteye_core::config::Config;
use digiteye_core::{Ack, DrawingRecord, HealthStatus, NewDrawing, Page, PixelGrid, PredictionResult};
use reqwest::{Response, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::Classifier;
use crate::error::ClientError;

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Serialize)]
struct PredictRequest<'a> {
    pixels: &'a PixelGrid,
}

/// Stateless client: every call is a single request, never retried.
#[derive(Debug, Clone)]
pub struct PredictionClient {
    base_url: Url,
    client: reqwest::Client,
}

impl PredictionClient {
    /// `base_url` is the API root, e.g. `http://127.0.0.1:8000/api`.
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, None)
    }

    pub fn with_timeout(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let base_url = parse_base_url(base_url)?;
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;
        Ok(Self { base_url, client })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::with_timeout(&config.api_base(), config.request_timeout())
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url(), path.trim_start_matches('/'))
    }

    /// Submit a grid for classification.
    pub async fn predict(&self, grid: &PixelGrid) -> Result<PredictionResult> {
        let url = self.endpoint("predict");
        debug!(%url, lit = grid.lit_cells().count(), "Submitting prediction");

        let resp = self
            .client
            .post(&url)
            .json(&PredictRequest { pixels: grid })
            .send()
            .await?;
        let result: PredictionResult = read_json(resp).await?;
        result.validate().map_err(ClientError::MalformedResponse)?;

        info!(
            digit = result.predicted_digit,
            confidence = result.confidence,
            "Prediction received"
        );
        Ok(result)
    }

    /// One page of stored drawings. No caching.
    pub async fn list_drawings(&self, page: Page) -> Result<Vec<DrawingRecord>> {
        let url = self.endpoint("drawings");
        let resp = self
            .client
            .get(&url)
            .query(&[("limit", page.limit), ("offset", page.offset)])
            .send()
            .await?;
        let drawings: Vec<DrawingRecord> = read_json(resp).await?;
        debug!(count = drawings.len(), ?page, "Listed drawings");
        Ok(drawings)
    }

    pub async fn get_drawing(&self, id: i64) -> Result<DrawingRecord> {
        let resp = self
            .client
            .get(self.endpoint(&format!("drawings/{id}")))
            .send()
            .await?;
        read_json(resp).await
    }

    /// Upload a labelled sample.
    pub async fn create_drawing(&self, drawing: &NewDrawing) -> Result<DrawingRecord> {
        let resp = self
            .client
            .post(self.endpoint("drawings"))
            .json(drawing)
            .send()
            .await?;
        let record: DrawingRecord = read_json(resp).await?;
        info!(id = record.id, label = drawing.label, "Drawing uploaded");
        Ok(record)
    }

    pub async fn delete_drawing(&self, id: i64) -> Result<Ack> {
        let resp = self
            .client
            .delete(self.endpoint(&format!("drawings/{id}")))
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(error_from_response(resp).await);
        }
        let body = resp.bytes().await?;
        let ack = if body.iter().all(u8::is_ascii_whitespace) {
            Ack::default()
        } else {
            serde_json::from_slice(&body)
                .map_err(|e| ClientError::MalformedResponse(e.to_string()))?
        };
        info!(id, "Drawing deleted");
        Ok(ack)
    }

    /// Service liveness. The health route sits at the origin, outside the API prefix.
    pub async fn health(&self) -> Result<HealthStatus> {
        let url = self
            .base_url
            .join("/health")
            .map_err(|e| ClientError::InvalidUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })?;
        let resp = self.client.get(url).send().await?;
        read_json(resp).await
    }
}

#[async_trait]
impl Classifier for PredictionClient {
    async fn predict(&self, grid: &PixelGrid) -> Result<PredictionResult> {
        PredictionClient::predict(self, grid).await
    }
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let invalid = |reason: String| ClientError::InvalidUrl {
        url: raw.to_string(),
        reason,
    };
    let url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(invalid("query and fragment are not allowed".into()));
    }
    Ok(url)
}

async fn error_from_response(resp: Response) -> ClientError {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    let err = ClientError::from_status(status.as_u16(), &body);
    warn!(status = status.as_u16(), error = %err, "Request rejected by service");
    err
}

async fn read_json<T: DeserializeOwned>(resp: Response) -> Result<T> {
    if !resp.status().is_success() {
        return Err(error_from_response(resp).await);
    }
    let body = resp.bytes().await?;
    serde_json::from_slice(&body).map_err(|e| ClientError::MalformedResponse(e.to_string()))
}
