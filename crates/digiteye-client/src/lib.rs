//! Prediction client for the DigitEye classification service.
//!
//! [`PredictionClient`] speaks the service's HTTP contract. Callers that only
//! need classification depend on the [`Classifier`] trait instead.

use async_trait::async_trait;
use digiteye_core::{PixelGrid, PredictionResult};

pub mod error;
pub mod http;

pub use error::{ClientError, FailureKind};
pub use http::PredictionClient;

/// Anything that can classify a pixel grid.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Issue exactly one classification request for `grid`.
    async fn predict(&self, grid: &PixelGrid) -> Result<PredictionResult, ClientError>;
}
