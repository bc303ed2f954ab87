//! Trait for the external house-price prediction service.

use crate::error::PredictionError;
use crate::form::PredictionRequest;
use crate::model::PredictionResult;

/// Abstraction over a prediction provider.
///
/// One call is one request: implementations do not retry, and any failure
/// (transport, status, payload, timeout) is reported as [`PredictionError`].
#[async_trait::async_trait]
pub trait PredictionApi: Send + Sync {
    /// Predicts the price of the described property.
    async fn predict(&self, request: &PredictionRequest) -> Result<PredictionResult, PredictionError>;
}
