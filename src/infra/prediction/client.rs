use async_trait::async_trait;
use reqwest::Url;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::PredictionError;
use crate::fetch::{BasicClient, HttpClient, post_json};
use crate::form::PredictionRequest;
use crate::model::PredictionResult;
use crate::services::prediction_api::PredictionApi;

/// Longest error body kept in a [`PredictionError::Status`].
const MAX_ERROR_BODY: usize = 512;

/// HTTP client for the `POST /predict` endpoint.
pub struct PredictionClient<C> {
    http: C,
    endpoint: Url,
    timeout: Duration,
}

impl PredictionClient<BasicClient> {
    pub fn from_config(config: &Config) -> Result<Self, PredictionError> {
        let http = BasicClient::with_timeouts(config.timeout, config.connect_timeout)?;
        Self::new(http, &config.endpoint, config.timeout)
    }
}

impl<C: HttpClient> PredictionClient<C> {
    pub fn new(http: C, endpoint: &str, timeout: Duration) -> Result<Self, PredictionError> {
        let endpoint =
            Url::parse(endpoint).map_err(|_| PredictionError::InvalidEndpoint(endpoint.to_string()))?;
        Ok(Self {
            http,
            endpoint,
            timeout,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl<C: HttpClient> PredictionApi for PredictionClient<C> {
    #[tracing::instrument(skip_all, fields(endpoint = %self.endpoint))]
    async fn predict(&self, request: &PredictionRequest) -> Result<PredictionResult, PredictionError> {
        let body =
            serde_json::to_vec(request).map_err(|e| PredictionError::Encode(e.to_string()))?;

        let started = Instant::now();
        let (status, bytes) =
            match tokio::time::timeout(self.timeout, post_json(&self.http, &self.endpoint, body)).await {
                Err(_) => return Err(PredictionError::Timeout(self.timeout)),
                Ok(Err(e)) if e.is_timeout() => return Err(PredictionError::Timeout(self.timeout)),
                Ok(result) => result?,
            };
        let elapsed = started.elapsed();

        if !status.is_success() {
            let body = String::from_utf8_lossy(&bytes[..bytes.len().min(MAX_ERROR_BODY)]).into_owned();
            warn!(status = status.as_u16(), "Prediction service rejected request");
            return Err(PredictionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        debug!(bytes = bytes.len(), elapsed_ms = elapsed.as_millis() as u64, "Prediction payload received");
        let result = PredictionResult::from_slice(&bytes)?;

        info!(
            predicted_price = result.predicted_price,
            distance_km = result.distance_to_city_km,
            comparables = result.recommended_properties.longitude.len(),
            "Prediction received"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::complete_form;
    use crate::model::SAMPLE_RESPONSE;
    use std::sync::Mutex;

    /// Replies with a fixed status and body, recording each request body.
    struct Scripted {
        status: u16,
        body: String,
        delay: Duration,
        seen: Mutex<Vec<(String, Vec<u8>)>>,
    }

    impl Scripted {
        fn new(status: u16, body: &str) -> Self {
            Self {
                status,
                body: body.to_string(),
                delay: Duration::ZERO,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl HttpClient for Scripted {
        async fn execute(&self, req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
            let body = req
                .body()
                .and_then(|b| b.as_bytes())
                .map(|b| b.to_vec())
                .unwrap_or_default();
            self.seen
                .lock()
                .unwrap()
                .push((req.method().to_string(), body));

            tokio::time::sleep(self.delay).await;
            let resp = http::Response::builder()
                .status(self.status)
                .body(self.body.clone())
                .unwrap();
            Ok(reqwest::Response::from(resp))
        }
    }

    fn client(transport: Scripted) -> PredictionClient<Scripted> {
        PredictionClient::new(transport, "http://localhost:8000/predict", Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_predict_success_posts_form() {
        let c = client(Scripted::new(200, SAMPLE_RESPONSE));
        let request = complete_form().submit().unwrap();

        let result = c.predict(&request).await.unwrap();
        assert_eq!(result.predicted_price, 750000.0);

        let seen = c.http.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, "POST");
        let sent: serde_json::Value = serde_json::from_slice(&seen[0].1).unwrap();
        assert_eq!(sent["houseType"], "House");
        assert_eq!(sent["bedrooms"], "3");
    }

    #[tokio::test]
    async fn test_predict_non_2xx_is_error() {
        let c = client(Scripted::new(500, r#"{"detail":"No results found"}"#));
        let request = complete_form().submit().unwrap();

        match c.predict(&request).await {
            Err(PredictionError::Status { status, body }) => {
                assert_eq!(status, 500);
                assert!(body.contains("No results found"));
            }
            other => panic!("expected status error, got {other:?}"),
        }
        assert_eq!(c.http.seen.lock().unwrap().len(), 1, "no retry");
    }

    #[tokio::test]
    async fn test_predict_malformed_payload() {
        let c = client(Scripted::new(200, r#"{"predicted_price": "lots"}"#));
        let request = complete_form().submit().unwrap();

        assert!(matches!(
            c.predict(&request).await,
            Err(PredictionError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn test_predict_times_out() {
        let mut transport = Scripted::new(200, SAMPLE_RESPONSE);
        transport.delay = Duration::from_secs(10);
        let c = PredictionClient::new(transport, "http://localhost:8000/predict", Duration::from_millis(50)).unwrap();
        let request = complete_form().submit().unwrap();

        assert!(matches!(
            c.predict(&request).await,
            Err(PredictionError::Timeout(_))
        ));
    }

    #[test]
    fn test_invalid_endpoint() {
        let result = PredictionClient::new(Scripted::new(200, ""), "not a url", Duration::from_secs(1));
        assert!(matches!(result, Err(PredictionError::InvalidEndpoint(_))));
    }
}
