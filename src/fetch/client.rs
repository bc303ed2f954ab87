use async_trait::async_trait;
use reqwest::{Request, Response};

/// Transport used by the prediction client.
///
/// Implemented by [`BasicClient`](super::BasicClient) for real traffic and by
/// scripted fakes in tests.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}
