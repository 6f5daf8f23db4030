use async_trait::async_trait;
use reqwest::{Request, Response};

/// Seam over HTTP execution so the bulletin fetcher can be exercised
/// against a stub in tests.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}
