//! HTTP plumbing for the bulletin mirror.

mod basic;
mod client;

pub use basic::BasicClient;
pub use client::HttpClient;

use anyhow::{bail, Result};

/// Fetches a text resource. A non-success status is an error; callers in
/// the bulletin path treat any error as "this storm number is absent".
pub async fn fetch_text<C: HttpClient>(client: &C, url: &str) -> Result<String> {
    let req = reqwest::Request::new(reqwest::Method::GET, url.parse()?);
    let resp = client.execute(req).await?;
    if !resp.status().is_success() {
        bail!("request for {url} failed with status {}", resp.status());
    }
    Ok(resp.text().await?)
}
