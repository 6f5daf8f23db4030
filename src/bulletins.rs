//! Near-real-time bulletin fetching: probes the remote mirror for one
//! b-deck file per storm number of the season, in bounded concurrent
//! batches. A missing file, a timeout, or a non-success response means
//! that number is simply absent this cycle; sibling fetches continue.

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn, Instrument};

use crate::bdeck::{self, INVEST_RANGE};
use crate::fetch::{fetch_text, BasicClient, HttpClient};
use crate::model::RawFix;

/// Default mirror for open b-deck files.
pub const DEFAULT_BASE_URL: &str = "https://hurricanes.ral.ucar.edu/repository/data/bdecks_open";

/// One storm found on the mirror.
#[derive(Debug, Clone)]
pub struct BulletinStorm {
    pub id: String,
    pub number: u32,
    pub season: i32,
    pub fixes: Vec<RawFix>,
}

fn bdeck_url(base_url: &str, number: u32, season: i32) -> String {
    format!("{}/{}/b{}.dat", base_url, season, bdeck::storm_id(number, season))
}

/// Probes storm numbers `1..=max_number` (invests 90–99 always excluded)
/// and returns the storms whose bulletins exist and parse. Failed probes
/// are logged and skipped; no retries.
pub async fn fetch_season_bulletins(
    base_url: &str,
    season: i32,
    max_number: u32,
    concurrency: usize,
) -> Result<Vec<BulletinStorm>> {
    let client = Arc::new(BasicClient::new());
    fetch_season_bulletins_with(client, base_url, season, max_number, concurrency).await
}

/// Same as [`fetch_season_bulletins`] but over an explicit client, which
/// is what tests stub out.
pub async fn fetch_season_bulletins_with<C>(
    client: Arc<C>,
    base_url: &str,
    season: i32,
    max_number: u32,
    concurrency: usize,
) -> Result<Vec<BulletinStorm>>
where
    C: HttpClient + 'static,
{
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut tasks = Vec::new();

    for number in (1..=max_number).filter(|n| !INVEST_RANGE.contains(n)) {
        let sem = semaphore.clone();
        let client = client.clone();
        let url = bdeck_url(base_url, number, season);
        let span = tracing::debug_span!("fetch_bdeck", number, season);

        tasks.push(tokio::spawn(
            async move {
                let _permit = sem.acquire().await.ok()?;
                match fetch_text(client.as_ref(), &url).await {
                    Ok(contents) => {
                        let fixes = bdeck::parse_bdeck(&contents, number, season);
                        if fixes.is_empty() {
                            return None;
                        }
                        Some(BulletinStorm {
                            id: bdeck::storm_id(number, season),
                            number,
                            season,
                            fixes,
                        })
                    }
                    Err(e) => {
                        debug!(error = %e, "bulletin absent");
                        None
                    }
                }
            }
            .instrument(span),
        ));
    }

    let mut storms = Vec::new();
    for task in tasks {
        match task.await {
            Ok(Some(storm)) => storms.push(storm),
            Ok(None) => {}
            Err(e) => warn!(error = %e, "bulletin fetch task panicked"),
        }
    }
    storms.sort_by_key(|s| s.number);

    info!(
        season,
        probed = max_number,
        found = storms.len(),
        "bulletin probe complete"
    );
    Ok(storms)
}
