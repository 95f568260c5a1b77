use anyhow::{Context, Result};
use reqwest::Client;
use reqwest::redirect::Policy;
use tokio::sync::mpsc::Sender;
use tokio::time::Instant;
use tracing::{debug, warn};

use super::{RequestOutcome, Target};

/// Issues one GET against `target` and sends exactly one outcome on `tx`,
/// whatever happens along the way.
pub async fn probe_http(slot: usize, target: Target, tx: Sender<RequestOutcome>) {
    let start = Instant::now();
    let result = fetch(&target).await;
    let elapsed = start.elapsed();

    let error = match result {
        Ok(()) => {
            debug!("http probe {} success: {:?}", target, elapsed);
            None
        }
        Err(e) => {
            warn!("http probe {} failed after {:?}: {:#}", target, elapsed, e);
            Some(e)
        }
    };

    let outcome = RequestOutcome {
        slot,
        target,
        elapsed,
        error,
    };
    if let Err(e) = tx.send(outcome).await {
        debug!("round closed before {} reported", e.0.target);
    }
}

async fn fetch(target: &Target) -> Result<()> {
    // fresh client per request, no keep-alive between measurements
    let client = Client::builder()
        .redirect(Policy::none())
        .pool_max_idle_per_host(0)
        .build()
        .context("cannot create http client")?;

    let request = client
        .get(target.url().clone())
        .build()
        .context("cannot create http request")?;

    let mut resp = client
        .execute(request)
        .await
        .context("cannot launch request")?;

    while resp
        .chunk()
        .await
        .context("cannot read response body")?
        .is_some()
    {}

    Ok(())
}
