//! Application reachability check run before any browser is started

use std::time::{Duration, Instant};

use tokio::time::sleep;
use tracing::{info, warn};

use crate::error::{E2eError, E2eResult};

const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Poll `url` until it answers or `timeout` elapses
pub async fn wait_until_reachable(url: &str, timeout: Duration) -> E2eResult<()> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .danger_accept_invalid_certs(true)
        .build()?;

    let start = Instant::now();
    let mut attempts = 0;

    loop {
        attempts += 1;

        match client.get(url).send().await {
            Ok(resp) if resp.status().is_success() || resp.status().is_redirection() => {
                info!("Back office reachable at {} ({})", url, resp.status());
                return Ok(());
            }
            Ok(resp) => {
                warn!("Health check returned {}", resp.status());
            }
            Err(e) => {
                if attempts == 1 {
                    info!("Waiting for back office at {}...", url);
                }
                if !e.is_connect() {
                    warn!("Health check error: {}", e);
                }
            }
        }

        if start.elapsed() + POLL_INTERVAL >= timeout {
            break;
        }
        sleep(POLL_INTERVAL).await;
    }

    Err(E2eError::ApplicationUnreachable {
        url: url.to_string(),
        attempts,
    })
}
