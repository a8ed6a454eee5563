//! Checks on downloaded files
//!
//! `exists` and `contains_text` are plain queries; the caller decides
//! whether a negative answer is a failure. `wait_for_file` is the only
//! polling helper and is bounded by an explicit timeout.

use std::path::Path;
use std::time::{Duration, Instant};

use tokio::time::sleep;
use tracing::debug;

use crate::error::{E2eError, E2eResult};

pub async fn exists(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false)
}

/// Read the whole file and search it for `text`
pub async fn contains_text(path: &Path, text: &str) -> E2eResult<bool> {
    let bytes = tokio::fs::read(path).await?;
    let content = String::from_utf8_lossy(&bytes);
    Ok(content.contains(text))
}

/// Poll until `path` exists, every `interval`, for at most `timeout`
pub async fn wait_for_file(path: &Path, timeout: Duration, interval: Duration) -> E2eResult<()> {
    let start = Instant::now();
    let mut attempts = 0usize;

    loop {
        attempts += 1;
        if exists(path).await {
            debug!("{} present after {} check(s)", path.display(), attempts);
            return Ok(());
        }
        if start.elapsed() >= timeout {
            return Err(E2eError::Timeout(format!(
                "file {} after {:?}",
                path.display(),
                timeout
            )));
        }
        sleep(interval).await;
    }
}

/// Fail with `FileMissing` unless the file exists
pub async fn assert_exists(path: &Path) -> E2eResult<()> {
    if exists(path).await {
        Ok(())
    } else {
        Err(E2eError::FileMissing(path.to_path_buf()))
    }
}

/// Fail with `TextNotFound` unless the file contains `text`
pub async fn assert_contains_text(path: &Path, text: &str) -> E2eResult<()> {
    if !exists(path).await {
        return Err(E2eError::FileMissing(path.to_path_buf()));
    }
    if contains_text(path, text).await? {
        Ok(())
    } else {
        Err(E2eError::TextNotFound {
            path: path.to_path_buf(),
            text: text.to_string(),
        })
    }
}
