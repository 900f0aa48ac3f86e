//! Caller-side timeout helper; the gateway itself never times out.

use std::future::Future;
use std::time::Duration;

use crate::error::{ClientError, Result};

/// Wrap a future with a timeout, if one is configured.
///
/// An elapsed timeout abandons the future, which also releases any
/// resource claim it held.
pub async fn with_timeout<T>(
    duration: Option<Duration>,
    future: impl Future<Output = Result<T>>,
) -> Result<T> {
    let Some(duration) = duration else {
        return future.await;
    };
    match tokio::time::timeout(duration, future).await {
        Ok(result) => result,
        Err(_) => Err(ClientError::Timeout(duration.as_millis() as u64)),
    }
}
