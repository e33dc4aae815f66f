//! Deadlines for backend requests.

use std::future::Future;
use std::time::Duration;

use tracing::debug;

use crate::error::{ChatError, Result};

/// Run `future` to completion or fail with [`ChatError::Timeout`] once
/// `limit` has elapsed.
///
/// Only bounds the wrapped future. Streaming replies rely on the HTTP
/// client's per-read timeout instead, since a long reply is not a stall.
pub async fn with_timeout<T, F>(limit: Duration, future: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    let Ok(result) = tokio::time::timeout(limit, future).await else {
        let millis = u64::try_from(limit.as_millis()).unwrap_or(u64::MAX);
        debug!(timeout_ms = millis, "request deadline elapsed");
        return Err(ChatError::Timeout(millis));
    };
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn elapsed_deadline_maps_to_timeout_error() {
        let result: Result<()> = with_timeout(Duration::from_millis(250), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<(), ChatError>(())
        })
        .await;
        assert!(matches!(result, Err(ChatError::Timeout(250))));
    }

    #[tokio::test]
    async fn inner_result_passes_through() {
        let result = with_timeout(Duration::from_secs(1), async { Ok::<_, ChatError>(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }
}
