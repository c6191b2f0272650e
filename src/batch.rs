use std::future::Future;
use std::time::Duration;

use futures::future::join_all;
use tracing::debug;

use crate::error::Result;

/// Fetches `ids` in fixed-size windows. All fetches within a window run
/// concurrently and the window completes only once every one has settled; a
/// fixed delay separates consecutive windows to stay polite toward the shared
/// upstream service. Failed ids are logged and omitted from the result, so the
/// output may be shorter than the input and carries no ordering guarantee.
pub async fn fetch_windowed<T, F, Fut>(
    ids: &[u32],
    window: usize,
    delay: Duration,
    fetch: F,
) -> Vec<T>
where
    F: Fn(u32) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut results = Vec::with_capacity(ids.len());
    for (index, chunk) in ids.chunks(window.max(1)).enumerate() {
        if index > 0 {
            tokio::time::sleep(delay).await;
        }
        let settled = join_all(chunk.iter().map(|id| fetch(*id))).await;
        for (id, outcome) in chunk.iter().zip(settled) {
            match outcome {
                Ok(value) => results.push(value),
                Err(err) => debug!("dropping {id} from batch: {err}"),
            }
        }
    }
    results
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tokio::time::Instant;

    use super::*;
    use crate::error::Error;

    async fn ok_unless_two(id: u32) -> Result<u32> {
        if id == 2 {
            Err(Error::Status {
                status: 500,
                url: format!("https://example/pokemon/{id}"),
            })
        } else {
            Ok(id * 10)
        }
    }

    #[tokio::test]
    async fn failed_ids_are_omitted_without_aborting_the_window() {
        let results = fetch_windowed(&[1, 2, 3], 20, Duration::ZERO, ok_unless_two).await;
        assert_eq!(results, vec![10, 30]);
    }

    #[tokio::test]
    async fn empty_input_yields_empty_output() {
        let results =
            fetch_windowed(&[], 20, Duration::ZERO, |id| async move { Ok(id) }).await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn all_ids_are_fetched_across_windows() {
        let calls = AtomicUsize::new(0);
        let ids: Vec<u32> = (1..=45).collect();
        let results = fetch_windowed(&ids, 20, Duration::ZERO, |id| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move { Ok(id) }
        })
        .await;

        assert_eq!(results.len(), 45);
        assert_eq!(calls.load(Ordering::SeqCst), 45);
    }

    #[tokio::test(start_paused = true)]
    async fn delay_runs_between_windows_but_not_before_the_first() {
        let started = Instant::now();
        let ids: Vec<u32> = (1..=5).collect();
        fetch_windowed(&ids, 2, Duration::from_millis(50), |id| async move { Ok(id) })
            .await;

        // Three windows of two, two inter-window delays.
        assert_eq!(started.elapsed(), Duration::from_millis(100));
    }
}
