use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::{error, info};

use crate::board::{StatusBoard, StatusReport};
use crate::fetch::StatusFetcher;
use crate::region::Region;

/// One worker per region.
pub const WORKER_BUDGET: usize = Region::COUNT;

/// Fans the five region fetches out onto the runtime and joins them all.
///
/// There is no cancellation: every fetch runs until it answers or hits its
/// timeout, and a failing region never short-circuits its siblings. The
/// worker budget belongs to a single `fetch_all` call, so concurrent
/// invocations sharing one coordinator never wait on each other.
#[derive(Clone)]
pub struct FetchCoordinator {
    fetcher: StatusFetcher,
}

impl FetchCoordinator {
    pub fn new(fetcher: StatusFetcher) -> Self {
        Self { fetcher }
    }

    pub fn fetcher(&self) -> &StatusFetcher {
        &self.fetcher
    }

    pub async fn fetch_all(&self) -> StatusBoard {
        let workers = Arc::new(Semaphore::new(WORKER_BUDGET));
        let handles: Vec<_> = Region::ALL
            .into_iter()
            .map(|region| {
                let fetcher = self.fetcher.clone();
                let workers = Arc::clone(&workers);
                let handle = tokio::spawn(async move {
                    // A closed semaphore only means no budget is enforced.
                    let _permit = workers.acquire_owned().await.ok();
                    fetcher.fetch_status(region).await
                });
                (region, handle)
            })
            .collect();

        let mut reports = Vec::with_capacity(WORKER_BUDGET);
        for (region, handle) in handles {
            match handle.await {
                Ok(report) => reports.push(report),
                Err(join_error) => {
                    error!(
                        event_name = "status.fetch.worker_failed",
                        region = %region,
                        error = %join_error,
                        "status fetch worker terminated unexpectedly"
                    );
                    reports.push(StatusReport::failed(
                        region,
                        format!("status fetch worker failed: {join_error}"),
                    ));
                }
            }
        }

        let board = StatusBoard::from_reports(reports);
        info!(
            event_name = "status.fetch.completed",
            regions = Region::COUNT,
            failures = board.failures(),
            "status board collected"
        );
        board
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    use async_trait::async_trait;

    use crate::config::SourcesConfig;
    use crate::coordinator::{FetchCoordinator, WORKER_BUDGET};
    use crate::errors::FetchError;
    use crate::fetch::testing::MockSource;
    use crate::fetch::{StatusFetcher, StatusSource};
    use crate::region::Region;

    #[tokio::test]
    async fn collects_every_region_in_order() {
        let source = MockSource::default()
            .with(Region::Overall, Ok("testing"))
            .with(Region::Au, Ok("complete"))
            .with(Region::Ca, Err(FetchError::Transport("connection refused".to_owned())))
            .with(Region::Or, Ok("pr"))
            .with(Region::Us, Ok("building"));
        let coordinator =
            FetchCoordinator::new(StatusFetcher::new(Arc::new(source), SourcesConfig::default()));

        let board = coordinator.fetch_all().await;

        let regions: Vec<_> = board.iter().map(|report| report.region).collect();
        assert_eq!(regions, Region::ALL.to_vec());
        assert_eq!(board.get(Region::Overall).status_text(), Some("testing"));
        assert_eq!(board.get(Region::Ca).error_text(), Some("connection refused"));
        assert_eq!(board.get(Region::Us).status_text(), Some("building"));
        assert_eq!(board.failures(), 1);
    }

    #[tokio::test]
    async fn every_region_failing_still_yields_a_full_board() {
        let coordinator = FetchCoordinator::new(StatusFetcher::new(
            Arc::new(MockSource::default()),
            SourcesConfig::default(),
        ));

        let board = coordinator.fetch_all().await;

        assert_eq!(board.iter().count(), Region::COUNT);
        assert_eq!(board.failures(), Region::COUNT);
    }

    struct SlowSource {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl StatusSource for SlowSource {
        async fn get_text(&self, url: &str) -> Result<String, FetchError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(50)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            if url.ends_with("deploy-or") {
                Err(FetchError::Timeout { timeout_secs: 10 })
            } else {
                Ok("complete".to_owned())
            }
        }
    }

    #[tokio::test]
    async fn fetches_run_concurrently_within_worker_budget() {
        let source =
            Arc::new(SlowSource { in_flight: AtomicUsize::new(0), peak: AtomicUsize::new(0) });
        let coordinator = FetchCoordinator::new(StatusFetcher::new(
            Arc::clone(&source) as Arc<dyn StatusSource>,
            SourcesConfig::default(),
        ));

        let board = coordinator.fetch_all().await;

        let peak = source.peak.load(Ordering::SeqCst);
        assert!(peak > 1, "fetches should overlap, peak was {peak}");
        assert!(peak <= WORKER_BUDGET, "peak {peak} exceeded worker budget");
        assert_eq!(board.get(Region::Or).error_text(), Some("request timed out after 10s"));
        assert_eq!(board.get(Region::Au).status_text(), Some("complete"));
    }

    struct SleepySource;

    #[async_trait]
    impl StatusSource for SleepySource {
        async fn get_text(&self, _url: &str) -> Result<String, FetchError> {
            tokio::time::sleep(Duration::from_millis(300)).await;
            Ok("complete".to_owned())
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_invocations_do_not_share_worker_budget() {
        let coordinator = FetchCoordinator::new(StatusFetcher::new(
            Arc::new(SleepySource),
            SourcesConfig::default(),
        ));

        let started = Instant::now();
        let (first, second, third) =
            tokio::join!(coordinator.fetch_all(), coordinator.fetch_all(), coordinator.fetch_all());
        let elapsed = started.elapsed();

        for board in [first, second, third] {
            assert_eq!(board.failures(), 0);
        }
        assert!(
            elapsed < Duration::from_millis(750),
            "three invocations took {elapsed:?}; they should overlap, not queue"
        );
    }

    struct PanickingSource;

    #[async_trait]
    impl StatusSource for PanickingSource {
        async fn get_text(&self, url: &str) -> Result<String, FetchError> {
            if url.ends_with("deploy-au") {
                panic!("worker blew up");
            }
            Ok("complete".to_owned())
        }
    }

    #[tokio::test]
    async fn panicking_worker_becomes_a_failed_region() {
        let coordinator = FetchCoordinator::new(StatusFetcher::new(
            Arc::new(PanickingSource),
            SourcesConfig::default(),
        ));

        let board = coordinator.fetch_all().await;

        let error = board.get(Region::Au).error_text().expect("AU should carry an error");
        assert!(error.starts_with("status fetch worker failed: "), "unexpected error `{error}`");
        assert_eq!(board.get(Region::Au).status_text(), None);
        assert_eq!(board.failures(), 1);
        for region in [Region::Overall, Region::Ca, Region::Or, Region::Us] {
            assert_eq!(board.get(region).status_text(), Some("complete"));
        }
    }
}
