// File: testing-framework/src/orchestrator/clock.rs
//
// Clock Abstraction
//
// The sandbox ledger stamps every transaction with a unix time derived from
// an injected Clock, so tests control `now` without touching wall-clock time.

use std::future::Future;
use std::pin::Pin;
use tokio::sync::watch;
use tokio::time::{self, Duration, Instant};

/// Clock abstraction trait - the ledger reads time only through this trait
///
/// The ledger remembers the instant it was created at and reports
/// `genesis_time + elapsed` as the `now` of each transaction.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use tokio::time::Duration;
/// use nft_testing_framework::orchestrator::clock::{Clock, PausedClock};
///
/// #[tokio::test]
/// async fn test_with_paused_time() {
///     let clock = Arc::new(PausedClock::new());
///     let start = clock.now();
///
///     // One day passes between two sends
///     clock.advance(Duration::from_secs(86_400)).await;
///
///     assert_eq!(clock.now() - start, Duration::from_secs(86_400));
/// }
/// ```
pub trait Clock: Send + Sync {
    /// Returns the current instant in time
    ///
    /// SystemClock returns real monotonic time; PausedClock returns the
    /// simulated instant, which only moves when advanced.
    fn now(&self) -> Instant;

    /// Sleeps for the specified duration
    fn sleep(&self, d: Duration) -> Pin<Box<dyn Future<Output = ()> + Send + '_>>;
}

/// Real-time clock
///
/// Default clock of a freshly created ledger. Transaction times follow the
/// wall clock from the configured genesis time.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        time::Instant::now()
    }

    fn sleep(&self, d: Duration) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(time::sleep(d))
    }
}

/// Paused clock (test environment)
///
/// Keeps its own offset from the instant it was created at: time only
/// advances through `advance()`, so transaction timestamps are
/// reproducible. The tokio runtime clock is never paused, so any number of
/// PausedClocks can live in one runtime, on either runtime flavor.
///
/// # Important Notes
///
/// 1. Share one clock through `Arc` between ledgers that must agree on time
/// 2. `sleep()` resolves only once this clock is advanced past its deadline
pub struct PausedClock {
    base: Instant,
    offset: watch::Sender<Duration>,
}

impl PausedClock {
    /// Creates a new PausedClock frozen at the current instant
    pub fn new() -> Self {
        let (offset, _) = watch::channel(Duration::ZERO);
        Self {
            base: Instant::now(),
            offset,
        }
    }

    /// Time advanced since creation
    pub fn elapsed(&self) -> Duration {
        *self.offset.borrow()
    }

    /// Manually advance time by the specified duration
    ///
    /// Pending `sleep()` futures whose deadline passes are woken up.
    pub async fn advance(&self, d: Duration) {
        self.offset.send_modify(|offset| *offset += d);
        tokio::task::yield_now().await
    }
}

impl Clock for PausedClock {
    fn now(&self) -> Instant {
        self.base + self.elapsed()
    }

    fn sleep(&self, d: Duration) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        let deadline = self.elapsed() + d;
        let mut offset = self.offset.subscribe();
        Box::pin(async move {
            // the sender lives in self, so the channel never closes while borrowed
            let _reached = offset.wait_for(|elapsed| *elapsed >= deadline).await.is_ok();
        })
    }
}

impl Default for PausedClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_paused_clock_advancement() {
        let clock = Arc::new(PausedClock::new());
        let start = clock.now();

        clock.advance(Duration::from_secs(1)).await;
        assert_eq!(clock.now() - start, Duration::from_secs(1));

        clock.advance(Duration::from_secs(2)).await;
        assert_eq!(clock.now() - start, Duration::from_secs(3));
    }

    #[tokio::test]
    async fn test_paused_clock_sleep_wakes_on_advance() {
        let clock = Arc::new(PausedClock::new());
        let sleep = clock.sleep(Duration::from_millis(100));

        clock.advance(Duration::from_millis(50)).await;
        assert_eq!(clock.elapsed(), Duration::from_millis(50));
        clock.advance(Duration::from_millis(100)).await;

        sleep.await;
        assert_eq!(clock.elapsed(), Duration::from_millis(150));
    }

    #[tokio::test]
    async fn test_system_clock_is_monotonic() {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let first = clock.now();
        let second = clock.now();
        assert!(second >= first);
    }

    #[tokio::test]
    async fn test_two_paused_clocks_in_one_runtime() {
        let first = PausedClock::new();
        let second = PausedClock::new();
        let start = second.now();

        first.advance(Duration::from_secs(5)).await;

        assert_eq!(first.elapsed(), Duration::from_secs(5));
        assert_eq!(second.now(), start);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_paused_clock_on_multi_thread_runtime() {
        let clock = Arc::new(PausedClock::new());
        let start = clock.now();

        let (woke_at, ()) = tokio::join!(
            async {
                clock.sleep(Duration::from_secs(30)).await;
                clock.now()
            },
            async {
                clock.advance(Duration::from_secs(10)).await;
                clock.advance(Duration::from_secs(20)).await;
            }
        );

        assert_eq!(woke_at - start, Duration::from_secs(30));
    }

    #[tokio::test]
    async fn test_paused_clock_shared_across_tasks() {
        let clock = Arc::new(PausedClock::new());
        let observer = clock.clone();
        let start = observer.now();

        clock.advance(Duration::from_secs(10)).await;

        assert_eq!(observer.now() - start, Duration::from_secs(10));
    }
}
