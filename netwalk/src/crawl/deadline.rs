//! Overall crawl deadline applied to every session and sleep.

use std::future::Future;
use std::time::Duration;

use tokio::time::{Instant, sleep, sleep_until, timeout_at};

/// A point in time after which no session starts and no sleep completes.
#[derive(Debug, Clone, Copy, Default)]
pub struct Deadline(Option<Instant>);

impl Deadline {
    /// No deadline.
    pub fn none() -> Self {
        Self(None)
    }

    /// Deadline `budget` from now, or none.
    pub fn after(budget: Option<Duration>) -> Self {
        Self(budget.map(|b| Instant::now() + b))
    }

    pub fn expired(&self) -> bool {
        self.0.is_some_and(|at| Instant::now() >= at)
    }

    /// Sleep for `duration`. Returns false if the deadline cut it short.
    pub async fn sleep(&self, duration: Duration) -> bool {
        match self.0 {
            Some(at) if Instant::now() + duration >= at => {
                sleep_until(at).await;
                false
            }
            _ => {
                sleep(duration).await;
                true
            }
        }
    }

    /// Await `fut`, giving up at the deadline.
    pub async fn run<F: Future>(&self, fut: F) -> Option<F::Output> {
        if self.expired() {
            return None;
        }
        match self.0 {
            Some(at) => timeout_at(at, fut).await.ok(),
            None => Some(fut.await),
        }
    }
}
