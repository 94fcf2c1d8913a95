//! Crawl tunables.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Limits, timeouts and file locations for one crawl.
///
/// Every value has a default matching the field-proven behaviour of the
/// crawler; the `with_*` setters exist for the CLI and for tests that need
/// to shrink the sleeps to zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Port used when an entrypoint does not name one.
    pub default_ssh_port: u16,

    /// Sleep between attempts when a device says it is not ready.
    pub retry_sleep: Duration,

    /// Sleep between primer rounds on the same entrypoint.
    pub primer_settle_sleep: Duration,

    /// Deepest hop depth that will still be primed.
    pub max_crawl_depth: u32,

    /// Upper bound on expansion rounds regardless of depth.
    pub max_crawl_rounds: u32,

    /// Full discovery re-runs allowed for an NE with an incomplete pull.
    pub max_pull_attempts: u32,

    /// Run-and-classify attempts inside one discovery pull.
    pub max_grab_attempts: u32,

    /// Iterations of the primer driver per invocation.
    pub max_primer_iterations: u32,

    /// Invocations of the primer driver per entrypoint.
    pub max_primer_rounds: u32,

    /// Discovery transcripts shorter than this are treated as hiccups.
    pub min_discovery_lines: usize,

    /// Per-expect timeout while priming.
    pub primer_timeout: Duration,

    /// Per-expect timeout while running discovery commands.
    pub discovery_timeout: Duration,

    /// Entrypoints handled concurrently within one round. 1 is sequential.
    pub parallelism: usize,

    /// Wall-clock budget for the whole crawl.
    pub deadline: Option<Duration>,

    /// known_hosts file to verify against and to delete on key mismatch.
    pub known_hosts_path: Option<PathBuf>,

    /// IEEE oui.txt style manufacturer database.
    pub oui_database: PathBuf,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            default_ssh_port: 22,
            retry_sleep: Duration::from_secs(20),
            primer_settle_sleep: Duration::from_secs(2),
            max_crawl_depth: 3,
            max_crawl_rounds: 10,
            max_pull_attempts: 4,
            max_grab_attempts: 7,
            max_primer_iterations: 5,
            max_primer_rounds: 10,
            min_discovery_lines: 400,
            primer_timeout: Duration::from_secs(8),
            discovery_timeout: Duration::from_secs(15),
            parallelism: 1,
            deadline: None,
            known_hosts_path: None,
            oui_database: PathBuf::from("oui-database.txt"),
        }
    }
}

impl CrawlConfig {
    /// Set the not-ready retry sleep.
    pub fn with_retry_sleep(mut self, sleep: Duration) -> Self {
        self.retry_sleep = sleep;
        self
    }

    /// Set the sleep between primer rounds.
    pub fn with_primer_settle_sleep(mut self, sleep: Duration) -> Self {
        self.primer_settle_sleep = sleep;
        self
    }

    /// Set the maximum crawl depth.
    pub fn with_max_crawl_depth(mut self, depth: u32) -> Self {
        self.max_crawl_depth = depth;
        self
    }

    /// Set the minimum viable discovery transcript length.
    pub fn with_min_discovery_lines(mut self, lines: usize) -> Self {
        self.min_discovery_lines = lines;
        self
    }

    /// Set the number of entrypoints handled concurrently.
    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism.max(1);
        self
    }

    /// Set an overall crawl deadline.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Set the known_hosts file.
    pub fn with_known_hosts(mut self, path: impl Into<PathBuf>) -> Self {
        self.known_hosts_path = Some(path.into());
        self
    }

    /// Set the OUI database file.
    pub fn with_oui_database(mut self, path: impl Into<PathBuf>) -> Self {
        self.oui_database = path.into();
        self
    }

    /// Zero every sleep. Used by tests driving scripted sessions.
    pub fn without_sleeps(self) -> Self {
        self.with_retry_sleep(Duration::ZERO)
            .with_primer_settle_sleep(Duration::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CrawlConfig::default();
        assert_eq!(config.default_ssh_port, 22);
        assert_eq!(config.retry_sleep, Duration::from_secs(20));
        assert_eq!(config.max_crawl_depth, 3);
        assert_eq!(config.max_pull_attempts, 4);
        assert_eq!(config.min_discovery_lines, 400);
        assert_eq!(config.parallelism, 1);
    }

    #[test]
    fn test_parallelism_floor() {
        let config = CrawlConfig::default().with_parallelism(0);
        assert_eq!(config.parallelism, 1);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: CrawlConfig =
            serde_json::from_str(r#"{"max_crawl_depth": 1, "parallelism": 4}"#).unwrap();
        assert_eq!(config.max_crawl_depth, 1);
        assert_eq!(config.parallelism, 4);
        assert_eq!(config.max_grab_attempts, 7);
    }
}
