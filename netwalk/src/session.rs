//! Per-invocation crawl context: id counters and the event log.

use std::fmt;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Local};
use log::info;

/// A timestamped message that ends up in the output document.
#[derive(Debug, Clone)]
pub struct Event {
    /// When the event was recorded.
    pub timestamp: DateTime<Local>,

    /// Operation that raised the event.
    pub func: String,

    /// Human readable text.
    pub message: String,
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:::{}:::{}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S%.6f"),
            self.func,
            self.message
        )
    }
}

/// Shared state for a single crawl invocation.
///
/// Ids handed out here are unique across every target and round of the
/// crawl; parent/child linkage relies on that.
#[derive(Debug)]
pub struct CrawlSession {
    ne_counter: AtomicU64,
    uid_counter: AtomicU64,
    events: Mutex<Vec<Event>>,
}

impl CrawlSession {
    pub fn new() -> Self {
        Self {
            ne_counter: AtomicU64::new(1),
            uid_counter: AtomicU64::new(1),
            events: Mutex::new(Vec::new()),
        }
    }

    /// Next network element id.
    pub fn next_ne_id(&self) -> String {
        (self.ne_counter.fetch_add(1, Ordering::SeqCst) + 1).to_string()
    }

    /// Next generic record id.
    pub fn next_uid(&self) -> String {
        (self.uid_counter.fetch_add(1, Ordering::SeqCst) + 1).to_string()
    }

    /// Record an event and mirror it to the log.
    pub fn event(&self, func: &str, message: impl Into<String>) {
        let event = Event {
            timestamp: Local::now(),
            func: func.to_string(),
            message: message.into(),
        };
        info!("{}", event);
        match self.events.lock() {
            Ok(mut events) => events.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }

    /// Snapshot of the event log in insertion order.
    pub fn events(&self) -> Vec<Event> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Messages only, for assertions and quick dumps.
    pub fn messages(&self) -> Vec<String> {
        self.events().into_iter().map(|e| e.message).collect()
    }
}

impl Default for CrawlSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn test_counters_pre_increment() {
        let session = CrawlSession::new();
        assert_eq!(session.next_ne_id(), "2");
        assert_eq!(session.next_ne_id(), "3");
        assert_eq!(session.next_uid(), "2");
    }

    #[test]
    fn test_event_rendering() {
        let session = CrawlSession::new();
        session.event("burrow", "Created 3 Network Element Objects");
        let events = session.events();
        assert_eq!(events.len(), 1);
        let rendered = events[0].to_string();
        assert!(rendered.ends_with(":::burrow:::Created 3 Network Element Objects"));
    }

    #[test]
    fn test_ids_unique_across_threads() {
        let session = Arc::new(CrawlSession::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let session = session.clone();
                std::thread::spawn(move || {
                    (0..100).map(|_| session.next_uid()).collect::<Vec<_>>()
                })
            })
            .collect();

        let mut all: Vec<String> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        all.sort();
        all.dedup();
        assert_eq!(all.len(), 400);
    }
}
