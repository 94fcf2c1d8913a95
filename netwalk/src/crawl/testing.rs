//! Scripted [`SessionRunner`] for driving the crawl without a network.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::transport::script::TIMED_OUT;
use crate::transport::{ScriptBody, SessionRunner, SessionScript};

/// One session the runner was asked to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Seen {
    pub hops: usize,
    pub ip: String,
    pub user: String,
    pub discovery: bool,
}

/// Replies per destination and body kind first, then from a shared
/// sequence, then `Timed Out!`. A destination with a delay answers late.
#[derive(Default)]
pub(crate) struct Scripted {
    sequence: Mutex<VecDeque<Vec<String>>>,
    keyed: Mutex<HashMap<(String, bool), VecDeque<Vec<String>>>>,
    delays: Mutex<HashMap<String, Duration>>,
    seen: Mutex<Vec<Seen>>,
    forgotten: AtomicUsize,
}

pub(crate) fn lines(text: &[&str]) -> Vec<String> {
    text.iter().map(|s| s.to_string()).collect()
}

impl Scripted {
    pub fn new(replies: &[&[&str]]) -> Self {
        Self {
            sequence: Mutex::new(replies.iter().map(|r| lines(r)).collect()),
            ..Default::default()
        }
    }

    pub fn with_primer(self, ip: &str, reply: Vec<String>) -> Self {
        self.push(ip, false, reply);
        self
    }

    pub fn with_discovery(self, ip: &str, reply: Vec<String>) -> Self {
        self.push(ip, true, reply);
        self
    }

    pub fn with_delay(self, ip: &str, delay: Duration) -> Self {
        self.delays.lock().unwrap().insert(ip.to_string(), delay);
        self
    }

    fn push(&self, ip: &str, discovery: bool, reply: Vec<String>) {
        self.keyed
            .lock()
            .unwrap()
            .entry((ip.to_string(), discovery))
            .or_default()
            .push_back(reply);
    }

    pub fn seen(&self) -> Vec<Seen> {
        self.seen.lock().unwrap().clone()
    }

    pub fn forgotten(&self) -> usize {
        self.forgotten.load(Ordering::SeqCst)
    }
}

impl SessionRunner for Scripted {
    async fn run(&self, script: &SessionScript) -> Vec<String> {
        let (ip, user) = script
            .destination()
            .map(|h| (h.ip.clone(), h.username.clone()))
            .unwrap_or_default();
        let discovery = matches!(script.body, ScriptBody::Discovery(_));
        self.seen.lock().unwrap().push(Seen {
            hops: script.hops.len(),
            ip: ip.clone(),
            user,
            discovery,
        });

        let delay = self.delays.lock().unwrap().get(&ip).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let keyed = self
            .keyed
            .lock()
            .unwrap()
            .get_mut(&(ip, discovery))
            .and_then(VecDeque::pop_front);
        keyed
            .or_else(|| self.sequence.lock().unwrap().pop_front())
            .unwrap_or_else(|| vec![TIMED_OUT.to_string()])
    }

    async fn forget_host_keys(&self) {
        self.forgotten.fetch_add(1, Ordering::SeqCst);
    }
}
