//! Crawl scopes: targets, their entrypoints and the credential pool.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use secrecy::{ExposeSecret, SecretString};

/// One username/password candidate with a running score.
///
/// The score is atomic so the pool can be shared by every entrypoint of
/// every target in the crawl, including entrypoints primed concurrently.
pub struct AuthPossibility {
    /// Identifier from the input document.
    pub id: String,

    /// Login name.
    pub username: String,

    /// Login password.
    pub password: SecretString,

    score: AtomicI64,
}

impl AuthPossibility {
    /// Create a candidate at the floor score of 1.
    pub fn new(id: impl Into<String>, username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            password: SecretString::from(password.into()),
            score: AtomicI64::new(1),
        }
    }

    /// Current score.
    pub fn score(&self) -> i64 {
        self.score.load(Ordering::SeqCst)
    }

    /// Add `delta` to the score and return the new value.
    pub fn adjust_score(&self, delta: i64) -> i64 {
        self.score.fetch_add(delta, Ordering::SeqCst) + delta
    }

    /// Clear-text password, only for handing to the transport.
    pub fn expose_password(&self) -> &str {
        self.password.expose_secret()
    }
}

impl fmt::Debug for AuthPossibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthPossibility")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password", &"*********")
            .field("score", &self.score())
            .finish()
    }
}

/// Credential pool shared by a target and every target derived from it.
pub type AuthPool = Arc<[AuthPossibility]>;

/// Where a derived entrypoint was learned.
#[derive(Debug, Clone)]
pub struct Provenance {
    /// NE whose neighbor table reported the address.
    pub ne_id: String,

    /// Entrypoint that NE was reached through.
    pub entry: Entrypoint,

    /// Auth id that worked on that entrypoint.
    pub auth_id: String,
}

/// An SSH-addressable access point.
#[derive(Debug, Clone)]
pub struct Entrypoint {
    pub id: String,
    pub ip: String,
    pub port: u16,
    pub hostname: String,

    /// Auth possibility currently selected for this entrypoint.
    pub auth: String,

    /// Auth ids that already failed here.
    pub authfailed: Vec<String>,

    pub primersuccess: bool,
    pub reachable: bool,

    /// Relay hops needed to reach the address (0, 1 or 2).
    pub hopcount: u32,

    /// Direct access failed; retry through the relay chain.
    pub directfailed: bool,

    /// Hop count parked while direct access is attempted.
    pub saved_hopcount: Option<u32>,

    pub learned_from: Option<Box<Provenance>>,

    /// Transcript of the last primer session.
    pub primer_output: Vec<String>,
}

impl Entrypoint {
    /// A fresh entrypoint with the defaults used for input documents.
    pub fn new(id: impl Into<String>, ip: impl Into<String>, port: u16) -> Self {
        Self {
            id: id.into(),
            ip: ip.into(),
            port,
            hostname: String::new(),
            auth: "1".to_string(),
            authfailed: Vec::new(),
            primersuccess: false,
            reachable: true,
            hopcount: 0,
            directfailed: false,
            saved_hopcount: None,
            learned_from: None,
            primer_output: Vec::new(),
        }
    }

    /// Set the hostname.
    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = hostname.into();
        self
    }

    /// Attach provenance and derive the hop count from it.
    pub fn learned_from(mut self, provenance: Provenance) -> Self {
        self.hopcount = provenance.entry.hopcount + 1;
        self.learned_from = Some(Box::new(provenance));
        self
    }

    /// Primer finished one way or the other.
    pub fn is_settled(&self) -> bool {
        (self.primersuccess && self.reachable) || (!self.reachable && !self.directfailed)
    }

    /// Mark the entrypoint as permanently out of reach.
    pub fn abandon(&mut self) {
        self.primersuccess = false;
        self.reachable = false;
        self.directfailed = false;
    }

    /// One-line summary for logs.
    pub fn summary(&self) -> String {
        format!(
            "ID: {}, IP: {}, PORT: {}, HOSTNAME: {}, HOPCOUNT: {}, AUTH: {}",
            self.id, self.ip, self.port, self.hostname, self.hopcount, self.auth
        )
    }
}

/// Identity hints from the input document.
#[derive(Debug, Clone, Default)]
pub struct Member {
    pub id: String,
    pub hostname: String,
    pub ipaddr: String,
    pub defaultroute: String,
    pub dhcps: String,
    pub mac: String,
    pub typestring: String,
}

/// A crawl scope: one credential pool and the entrypoints to try with it.
#[derive(Debug, Clone)]
pub struct Target {
    pub id: String,
    pub auths: AuthPool,
    pub entrypoints: Vec<Entrypoint>,
    pub hopdepth: u32,
}

impl Target {
    pub fn new(id: impl Into<String>, auths: Vec<AuthPossibility>, entrypoints: Vec<Entrypoint>) -> Self {
        Self {
            id: id.into(),
            auths: auths.into(),
            entrypoints,
            hopdepth: 0,
        }
    }

    /// Look up an auth possibility by id.
    pub fn auth(&self, id: &str) -> Option<&AuthPossibility> {
        self.auths.iter().find(|a| a.id == id)
    }

    /// Successor target sharing this pool.
    pub fn next(&self, id: impl Into<String>, entrypoints: Vec<Entrypoint>) -> Self {
        Self {
            id: id.into(),
            auths: self.auths.clone(),
            entrypoints,
            hopdepth: self.hopdepth + 1,
        }
    }
}
