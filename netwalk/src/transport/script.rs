//! Session scripts: what to log into and what to run once there.

use std::fmt;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use crate::target::{AuthPossibility, Entrypoint};

/// Printed when the remote end never answered or a login stalled.
pub const TIMED_OUT: &str = "Timed Out!";

/// Printed when a relayed device dropped the session while coming up.
pub const NEED_TO_WAIT: &str = "Need to wait.";

/// Prefix of the resolver failure line.
pub const RESOLVE_FAILED: &str = "ssh: Could not resolve hostname";

/// Last line of the host key mismatch warning.
pub const HOST_KEY_CHANGED: &str = "IT IS POSSIBLE THAT SOMEONE IS DOING SOMETHING NASTY!";

/// Login details for one leg of a relay chain.
#[derive(Clone)]
pub struct HopCredential {
    pub ip: String,
    pub port: u16,
    pub username: String,
    pub password: SecretString,
}

impl HopCredential {
    pub fn new(entry: &Entrypoint, auth: &AuthPossibility) -> Self {
        Self {
            ip: entry.ip.clone(),
            port: entry.port,
            username: auth.username.clone(),
            password: SecretString::from(auth.expose_password().to_string()),
        }
    }

    /// Clear-text password for the wire.
    pub fn expose_password(&self) -> &str {
        self.password.expose_secret()
    }
}

impl fmt::Debug for HopCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HopCredential")
            .field("ip", &self.ip)
            .field("port", &self.port)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// What runs after the last hop reaches a prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptBody {
    /// Identity probe: `show system`/`show chassis` or `show system information`.
    Primer,

    /// Full discovery command list.
    Discovery(Vec<String>),
}

/// A complete interactive session.
#[derive(Debug, Clone)]
pub struct SessionScript {
    /// Index 0 is dialled directly, the rest are relayed in order.
    pub hops: Vec<HopCredential>,
    pub body: ScriptBody,
    pub timeout: Duration,
}

impl SessionScript {
    pub fn primer(hops: Vec<HopCredential>, timeout: Duration) -> Self {
        Self {
            hops,
            body: ScriptBody::Primer,
            timeout,
        }
    }

    pub fn discovery(hops: Vec<HopCredential>, commands: Vec<String>, timeout: Duration) -> Self {
        Self {
            hops,
            body: ScriptBody::Discovery(commands),
            timeout,
        }
    }

    /// The device the body runs on.
    pub fn destination(&self) -> Option<&HopCredential> {
        self.hops.last()
    }

    /// `a -> b -> c` for logs.
    pub fn route(&self) -> String {
        self.hops
            .iter()
            .map(|h| format!("{}:{}", h.ip, h.port))
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}

/// Build the relay chain for `entry`.
///
/// The chain walks `hopcount` levels of provenance. Each relay leg logs
/// in with the auth that worked when that device was crawled. Credentials
/// are resolved by id from `auths`; a leg whose auth cannot be found, or a
/// provenance chain shorter than the hop count, truncates the chain to the
/// legs that can be built.
pub fn hop_chain(entry: &Entrypoint, auth: &AuthPossibility, auths: &[AuthPossibility]) -> Vec<HopCredential> {
    let mut chain = vec![HopCredential::new(entry, auth)];
    let mut current = entry;

    for _ in 0..entry.hopcount {
        let Some(provenance) = current.learned_from.as_deref() else {
            break;
        };
        let Some(relay_auth) = auths.iter().find(|a| a.id == provenance.auth_id) else {
            break;
        };
        chain.push(HopCredential::new(&provenance.entry, relay_auth));
        current = &provenance.entry;
    }

    chain.reverse();
    chain
}
