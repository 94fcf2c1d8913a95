//! The first leg of every session: a direct russh connection to the device
//! the crawl dials itself. Later legs are typed into this one's shell.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use log::{debug, warn};
use russh::Channel;
use russh::client::{self, Handle, Msg};
use russh::keys::PublicKey;
use secrecy::{ExposeSecret, SecretString};

use super::script::HopCredential;
use crate::error::{Result, TransportError};

/// OmniSwitch `show` tables wrap below this width.
const PTY_COLUMNS: u32 = 511;
const PTY_ROWS: u32 = 24;

/// What to do with a device key, in the spirit of OpenSSH's
/// `StrictHostKeyChecking`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HostKeyPolicy {
    /// Only devices already in known_hosts.
    Strict,

    /// Learn unknown devices, refuse changed keys.
    #[default]
    AcceptNew,

    /// Trust everything.
    Disabled,
}

/// Where and how to dial the first leg.
#[derive(Debug, Clone)]
pub struct Leg {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: SecretString,

    /// Bounds connect and the SSH inactivity timer.
    pub timeout: Duration,
    pub policy: HostKeyPolicy,
    pub known_hosts: Option<PathBuf>,
}

impl Leg {
    pub fn new(hop: &HopCredential, timeout: Duration) -> Self {
        Self {
            host: hop.ip.clone(),
            port: hop.port,
            username: hop.username.clone(),
            password: SecretString::from(hop.expose_password().to_string()),
            timeout,
            policy: HostKeyPolicy::default(),
            known_hosts: None,
        }
    }

    pub fn with_policy(mut self, policy: HostKeyPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_known_hosts(mut self, path: Option<PathBuf>) -> Self {
        self.known_hosts = path;
        self
    }
}

/// An authenticated connection to the first device of a relay chain.
pub struct Connection {
    handle: Handle<KeyCheck>,
    host: String,
}

impl Connection {
    /// Resolve, connect and log in with the leg's password.
    pub async fn dial(leg: &Leg) -> Result<Self> {
        let addr = tokio::net::lookup_host((leg.host.as_str(), leg.port))
            .await
            .ok()
            .and_then(|mut found| found.next())
            .ok_or_else(|| TransportError::Resolve {
                host: leg.host.clone(),
            })?;

        let verdict = Arc::new(Mutex::new(None));
        let check = KeyCheck {
            host: leg.host.clone(),
            port: leg.port,
            policy: leg.policy,
            known_hosts: leg.known_hosts.clone(),
            verdict: verdict.clone(),
        };
        let settings = Arc::new(client::Config {
            inactivity_timeout: Some(leg.timeout),
            ..Default::default()
        });

        debug!("dialling {}@{}:{}", leg.username, leg.host, leg.port);
        let connected = tokio::time::timeout(leg.timeout, client::connect(settings, addr, check))
            .await
            .map_err(|_| TransportError::Timeout(leg.timeout))?;

        let mut handle = match connected {
            Ok(handle) => handle,
            Err(e) => {
                let rejected = verdict.lock().ok().and_then(|mut slot| slot.take());
                return Err(match (rejected, e) {
                    (Some(reason), _) => reason,
                    (None, russh::Error::IO(source)) => TransportError::ConnectionFailed {
                        host: leg.host.clone(),
                        port: leg.port,
                        source,
                    },
                    (None, other) => TransportError::Ssh(other),
                }
                .into());
            }
        };

        let accepted = handle
            .authenticate_password(&leg.username, leg.password.expose_secret())
            .await
            .map_err(TransportError::Ssh)?
            .success();
        if !accepted {
            return Err(TransportError::AuthenticationFailed {
                user: leg.username.clone(),
            }
            .into());
        }

        Ok(Self {
            handle,
            host: leg.host.clone(),
        })
    }

    /// Open an interactive shell on a wide PTY.
    pub async fn shell(&self) -> Result<Channel<Msg>> {
        let channel = self
            .handle
            .channel_open_session()
            .await
            .map_err(TransportError::Ssh)?;
        channel
            .request_pty(true, "xterm", PTY_COLUMNS, PTY_ROWS, 0, 0, &[])
            .await
            .map_err(TransportError::Ssh)?;
        channel
            .request_shell(true)
            .await
            .map_err(TransportError::Ssh)?;
        Ok(channel)
    }

    pub async fn hang_up(self) -> Result<()> {
        debug!("hanging up on {}", self.host);
        self.handle
            .disconnect(russh::Disconnect::ByApplication, "", "en")
            .await
            .map_err(TransportError::Ssh)?;
        Ok(())
    }
}

/// Host key gate handed to russh. A rejection reason is parked in
/// `verdict` since russh only reports `UnknownKey`.
struct KeyCheck {
    host: String,
    port: u16,
    policy: HostKeyPolicy,
    known_hosts: Option<PathBuf>,
    verdict: Arc<Mutex<Option<TransportError>>>,
}

impl KeyCheck {
    /// `Ok(true)` when listed, `Ok(false)` when the device is new.
    fn listed(&self, key: &PublicKey) -> std::result::Result<bool, TransportError> {
        let found = match &self.known_hosts {
            Some(path) => russh::keys::check_known_hosts_path(&self.host, self.port, key, path),
            None => russh::keys::check_known_hosts(&self.host, self.port, key),
        };
        found.map_err(|e| match e {
            russh::keys::Error::KeyChanged { line } => TransportError::HostKeyChanged {
                host: self.host.clone(),
                port: self.port,
                line,
            },
            other => TransportError::KnownHosts(other.to_string()),
        })
    }

    fn learn(&self, key: &PublicKey) -> std::result::Result<(), TransportError> {
        let learned = match &self.known_hosts {
            Some(path) => {
                russh::keys::known_hosts::learn_known_hosts_path(&self.host, self.port, key, path)
            }
            None => russh::keys::known_hosts::learn_known_hosts(&self.host, self.port, key),
        };
        learned.map_err(|e| TransportError::KnownHosts(e.to_string()))
    }

    fn judge(&self, key: &PublicKey) -> std::result::Result<(), TransportError> {
        if self.policy == HostKeyPolicy::Disabled || self.listed(key)? {
            return Ok(());
        }
        match self.policy {
            HostKeyPolicy::AcceptNew => {
                if let Err(e) = self.learn(key) {
                    warn!("cannot remember key for {}: {}", self.host, e);
                }
                Ok(())
            }
            _ => Err(TransportError::HostKeyUnknown {
                host: self.host.clone(),
                port: self.port,
            }),
        }
    }
}

impl client::Handler for KeyCheck {
    type Error = russh::Error;

    async fn check_server_key(&mut self, key: &PublicKey) -> std::result::Result<bool, Self::Error> {
        match self.judge(key) {
            Ok(()) => Ok(true),
            Err(reason) => {
                debug!("refusing key from {}: {}", self.host, reason);
                if let Ok(mut slot) = self.verdict.lock() {
                    *slot = Some(reason);
                }
                Ok(false)
            }
        }
    }
}
