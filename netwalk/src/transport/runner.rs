//! Running session scripts and reducing every outcome to a transcript.

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use log::{debug, info, warn};

use super::script::{
    HOST_KEY_CHANGED, HopCredential, NEED_TO_WAIT, RESOLVE_FAILED, ScriptBody, SessionScript,
    TIMED_OUT,
};
use super::ssh::{Connection, HostKeyPolicy, Leg};
use crate::channel::{PtyChannel, PtyConfig, SessionPatterns};
use crate::error::{ChannelError, Error, Result, TransportError};

/// Something that can execute a [`SessionScript`].
///
/// Implementations never fail: every problem becomes text in the returned
/// transcript, using the markers in [`super::script`], so the crawl can
/// classify it the same way as device output.
pub trait SessionRunner: Send + Sync {
    /// Run the script and return the captured lines.
    fn run(&self, script: &SessionScript) -> impl Future<Output = Vec<String>> + Send;

    /// Drop cached host keys after a key mismatch.
    fn forget_host_keys(&self) -> impl Future<Output = ()> + Send;
}

/// Why a session stopped early.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Interrupt {
    TimedOut,
    NeedToWait,
}

impl Interrupt {
    fn marker(self) -> &'static str {
        match self {
            Interrupt::TimedOut => TIMED_OUT,
            Interrupt::NeedToWait => NEED_TO_WAIT,
        }
    }
}

impl From<ChannelError> for Interrupt {
    fn from(err: ChannelError) -> Self {
        debug!("session interrupted: {}", err);
        Interrupt::TimedOut
    }
}

/// [`SessionRunner`] backed by russh.
#[derive(Debug, Clone)]
pub struct SshRunner {
    patterns: SessionPatterns,
    host_key_policy: HostKeyPolicy,
    known_hosts_path: Option<PathBuf>,
    quiet: Duration,
}

impl SshRunner {
    pub fn new(known_hosts_path: Option<PathBuf>) -> Result<Self> {
        Ok(Self {
            patterns: SessionPatterns::new().map_err(ChannelError::from)?,
            host_key_policy: HostKeyPolicy::default(),
            known_hosts_path,
            quiet: Duration::from_millis(500),
        })
    }

    /// Set the host key policy.
    pub fn with_host_key_policy(mut self, policy: HostKeyPolicy) -> Self {
        self.host_key_policy = policy;
        self
    }

    /// Log into every relay hop after the first.
    async fn relay(&self, pty: &mut PtyChannel, hops: &[HopCredential]) -> std::result::Result<(), Interrupt> {
        let p = &self.patterns;
        for hop in hops {
            pty.expect_any(&[&p.user_prompt, &p.admin_prompt]).await?;
            pty.send_line(&format!("ssh {}", hop.ip)).await?;

            let [closed, corrupt, refused] = p.relay_failures();
            match pty.expect_any(&[closed, corrupt, refused, &p.login]).await? {
                0 | 1 => return Err(Interrupt::NeedToWait),
                2 => return Err(Interrupt::TimedOut),
                _ => pty.send_line(&hop.username).await?,
            }

            match pty
                .expect_any(&[&p.yes_no, &p.password, closed, corrupt, refused])
                .await?
            {
                0 => {
                    pty.send_line("yes").await?;
                    pty.expect(&p.password).await?;
                    pty.send_line(hop.expose_password()).await?;
                }
                1 => pty.send_line(hop.expose_password()).await?,
                2 | 3 => return Err(Interrupt::NeedToWait),
                _ => return Err(Interrupt::TimedOut),
            }
        }
        Ok(())
    }

    async fn body(&self, pty: &mut PtyChannel, body: &ScriptBody) -> std::result::Result<(), Interrupt> {
        let p = &self.patterns;
        match body {
            ScriptBody::Primer => {
                match pty.expect_any(&[&p.user_prompt, &p.admin_prompt]).await? {
                    0 => {
                        pty.send_line("show system").await?;
                        pty.expect(&p.user_prompt).await?;
                        pty.send_line("show chassis").await?;
                        pty.expect(&p.user_prompt).await?;
                        pty.send_line("exit").await?;
                    }
                    _ => {
                        pty.send_line("show system information").await?;
                        pty.expect(&p.admin_prompt).await?;
                        pty.send_line("logout").await?;
                    }
                }
            }
            ScriptBody::Discovery(commands) => {
                for command in commands {
                    pty.expect(&p.user_prompt).await?;
                    pty.send_line(command).await?;
                    pty.expect(&p.user_prompt).await?;
                    pty.send("\r").await?;
                }
                pty.expect(&p.user_prompt).await?;
                pty.send_line("exit").await?;
            }
        }
        Ok(())
    }

    async fn session(&self, script: &SessionScript, first: &HopCredential) -> Result<Vec<String>> {
        let leg = Leg::new(first, script.timeout)
            .with_policy(self.host_key_policy)
            .with_known_hosts(self.known_hosts_path.clone());

        let connection = Connection::dial(&leg).await?;
        let channel = connection.shell().await?;
        let mut pty = PtyChannel::new(
            channel,
            &PtyConfig {
                timeout: script.timeout,
                ..Default::default()
            },
        );

        let relays = script.hops.get(1..).unwrap_or_default();
        let outcome = match self.relay(&mut pty, relays).await {
            Ok(()) => self.body(&mut pty, &script.body).await,
            Err(interrupt) => Err(interrupt),
        };

        match outcome {
            Ok(()) => pty.drain(self.quiet).await,
            Err(interrupt) => {
                pty.send("\x03").await.ok();
                pty.note(interrupt.marker());
            }
        }

        let lines = pty.close().await;
        if let Err(e) = connection.hang_up().await {
            debug!("disconnect from {} failed: {}", first.ip, e);
        }
        Ok(lines)
    }
}

/// Transcript equivalent of a failed first leg.
fn failure_transcript(hop: &HopCredential, err: &Error) -> Vec<String> {
    match err {
        Error::Transport(TransportError::Resolve { host }) => {
            vec![format!("{} {}: Name or service not known", RESOLVE_FAILED, host)]
        }
        Error::Transport(TransportError::HostKeyChanged { .. }) => vec![
            "@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@".to_string(),
            "@    WARNING: REMOTE HOST IDENTIFICATION HAS CHANGED!     @".to_string(),
            "@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@".to_string(),
            HOST_KEY_CHANGED.to_string(),
        ],
        Error::Transport(TransportError::AuthenticationFailed { user }) => vec![
            format!("ssh {}@{}", user, hop.ip),
            format!("{}@{}'s password:", user, hop.ip),
            "Permission denied, please try again.".to_string(),
            TIMED_OUT.to_string(),
        ],
        _ => vec![TIMED_OUT.to_string()],
    }
}

impl SessionRunner for SshRunner {
    async fn run(&self, script: &SessionScript) -> Vec<String> {
        let Some(first) = script.hops.first() else {
            warn!("session script without hops");
            return vec![TIMED_OUT.to_string()];
        };

        debug!("running {:?} session via {}", script.body, script.route());
        match self.session(script, first).await {
            Ok(lines) => lines,
            Err(e) => {
                debug!("session to {} failed: {}", first.ip, e);
                failure_transcript(first, &e)
            }
        }
    }

    async fn forget_host_keys(&self) {
        let Some(path) = self.known_hosts_path.as_ref() else {
            warn!("no known_hosts file configured, nothing to forget");
            return;
        };
        match tokio::fs::remove_file(path).await {
            Ok(()) => info!("deleted {}", path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("cannot delete {}: {}", path.display(), e),
        }
    }
}
