//! SSH transport layer wrapping russh.
//!
//! Dialling the first device, the relay-hop session scripts the crawler
//! runs, and the runner that reduces every session outcome to a transcript.

mod runner;
pub mod script;
mod ssh;

pub use runner::{SessionRunner, SshRunner};
pub use script::{HopCredential, ScriptBody, SessionScript, hop_chain};
pub use ssh::{Connection, HostKeyPolicy, Leg};
