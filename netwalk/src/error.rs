//! Error types for netwalk.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Everything that can stop netwalk before or after a crawl.
///
/// Failures during a crawl never surface here: sessions reduce them to
/// transcript markers and the crawl carries on.
#[derive(Error, Debug)]
pub enum Error {
    #[error("SSH: {0}")]
    Transport(#[from] TransportError),

    #[error("shell: {0}")]
    Channel(#[from] ChannelError),

    /// Always fatal for a crawl.
    #[error("input: {0}")]
    Input(#[from] InputError),

    #[error("output: {0}")]
    Output(#[from] OutputError),

    #[error("OUI: {0}")]
    Oui(#[from] OuiError),
}

/// Dialling and logging into the first device of a session.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("cannot reach {host}:{port}: {source}")]
    ConnectionFailed {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },

    #[error("Could not resolve hostname {host}")]
    Resolve { host: String },

    #[error("russh: {0}")]
    Ssh(#[from] russh::Error),

    /// The device refused the password.
    #[error("password rejected for '{user}'")]
    AuthenticationFailed { user: String },

    /// Strict policy and the device is not in known_hosts.
    #[error("no known_hosts entry for {host}:{port}")]
    HostKeyUnknown { host: String, port: u16 },

    #[error("key of {host}:{port} differs from known_hosts line {line}")]
    HostKeyChanged { host: String, port: u16, line: usize },

    #[error("known_hosts: {0}")]
    KnownHosts(String),

    #[error("no answer within {0:?}")]
    Timeout(Duration),
}

/// Talking to a device shell once it is open.
#[derive(Error, Debug)]
pub enum ChannelError {
    /// Expected prompt never showed up.
    #[error("nothing matched within {0:?}")]
    PatternTimeout(Duration),

    #[error("device closed the shell")]
    Closed,

    #[error("shell write: {0}")]
    Ssh(russh::Error),

    /// One of the built-in expect patterns failed to compile.
    #[error("bad expect pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// Input document errors.
#[derive(Error, Debug)]
pub enum InputError {
    /// The document could not be read from disk
    #[error("Cannot read input file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The document is not well formed
    #[error("Malformed input document: {message}")]
    Malformed { message: String },

    /// An entrypoint has no ipaddr element
    #[error("Entrypoint '{entry}' in target '{target}' has no ipaddr")]
    MissingIp { target: String, entry: String },

    /// An auth possibility has no username or no password
    #[error("Auth possibility '{auth}' in target '{target}' is missing its {field}")]
    MissingCredential {
        target: String,
        auth: String,
        field: &'static str,
    },

    /// A target with nothing to crawl or nothing to log in with
    #[error("Target '{target}' has no {what}")]
    EmptyTarget { target: String, what: &'static str },

    /// No targets in the document at all
    #[error("Input document contains no targets")]
    NoTargets,
}

/// Output document errors.
#[derive(Error, Debug)]
pub enum OutputError {
    /// XML writer failure
    #[error("XML write error: {0}")]
    Xml(String),

    /// The output file could not be written
    #[error("Cannot write output file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// MAC manufacturer lookup errors.
#[derive(Error, Debug)]
pub enum OuiError {
    /// The database file could not be loaded
    #[error("Cannot load OUI database {path}: {source}")]
    Database {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Too short to be a MAC address
    #[error("'{0}' is 11 characters or fewer, not a MAC address")]
    TooShort(String),

    /// Contains letters outside the hex range
    #[error("'{0}' contains characters g-z, not a MAC address")]
    InvalidCharacters(String),
}

pub type Result<T> = std::result::Result<T, Error>;
