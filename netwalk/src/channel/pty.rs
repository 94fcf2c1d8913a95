//! PTY channel with expect-style pattern waits.

use std::time::Duration;

use log::trace;
use regex::bytes::Regex;
use russh::client::Msg;
use russh::{Channel, ChannelMsg};
use tokio::time::Instant;

use super::buffer::Transcript;
use crate::error::ChannelError;

/// Expect settings for one session.
#[derive(Debug, Clone)]
pub struct PtyConfig {
    /// Default timeout for a single expect.
    pub timeout: Duration,

    /// Bytes from the end of the transcript an expect looks at.
    pub search_depth: usize,
}

impl Default for PtyConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(15),
            search_depth: 1000,
        }
    }
}

/// Interactive shell channel that records everything it receives.
pub struct PtyChannel {
    channel: Channel<Msg>,
    buffer: Transcript,
    timeout: Duration,
    closed: bool,
}

impl PtyChannel {
    /// Wrap an already-open shell channel.
    pub fn new(channel: Channel<Msg>, config: &PtyConfig) -> Self {
        Self {
            channel,
            buffer: Transcript::new(config.search_depth),
            timeout: config.timeout,
            closed: false,
        }
    }

    /// Send raw text to the remote shell.
    pub async fn send(&mut self, text: &str) -> Result<(), ChannelError> {
        trace!("send: {:?}", text);
        self.channel
            .data(text.as_bytes())
            .await
            .map_err(ChannelError::Ssh)
    }

    /// Send a line terminated by a carriage return.
    pub async fn send_line(&mut self, line: &str) -> Result<(), ChannelError> {
        self.send(&format!("{}\r", line)).await
    }

    /// Wait until any of `patterns` shows up in fresh output.
    ///
    /// Returns the index of the first pattern (in slice order) that matched.
    /// The matched text is consumed so the next expect starts after it.
    pub async fn expect_any(&mut self, patterns: &[&Regex]) -> Result<usize, ChannelError> {
        let deadline = Instant::now() + self.timeout;

        loop {
            if let Some((index, end)) = self.first_match(patterns) {
                self.buffer.consume_to(end);
                return Ok(index);
            }
            if self.closed {
                return Err(ChannelError::Closed);
            }

            match tokio::time::timeout_at(deadline, self.channel.wait()).await {
                Ok(Some(ChannelMsg::Data { data })) => self.buffer.extend(&data),
                Ok(Some(ChannelMsg::ExtendedData { data, .. })) => self.buffer.extend(&data),
                Ok(Some(ChannelMsg::Eof | ChannelMsg::Close)) | Ok(None) => self.closed = true,
                Ok(Some(_)) => {}
                Err(_) => return Err(ChannelError::PatternTimeout(self.timeout)),
            }
        }
    }

    /// Wait for a single pattern.
    pub async fn expect(&mut self, pattern: &Regex) -> Result<(), ChannelError> {
        self.expect_any(&[pattern]).await.map(|_| ())
    }

    /// Drain whatever arrives within `quiet` of the last read.
    pub async fn drain(&mut self, quiet: Duration) {
        while !self.closed {
            match tokio::time::timeout(quiet, self.channel.wait()).await {
                Ok(Some(ChannelMsg::Data { data })) => self.buffer.extend(&data),
                Ok(Some(ChannelMsg::ExtendedData { data, .. })) => self.buffer.extend(&data),
                Ok(Some(ChannelMsg::Eof | ChannelMsg::Close)) | Ok(None) => self.closed = true,
                Ok(Some(_)) => {}
                Err(_) => break,
            }
        }
        self.buffer.consume_all();
    }

    /// Record a line of our own in the transcript, like an expect script's `puts`.
    pub fn note(&mut self, line: &str) {
        self.buffer.extend(format!("\r\n{}\r\n", line).as_bytes());
        self.buffer.consume_all();
    }

    /// Close the channel and return the transcript.
    pub async fn close(self) -> Vec<String> {
        if !self.closed {
            let _ = self.channel.eof().await;
            let _ = self.channel.close().await;
        }
        self.buffer.lines()
    }

    fn first_match(&self, patterns: &[&Regex]) -> Option<(usize, usize)> {
        patterns
            .iter()
            .enumerate()
            .find_map(|(index, pattern)| self.buffer.search_tail(pattern).map(|end| (index, end)))
    }
}
