//! Expect patterns for login, relay hops and device prompts.

use regex::bytes::Regex;

/// Compile a literal string into a byte regex.
pub fn literal(text: &str) -> Result<Regex, regex::Error> {
    Regex::new(&regex::escape(text))
}

/// The fixed set of things a crawl session waits for.
///
/// Relay hops are driven from the previous device's CLI, so failures on
/// the far side only show up as text on our channel.
#[derive(Debug, Clone)]
pub struct SessionPatterns {
    /// OmniSwitch user prompt.
    pub user_prompt: Regex,

    /// SAR admin prompt.
    pub admin_prompt: Regex,

    /// Login name request from a relayed ssh client.
    pub login: Regex,

    /// Host key confirmation from a relayed ssh client.
    pub yes_no: Regex,

    /// Password request.
    pub password: Regex,

    /// Remote end dropped the relayed session while booting.
    pub closed: Regex,

    /// Relayed transport noise seen on devices that are still coming up.
    pub corrupt: Regex,

    /// Relayed connect was refused.
    pub refused: Regex,
}

impl SessionPatterns {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            user_prompt: literal(">")?,
            admin_prompt: literal("#")?,
            login: literal(":")?,
            yes_no: literal("yes/no")?,
            password: literal("assword")?,
            closed: literal("Connection closed by remote host")?,
            corrupt: literal("Packet corrupt")?,
            refused: literal("Connection refused")?,
        })
    }

    /// Patterns that end a relay attempt, checked before the prompts.
    pub fn relay_failures(&self) -> [&Regex; 3] {
        [&self.closed, &self.corrupt, &self.refused]
    }
}
