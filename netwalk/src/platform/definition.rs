//! Platform definition for one device family.

use std::fmt;

use regex::Regex;

/// A substring pattern that votes for a device type when seen in a primer
/// transcript.
#[derive(Clone)]
pub struct TypeIndicator {
    /// The raw indicator as written in the table.
    pub indicator: String,

    /// Hardware variant the indicator points at, if any.
    pub variant: String,

    regex: Regex,
}

impl TypeIndicator {
    pub fn new(indicator: &str, variant: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            indicator: indicator.to_string(),
            variant: variant.to_string(),
            regex: Regex::new(indicator)?,
        })
    }

    pub fn is_match(&self, line: &str) -> bool {
        self.regex.is_match(line)
    }
}

impl fmt::Debug for TypeIndicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeIndicator")
            .field("indicator", &self.indicator)
            .field("variant", &self.variant)
            .finish()
    }
}

/// Everything the crawler knows about a device family.
#[derive(Debug, Clone)]
pub struct PlatformDefinition {
    /// Platform name (e.g., "alu_omniswitch").
    pub name: String,

    /// Type tag written into NE records (e.g., "scs").
    pub typestring: String,

    /// Primer transcript indicators, in table order.
    pub type_indicators: Vec<TypeIndicator>,

    /// Hostname pattern with a `value` capture group.
    pub hostname_pattern: Option<Regex>,

    /// Commands run by a discovery session.
    pub discovery_commands: Vec<String>,

    /// Whether discovery output is parsed into a type payload.
    pub builds_payload: bool,
}

impl PlatformDefinition {
    /// Create a new platform definition with minimal required fields.
    pub fn new(name: impl Into<String>, typestring: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            typestring: typestring.into(),
            type_indicators: vec![],
            hostname_pattern: None,
            discovery_commands: vec![],
            builds_payload: false,
        }
    }

    /// Add a type indicator.
    pub fn with_type_indicator(mut self, indicator: &str, variant: &str) -> Result<Self, regex::Error> {
        self.type_indicators.push(TypeIndicator::new(indicator, variant)?);
        Ok(self)
    }

    /// Set the hostname pattern. It must have a `value` group.
    pub fn with_hostname_pattern(mut self, pattern: &str) -> Result<Self, regex::Error> {
        self.hostname_pattern = Some(Regex::new(pattern)?);
        Ok(self)
    }

    /// Add discovery commands.
    pub fn with_discovery_commands<I, S>(mut self, commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.discovery_commands
            .extend(commands.into_iter().map(Into::into));
        self
    }

    /// Mark the platform as having a type payload builder.
    pub fn with_payload(mut self) -> Self {
        self.builds_payload = true;
        self
    }

    /// Count indicator hits on a line.
    pub fn type_votes(&self, line: &str) -> usize {
        self.type_indicators
            .iter()
            .filter(|indicator| indicator.is_match(line))
            .count()
    }

    /// Hostname from a line, with trailing `,\r\n` removed.
    pub fn hostname_from(&self, line: &str) -> Option<String> {
        let captures = self.hostname_pattern.as_ref()?.captures(line)?;
        let value = captures.name("value")?.as_str();
        Some(value.trim_end_matches([',', '\r', '\n']).to_string())
    }
}
