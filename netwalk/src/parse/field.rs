//! Labeled-field matching and chunking shared by the section parsers.

use regex::Regex;

/// MAC in colon/dash pairs or dotted quads.
pub const MAC_VALUE: &str =
    r"(?:(?:[0-9A-Fa-f]{2}[-:]){5}[0-9A-Fa-f]{2}|(?:[0-9A-Fa-f]{4}.){2}[0-9A-Fa-f]{4})";

/// IPv4-looking token.
pub const IPV4: &str = r"\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}";

/// A `label` followed by a captured `value`, searched anywhere in a line.
#[derive(Debug, Clone)]
pub struct LabeledField {
    regex: Regex,
}

impl LabeledField {
    /// `label` is a regex fragment; literal labels with metacharacters must
    /// arrive escaped.
    pub fn new(label: &str, value: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(&format!("(?P<indicator>{label})(?P<value>{value})"))?;
        Ok(Self { regex })
    }

    /// A label whose value is the rest of the line.
    pub fn rest_of_line(label: &str) -> Result<Self, regex::Error> {
        Self::new(label, ".*")
    }

    pub fn is_match(&self, line: &str) -> bool {
        self.regex.is_match(line)
    }

    /// Captured value with trailing `,\r\n` removed.
    pub fn value(&self, line: &str) -> Option<String> {
        let captures = self.regex.captures(line)?;
        let value = captures.name("value")?.as_str();
        Some(value.trim_end_matches([',', '\r', '\n']).to_string())
    }
}

/// Built-in field from literal table patterns, for use in `Lazy` statics.
pub fn builtin_field(label: &str, value: &str) -> LabeledField {
    LabeledField::new(label, value).expect("built-in field pattern must compile")
}

/// Split `lines` into chunks that start at every line where `is_start`
/// holds. Each chunk holds the start line index and the lines after it, up
/// to the next start or to `last_stop`.
pub fn chunk_lines<'a, F>(lines: &'a [String], last_stop: usize, is_start: F) -> Vec<(usize, &'a [String])>
where
    F: Fn(&str) -> bool,
{
    let starts: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, line)| is_start(line))
        .map(|(i, _)| i)
        .collect();

    starts
        .iter()
        .enumerate()
        .map(|(n, &start)| {
            let stop = starts.get(n + 1).copied().unwrap_or(last_stop).min(lines.len());
            let body = lines.get(start + 1..stop.max(start + 1)).unwrap_or(&[]);
            (start, body)
        })
        .collect()
}

/// Whitespace-split columns with a safe accessor.
#[derive(Debug)]
pub struct Columns<'a>(Vec<&'a str>);

impl<'a> Columns<'a> {
    pub fn new(line: &'a str) -> Self {
        Self(line.split_whitespace().collect())
    }

    /// Column `n`, or an empty string for short rows.
    pub fn get(&self, n: usize) -> String {
        self.0.get(n).map(|s| s.to_string()).unwrap_or_default()
    }

    /// Columns `from..to` joined by a space; short rows give what exists.
    pub fn join(&self, from: usize, to: usize) -> String {
        let to = to.min(self.0.len());
        if from >= to {
            return String::new();
        }
        self.0[from..to].join(" ")
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Table rows sliced the way the fixed-header tables are: skip `header`
/// lines and the final prompt line, keep rows that have any columns.
pub fn table_body(lines: &[String], header: usize) -> impl Iterator<Item = &String> {
    let end = lines.len().saturating_sub(1);
    lines
        .get(header.min(end)..end)
        .unwrap_or(&[])
        .iter()
        .filter(|line| line.split_whitespace().next().is_some())
}
