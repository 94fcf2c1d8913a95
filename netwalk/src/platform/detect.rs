//! Type and hostname inference from primer transcripts.

use indexmap::IndexMap;
use log::debug;

use super::registry::PlatformRegistry;

/// Returned when no indicator matched at all.
pub const UNDETERMINED: &str = "UNDETERMINED";

/// Pick the entry with the highest nonzero count. Among equal counts the
/// later entry wins.
fn poll_winner<V: Clone>(poll: &IndexMap<String, (usize, V)>) -> Option<V> {
    let mut winner: Option<&(usize, V)> = None;
    for tally in poll.values() {
        if tally.0 > 0 && winner.is_none_or(|best| tally.0 >= best.0) {
            winner = Some(tally);
        }
    }
    winner.map(|(_, value)| value.clone())
}

/// Tally type indicator hits over every line and return the winning type.
pub fn detect_type(registry: &PlatformRegistry, lines: &[String]) -> String {
    let mut poll: IndexMap<String, (usize, String)> = registry
        .typestrings()
        .map(|t| (t.clone(), (0, t.clone())))
        .collect();

    for (i, line) in lines.iter().enumerate() {
        for platform in registry.iter() {
            let votes = platform.type_votes(line);
            if votes > 0 {
                debug!("line {} matched {} indicator(s) for '{}'", i, votes, platform.typestring);
                if let Some(tally) = poll.get_mut(&platform.typestring) {
                    tally.0 += votes;
                }
            }
        }
    }

    let winner = poll_winner(&poll).unwrap_or_else(|| UNDETERMINED.to_string());
    debug!("type poll winner is '{}'", winner);
    winner
}

/// Tally hostname pattern hits per type and return the hostname captured
/// for the winning type. The last matching line of that type provides it.
pub fn detect_hostname(registry: &PlatformRegistry, lines: &[String]) -> String {
    let mut poll: IndexMap<String, (usize, String)> = registry
        .typestrings()
        .map(|t| (t.clone(), (0, String::new())))
        .collect();

    for line in lines {
        for platform in registry.iter() {
            if let Some(hostname) = platform.hostname_from(line) {
                if let Some(tally) = poll.get_mut(&platform.typestring) {
                    tally.0 += 1;
                    tally.1 = hostname;
                }
            }
        }
    }

    let winner = poll_winner(&poll).unwrap_or_else(|| UNDETERMINED.to_string());
    debug!("hostname poll winner is '{}'", winner);
    winner
}
