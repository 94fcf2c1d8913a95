//! Credential selection for an entrypoint.

use log::debug;

use crate::session::CrawlSession;
use crate::target::{AuthPossibility, Entrypoint};

/// Username that gets a head start while still at the floor score.
const PREFERRED_USERNAME: &str = "admin";

const FLOOR_SCORE: i64 = 1;

/// Pick the best remaining auth possibility for `entry`.
///
/// With `purge_current` the entry's current auth is first recorded as
/// failed. Candidates are ordered by ascending score with a stable sort,
/// failed ids are dropped and the last candidate wins. Returns false when
/// nothing is left; the entry is then marked unreachable.
pub fn select_next(
    auths: &[AuthPossibility],
    entry: &mut Entrypoint,
    purge_current: bool,
    session: &CrawlSession,
) -> bool {
    if purge_current {
        entry.authfailed.push(entry.auth.clone());
    }
    debug!("selecting auth for entry {}, old auth id {}", entry.id, entry.auth);

    for auth in auths {
        if auth.username == PREFERRED_USERNAME && auth.score() == FLOOR_SCORE {
            auth.adjust_score(1);
        }
    }

    let mut ranked: Vec<&AuthPossibility> = auths.iter().collect();
    ranked.sort_by_key(|a| a.score());
    for a in &ranked {
        debug!("  auth id {} score {} user {}", a.id, a.score(), a.username);
    }

    for failed in &entry.authfailed {
        if let Some(pos) = ranked.iter().position(|a| a.id == *failed) {
            ranked.remove(pos);
        }
    }

    match ranked.pop() {
        Some(chosen) => {
            debug!("entry {} now uses auth id {} (score {})", entry.id, chosen.id, chosen.score());
            entry.auth = chosen.id.clone();
            true
        }
        None => {
            session.event(
                "adjust_auth",
                format!(
                    "Cycled through {} auth possibilities and found none that work for Entry with ID: {}, IP: {}",
                    auths.len(),
                    entry.id,
                    entry.ip
                ),
            );
            entry.reachable = false;
            false
        }
    }
}

/// Promote or demote the entry's current auth.
pub fn record_outcome(auths: &[AuthPossibility], entry: &Entrypoint, success: bool) {
    let delta = if success { 1 } else { -1 };
    if let Some(auth) = auths.iter().find(|a| a.id == entry.auth) {
        let score = auth.adjust_score(delta);
        debug!("auth id {} score is now {}", auth.id, score);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool() -> Vec<AuthPossibility> {
        vec![
            AuthPossibility::new("A", "admin", "switch"),
            AuthPossibility::new("B", "other", "secret"),
        ]
    }

    #[test]
    fn test_admin_first_then_fallback_then_exhausted() {
        let session = CrawlSession::new();
        let auths = pool();
        let mut entry = Entrypoint::new("1", "10.0.0.1", 22);

        assert!(select_next(&auths, &mut entry, false, &session));
        assert_eq!(entry.auth, "A");

        record_outcome(&auths, &entry, false);
        assert!(select_next(&auths, &mut entry, true, &session));
        assert_eq!(entry.auth, "B");

        record_outcome(&auths, &entry, false);
        assert!(!select_next(&auths, &mut entry, true, &session));
        assert!(!entry.reachable);
        assert_eq!(entry.authfailed, vec!["A", "B"]);

        let messages = session.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].starts_with("Cycled through 2 auth possibilities"));
        assert!(messages[0].ends_with("ID: 1, IP: 10.0.0.1"));
    }

    #[test]
    fn test_ties_go_to_last_inserted() {
        let session = CrawlSession::new();
        let auths = vec![
            AuthPossibility::new("1", "ops", "a"),
            AuthPossibility::new("2", "field", "b"),
            AuthPossibility::new("3", "noc", "c"),
        ];
        let mut entry = Entrypoint::new("1", "10.0.0.1", 22);
        select_next(&auths, &mut entry, false, &session);
        assert_eq!(entry.auth, "3");
    }

    #[test]
    fn test_higher_score_wins() {
        let session = CrawlSession::new();
        let auths = vec![
            AuthPossibility::new("1", "ops", "a"),
            AuthPossibility::new("2", "field", "b"),
        ];
        auths[0].adjust_score(3);
        let mut entry = Entrypoint::new("1", "10.0.0.1", 22);
        select_next(&auths, &mut entry, false, &session);
        assert_eq!(entry.auth, "1");
    }

    #[test]
    fn test_admin_bump_persists() {
        let session = CrawlSession::new();
        let auths = pool();
        let mut entry = Entrypoint::new("1", "10.0.0.1", 22);
        select_next(&auths, &mut entry, false, &session);
        assert_eq!(auths[0].score(), 2);
        select_next(&auths, &mut entry, false, &session);
        assert_eq!(auths[0].score(), 2);
    }

    #[test]
    fn test_record_outcome_unknown_auth_is_ignored() {
        let auths = pool();
        let mut entry = Entrypoint::new("1", "10.0.0.1", 22);
        entry.auth = "missing".into();
        record_outcome(&auths, &entry, true);
        assert_eq!(auths[0].score(), 1);
        assert_eq!(auths[1].score(), 1);
    }
}
