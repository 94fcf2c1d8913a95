//! Session transcript classification.

use log::trace;

use crate::transport::script::{HOST_KEY_CHANGED, NEED_TO_WAIT, RESOLVE_FAILED, TIMED_OUT};

/// Transcripts shorter than this that time out never reached a login.
const ANSWERED_MIN_LINES: usize = 4;

/// Substring of the host key warning that marks stale keys.
const BAD_KEYS: &str = "DOING SOMETHING NASTY";

/// What a transcript says about the session that produced it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Outcome {
    pub reachable: bool,
    pub auth_success: bool,
    pub retry_later: bool,
    pub bad_host_keys: bool,
}

impl Outcome {
    pub fn new(reachable: bool, auth_success: bool, retry_later: bool, bad_host_keys: bool) -> Self {
        Self {
            reachable,
            auth_success,
            retry_later,
            bad_host_keys,
        }
    }
}

/// Classify a transcript line by line. Every line overwrites the flags it
/// touches and a line without any marker counts as success, so the last
/// classifying line wins.
pub fn classify(lines: &[String]) -> Outcome {
    let mut outcome = Outcome::default();
    for line in lines {
        if line.contains(TIMED_OUT) {
            // Exactly four lines already counts as answered.
            if lines.len() < ANSWERED_MIN_LINES {
                outcome.reachable = false;
            } else {
                outcome.auth_success = false;
            }
        } else if line.contains(NEED_TO_WAIT) {
            outcome.retry_later = true;
            outcome.auth_success = true;
            outcome.reachable = true;
        } else if line.contains(RESOLVE_FAILED) {
            outcome.retry_later = false;
            outcome.auth_success = false;
            outcome.reachable = false;
        } else if line.contains(BAD_KEYS) {
            outcome.retry_later = true;
            outcome.auth_success = false;
            outcome.reachable = true;
            outcome.bad_host_keys = true;
        } else {
            outcome.reachable = true;
            outcome.auth_success = true;
            outcome.retry_later = false;
        }
    }
    trace!("classified {} lines as {:?}", lines.len(), outcome);
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &[&str]) -> Vec<String> {
        text.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_short_timeout_is_unreachable() {
        assert_eq!(
            classify(&lines(&["Timed Out!"])),
            Outcome::new(false, false, false, false)
        );
    }

    #[test]
    fn test_long_timeout_is_auth_failure() {
        let outcome = classify(&lines(&[
            "ssh admin@10.0.0.1",
            "admin@10.0.0.1's password:",
            "Permission denied, please try again.",
            "admin@10.0.0.1's password:",
            "Timed Out!",
        ]));
        assert!(!outcome.auth_success);
        assert!(outcome.reachable);
        assert!(!outcome.retry_later);
    }

    #[test]
    fn test_timeout_line_count_boundary() {
        let three = classify(&lines(&["ssh admin@10.0.0.1", "admin@10.0.0.1's password:", "Timed Out!"]));
        assert!(!three.reachable);

        let four = classify(&lines(&[
            "ssh admin@10.0.0.1",
            "admin@10.0.0.1's password:",
            "admin@10.0.0.1's password:",
            "Timed Out!",
        ]));
        assert!(four.reachable);
        assert!(!four.auth_success);
    }

    #[test]
    fn test_need_to_wait() {
        assert_eq!(
            classify(&lines(&["Need to wait."])),
            Outcome::new(true, true, true, false)
        );
    }

    #[test]
    fn test_resolve_failure() {
        let outcome = classify(&lines(&[
            "ssh: Could not resolve hostname nope.invalid: Name or service not known",
        ]));
        assert_eq!(outcome, Outcome::new(false, false, false, false));
    }

    #[test]
    fn test_bad_host_keys() {
        let outcome = classify(&lines(&[HOST_KEY_CHANGED]));
        assert_eq!(outcome, Outcome::new(true, false, true, true));
    }

    #[test]
    fn test_clean_session() {
        let outcome = classify(&lines(&["-> show system", "  Name:         sw-1,", "->"]));
        assert_eq!(outcome, Outcome::new(true, true, false, false));
    }

    #[test]
    fn test_trailing_line_masks_failure() {
        let outcome = classify(&lines(&["Need to wait.", "Connection to 10.0.0.2 closed."]));
        assert_eq!(outcome, Outcome::new(true, true, false, false));
    }

    #[test]
    fn test_empty_transcript() {
        assert_eq!(classify(&[]), Outcome::default());
    }
}
