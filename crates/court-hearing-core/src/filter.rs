//! Court code derivation and allow-list filtering

use std::collections::HashSet;

use crate::error::{RelayError, RelayResult};

/// Number of leading characters of a court centre code that form the court code
pub const COURT_CODE_LENGTH: usize = 5;

/// Decide whether an event for `court_code` should be relayed.
///
/// A disabled allow-list relays everything.
pub fn should_relay(court_code: &str, allow_list: &HashSet<String>, enabled: bool) -> bool {
    !enabled || allow_list.contains(court_code)
}

/// Split a comma separated list such as `"B10JQ, B33HU"` into court codes.
///
/// Entries are trimmed and blanks dropped, the same as [`AllowList::new`].
pub fn parse_court_codes(csv: &str) -> Vec<String> {
    csv.split(',').filter_map(normalize_code).collect()
}

fn normalize_code(code: &str) -> Option<String> {
    let code = code.trim();
    (!code.is_empty()).then(|| code.to_string())
}

/// Take the court code from a full court centre code.
///
/// Codes shorter than [`COURT_CODE_LENGTH`] characters are not padded or
/// passed through; they fail with [`RelayError::CourtCodeOutOfRange`].
pub fn court_code(centre_code: &str) -> RelayResult<&str> {
    match centre_code.char_indices().nth(COURT_CODE_LENGTH) {
        Some((end, _)) => Ok(&centre_code[..end]),
        None => {
            let length = centre_code.chars().count();
            if length == COURT_CODE_LENGTH {
                Ok(centre_code)
            } else {
                Err(RelayError::CourtCodeOutOfRange {
                    code: centre_code.to_string(),
                    length,
                })
            }
        }
    }
}

/// Courts whose events are relayed, plus the toggle that activates the list.
///
/// Built once at startup and shared read-only between requests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowList {
    courts: HashSet<String>,
    enabled: bool,
}

impl AllowList {
    /// Entries are trimmed and blank ones ignored
    pub fn new<I, S>(courts: I, enabled: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            courts: courts
                .into_iter()
                .filter_map(|code| normalize_code(code.as_ref()))
                .collect(),
            enabled,
        }
    }

    /// An inactive list that relays every court
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn permits(&self, court_code: &str) -> bool {
        should_relay(court_code, &self.courts, self.enabled)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn len(&self) -> usize {
        self.courts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courts.is_empty()
    }
}
