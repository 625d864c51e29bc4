/// URL state definitions for a site's frontier
///
/// A URL starts `Queued` and reaches exactly one visited state. Visited
/// states are terminal.
use serde::Serialize;
use std::fmt;

/// Represents the current state of a URL in a site crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UrlState {
    /// Waiting in the frontier queue
    Queued,

    /// Disallowed by robots.txt, never requested
    Blocked,

    /// Request failed at the transport level (timeout, DNS, reset, redirects)
    Failed,

    /// Fetched and analyzed; produced a raw and a clean row
    Fetched,
}

impl UrlState {
    /// Returns true if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Queued)
    }

    /// Checks whether moving from `self` to `next` is allowed
    ///
    /// Only `Queued` may move, and only into a visited state.
    pub fn can_transition_to(&self, next: UrlState) -> bool {
        matches!(self, Self::Queued) && next.is_terminal()
    }

    /// Short lowercase label used in logs and reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Blocked => "blocked",
            Self::Failed => "failed",
            Self::Fetched => "fetched",
        }
    }
}

impl fmt::Display for UrlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
