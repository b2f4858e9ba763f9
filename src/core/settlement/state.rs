use serde::Serialize;
use std::fmt;

/// Lifecycle of a single settlement attempt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum AttemptState {
    Idle,
    QuoteRequested,
    Quoted,
    BalanceVerified,
    Prepared,
    Signed,
    Submitted,
    Confirmed,
    Failed(String),
}

impl AttemptState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, AttemptState::Confirmed | AttemptState::Failed(_))
    }

    /// Forward-only transitions; `Failed` is reachable from any non-terminal state.
    pub fn can_advance_to(&self, next: &AttemptState) -> bool {
        use AttemptState::*;
        match (self, next) {
            (from, Failed(_)) => !from.is_terminal(),
            (Idle, QuoteRequested)
            | (QuoteRequested, Quoted)
            | (Quoted, BalanceVerified)
            | (BalanceVerified, Prepared)
            | (Prepared, Signed)
            | (Signed, Submitted)
            | (Submitted, Confirmed) => true,
            _ => false,
        }
    }
}

impl fmt::Display for AttemptState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptState::Failed(reason) => write!(f, "Failed({})", reason),
            other => write!(f, "{:?}", other),
        }
    }
}
