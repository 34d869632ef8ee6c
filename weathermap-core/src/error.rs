use thiserror::Error;

/// Failures surfaced by the session.
///
/// The string payloads are diagnostics for logs. What the user sees comes
/// from [`SessionError::user_message`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("map widget could not be initialized: {0}")]
    Initialization(String),

    #[error("weather request failed: {0}")]
    Fetch(String),

    #[error("no place matched '{0}'")]
    SearchNotFound(String),

    #[error("search failed: {0}")]
    Search(String),
}

impl SessionError {
    pub fn user_message(&self) -> &'static str {
        match self {
            SessionError::Initialization(_) => "The map could not be loaded.",
            SessionError::Fetch(_) => "Failed to load weather data. Please try again.",
            SessionError::SearchNotFound(_) => "City not found. Please try another search.",
            SessionError::Search(_) => "Search failed. Please try again.",
        }
    }

    /// Everything except a broken map leaves the session usable.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, SessionError::Initialization(_))
    }

    pub(crate) fn fetch(err: &anyhow::Error) -> Self {
        SessionError::Fetch(format!("{err:#}"))
    }

    pub(crate) fn search(err: &anyhow::Error) -> Self {
        SessionError::Search(format!("{err:#}"))
    }
}
