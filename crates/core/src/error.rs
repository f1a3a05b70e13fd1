use thiserror::Error;

/// Why a keyed object could not be located in a response body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    /// The quoted key never appears in the text.
    #[error("{0} not found")]
    KeyNotFound(String),
    /// The key is present but no `:` follows it.
    #[error("no ':' after key {0}")]
    MissingColon(String),
    /// No `{` follows the key's colon.
    #[error("no object start after key {0}")]
    MissingBrace(String),
    /// Brace depth never returned to zero before the text ended.
    #[error("unterminated object for key {0}")]
    Unterminated(String),
}

/// Every failure a poll cycle can run into.
#[derive(Debug, Error)]
pub enum WatchError {
    /// Transport or connection failure talking to the upstream page.
    #[error("fetch failed: {0}")]
    Fetch(String),
    /// The payload could not be located in the response text.
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    /// The extracted text is not valid JSON.
    #[error("Failed to parse extracted JSON: {0}")]
    Parse(#[from] serde_json::Error),
    /// Snapshot read or write failure.
    #[error("snapshot persistence failed: {0}")]
    Persistence(String),
    /// Email dispatch failure.
    #[error("email delivery failed: {0}")]
    Delivery(String),
    /// API key material could not be resolved at startup.
    #[error("credential initialisation failed: {0}")]
    Credential(String),
}

impl WatchError {
    /// Short stable label, used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            WatchError::Fetch(_) => "fetch",
            WatchError::Extraction(_) => "extraction",
            WatchError::Parse(_) => "parse",
            WatchError::Persistence(_) => "persistence",
            WatchError::Delivery(_) => "delivery",
            WatchError::Credential(_) => "credential",
        }
    }
}
