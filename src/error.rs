use thiserror::Error;

/// Failures surfaced by candidate generation and structured extraction.
///
/// History store failures never show up here: seen/saved lookups degrade to
/// empty sets inside `HistoryTracker`.
#[derive(Debug, Error)]
pub enum ScoutError {
    #[error("empty response from provider")]
    EmptyResponse,

    #[error("empty extraction response from provider")]
    EmptyExtractionResponse,

    #[error("malformed provider output: {message}. Raw output: {raw}")]
    MalformedOutput { message: String, raw: String },

    #[error("schema validation failed: {message}. Raw output: {raw}")]
    SchemaValidation { message: String, raw: String },

    #[error("extraction failed after retry. First error: {first}. Second error: {second}")]
    ExtractionFailedAfterRetry { first: String, second: String },

    #[error(transparent)]
    Scrape(#[from] ScrapeError),

    #[error(transparent)]
    Provider(#[from] anyhow::Error),
}

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("timed out fetching {url}")]
    Timeout { url: String },

    #[error("failed to fetch {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("no readable text found on {url}")]
    NoText { url: String },
}

impl ScoutError {
    pub fn schema(message: impl Into<String>, raw: &str) -> Self {
        ScoutError::SchemaValidation {
            message: message.into(),
            raw: raw.to_string(),
        }
    }
}
