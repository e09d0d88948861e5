use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("Transport error: {0}")]
    Transport(String),
}

/// Failure talking to the recipe provider.
///
/// "No results" is never an error; it is an empty vec or `None`.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Malformed payload from {url}: {message}")]
    Malformed { url: String, message: String },
}

#[derive(Error, Debug)]
pub enum RecommendError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Recipe provider unavailable during {stage}: {source}")]
    ProviderUnavailable {
        stage: &'static str,
        #[source]
        source: ProviderError,
    },
}
