use thiserror::Error;

/// The one way a fetch of the matrices collection can fail. Whatever went
/// wrong (transport, status, body) is folded into `reason`.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("failed to fetch matrices from {url}: {reason}")]
pub struct FetchFailed {
    pub url: String,
    pub reason: String,
}

#[derive(Debug, Error)]
pub enum MatrixError {
    #[error(transparent)]
    FetchFailed(#[from] FetchFailed),

    #[error("matrix not found: {title}")]
    MatrixNotFound { title: String },

    #[error("no matrices available")]
    NoMatrices,

    #[error("invalid cell selection '{value}', expected COL:ROW with 1-based indices")]
    InvalidSelection { value: String },

    #[error("invalid date '{value}', expected YYYY-MM-DD")]
    InvalidDate { value: String },

    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },

    #[error("failed to build HTTP client: {source}")]
    HttpClientBuild {
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to setup proxy: {proxy}: {source}")]
    ProxySetup {
        proxy: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to decode matrices document: {source}")]
    Decode {
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
