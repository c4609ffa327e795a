//! Typed errors for one locality's extraction and for configuration.
//!
//! Locality-scoped errors are non-fatal: the run loop records them and moves
//! on. Only `ConfigError` and setup failures stop a run before it starts.

use thiserror::Error;

/// The listing page could not be retrieved, after all retries.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {status} from {url} after {attempts} attempt(s)")]
    Status {
        url: String,
        status: u16,
        attempts: u32,
    },

    #[error("timed out fetching {url} after {attempts} attempt(s)")]
    Timeout { url: String, attempts: u32 },

    #[error("request to {url} failed after {attempts} attempt(s): {source}")]
    Transport {
        url: String,
        attempts: u32,
        #[source]
        source: reqwest::Error,
    },
}

impl FetchError {
    pub fn attempts(&self) -> u32 {
        match self {
            FetchError::Status { attempts, .. }
            | FetchError::Timeout { attempts, .. }
            | FetchError::Transport { attempts, .. } => *attempts,
        }
    }
}

/// The page was retrieved but matches no known pricing layout.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("no pricing block or price table found on {url}")]
    UnknownLayout { url: String },

    #[error("invalid selector {0:?}")]
    Selector(String),
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("cannot build listing URL: {0}")]
    Url(#[from] url::ParseError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("no localities configured")]
    NoLocalities,

    #[error("http.max_attempts must be at least 1")]
    InvalidRetry,

    #[error("invalid site.base_url {url:?}: {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}
