use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Access token expired")]
    CredentialExpired,

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Rate limited by the catalog service")]
    RateLimited,

    #[error("Catalog service unavailable (HTTP {0})")]
    Unavailable(u16),

    #[error("Unexpected response (HTTP {status}): {body}")]
    Status { status: u16, body: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl CatalogError {
    /// Whether retrying the same request later may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            CatalogError::RateLimited | CatalogError::Unavailable(_) => true,
            CatalogError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request() || e.is_body(),
            _ => false,
        }
    }
}
