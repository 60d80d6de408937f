pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The stored credential was rejected while resolving the current
    /// user. Never retried; the operator must re-run `refresh` or `auth`.
    #[error("authentication failed: {0}; run 'inkctl refresh' or 'inkctl auth'")]
    Authentication(String),

    /// The provider answered with a non-success status.
    #[error("medium api error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}
