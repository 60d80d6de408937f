use std::time::Duration;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by the authorization flow and credential lifecycle.
///
/// Every variant is terminal for the current command: nothing here is
/// retried, and a failed exchange or refresh never touches a previously
/// persisted credential.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The redirect listener could not bind its socket.
    #[error("failed to bind redirect listener on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// A configured URI (redirect or authorize endpoint) does not parse.
    #[error("invalid URI '{uri}': {reason}")]
    InvalidUri { uri: String, reason: String },

    /// The OS random source could not supply entropy for the state nonce.
    #[error("secure random source unavailable: {0}")]
    Entropy(String),

    /// The provider redirected back with an error, or without a usable code.
    #[error("provider rejected the authorization: {0}")]
    ProviderAuthorization(String),

    /// The `state` round-tripped through the redirect does not match the
    /// nonce generated for this attempt.
    #[error("state parameter mismatch: redirect was not initiated by this attempt")]
    StateMismatch,

    /// No redirect arrived within the configured window.
    #[error("timed out after {0:?} waiting for the authorization redirect")]
    Timeout(Duration),

    /// The token endpoint rejected an exchange or refresh grant.
    #[error("token exchange failed: {0}")]
    Exchange(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// Credential store I/O failure.
    #[error("failed to persist credential: {0}")]
    Persist(#[source] std::io::Error),

    /// No credential exists at the resolved store path. The operator has
    /// not run `auth` yet.
    #[error("API credential is not set; run 'inkctl auth' first")]
    CredentialNotFound,

    /// The credential file exists but does not parse.
    #[error("credential file is corrupt ({0}); re-run 'inkctl auth'")]
    CredentialCorrupt(#[source] serde_json::Error),

    /// Refresh was requested on a credential issued before the provider
    /// supported refresh tokens.
    #[error("stored credential has no refresh token; re-run 'inkctl auth'")]
    MissingRefreshToken,
}
