use tracing::debug;

use crate::{
    error::{Error, Result},
    storage::CredentialStore,
    types::{Credential, TokenGrant},
};

/// Medium's token endpoint, shared by the code and refresh grants.
pub const DEFAULT_TOKEN_URL: &str = "https://api.medium.com/v1/tokens";

/// Exchanges an authorization code, or a refresh token, for an access
/// credential.
#[derive(Debug, Clone)]
pub struct TokenClient {
    http: reqwest::Client,
    token_url: String,
}

impl TokenClient {
    pub fn new() -> Self {
        Self::with_token_url(DEFAULT_TOKEN_URL)
    }

    /// Point the client at a different token endpoint (tests).
    pub fn with_token_url(token_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            token_url: token_url.into(),
        }
    }

    /// Exchange an authorization code for tokens.
    pub async fn exchange_code(
        &self,
        client_id: &str,
        client_secret: &str,
        code: &str,
        redirect_uri: &str,
    ) -> Result<TokenGrant> {
        self.grant(&[
            ("code", code),
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("grant_type", "authorization_code"),
            ("redirect_uri", redirect_uri),
        ])
        .await
    }

    /// Exchange a refresh token for a fresh set of tokens.
    pub async fn refresh(
        &self,
        client_id: &str,
        client_secret: &str,
        refresh_token: &str,
    ) -> Result<TokenGrant> {
        self.grant(&[
            ("refresh_token", refresh_token),
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("grant_type", "refresh_token"),
        ])
        .await
    }

    async fn grant(&self, form: &[(&str, &str)]) -> Result<TokenGrant> {
        let resp = self.http.post(&self.token_url).form(form).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Exchange(format!("{status}: {body}")));
        }

        debug!(%status, "token grant succeeded");
        Ok(resp.json().await?)
    }
}

impl Default for TokenClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Refresh the stored credential in place.
///
/// The refresh-token check happens before any network I/O, and the store is
/// only written after the grant succeeds, so a failed refresh leaves the
/// previous record exactly as it was.
pub async fn refresh_credential(
    client: &TokenClient,
    store: &CredentialStore,
) -> Result<Credential> {
    let current = store.read()?;
    let refresh_token = current
        .refresh_token
        .as_deref()
        .filter(|t| !t.is_empty())
        .ok_or(Error::MissingRefreshToken)?;

    let grant = client
        .refresh(&current.client_id, &current.client_secret, refresh_token)
        .await?;

    let refreshed = Credential::from_grant(&current.client_id, &current.client_secret, grant);
    store.write(&refreshed)?;
    Ok(refreshed)
}
