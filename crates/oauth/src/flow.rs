use std::time::Duration;

use tracing::debug;

use crate::{
    error::{Error, Result},
    state::generate_state,
    types::RedirectOutcome,
};

/// Medium's authorization endpoint.
pub const DEFAULT_AUTHORIZE_URL: &str = "https://medium.com/m/oauth/authorize";

/// Capabilities requested for every credential.
pub const SCOPE: &str = "basicProfile,listPublications,publishPost";

/// How long to wait for the browser redirect before giving up.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

/// A single authorization attempt: the URL to put in front of the operator
/// and the state nonce it carries. Discarded after use; the nonce is never
/// reused across attempts.
#[derive(Debug, Clone)]
pub struct AuthorizeRequest {
    pub url: String,
    pub state: String,
}

/// Composes the authorization URL and maps the redirect outcome to a
/// terminal result.
///
/// An attempt ends in exactly one of three ways: a usable code, a failure
/// (provider error, empty code, or state mismatch), or a timeout raised by
/// [`crate::CallbackServer::wait`].
#[derive(Debug, Clone)]
pub struct OAuthFlow {
    client_id: String,
    redirect_uri: String,
    authorize_url: String,
    window: Duration,
}

impl OAuthFlow {
    pub fn new(client_id: impl Into<String>, redirect_uri: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            redirect_uri: redirect_uri.into(),
            authorize_url: DEFAULT_AUTHORIZE_URL.to_string(),
            window: DEFAULT_WINDOW,
        }
    }

    /// Override the authorization endpoint (tests).
    pub fn with_authorize_url(mut self, url: impl Into<String>) -> Self {
        self.authorize_url = url.into();
        self
    }

    /// Override the redirect-wait window (tests use a couple hundred ms).
    pub fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Begin an attempt: generate a fresh state nonce and compose the URL
    /// the operator's browser must visit.
    pub fn start(&self) -> Result<AuthorizeRequest> {
        let state = generate_state()?;
        let mut url = url::Url::parse(&self.authorize_url).map_err(|e| {
            Error::InvalidUri {
                uri: self.authorize_url.clone(),
                reason: e.to_string(),
            }
        })?;
        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("scope", SCOPE)
            .append_pair("state", &state)
            .append_pair("response_type", "code")
            .append_pair("redirect_uri", &self.redirect_uri);

        debug!(%url, "authorization URL composed");
        Ok(AuthorizeRequest {
            url: url.into(),
            state,
        })
    }

    /// Map the redirect outcome for `request` to an authorization code.
    ///
    /// The returned-state check binds the redirect to the attempt that
    /// produced it; a mismatch is rejected outright rather than exchanged.
    pub fn complete(&self, request: &AuthorizeRequest, outcome: RedirectOutcome) -> Result<String> {
        match outcome {
            RedirectOutcome::ProviderError(error) => Err(Error::ProviderAuthorization(error)),
            RedirectOutcome::Code { state, .. } if state != request.state => {
                Err(Error::StateMismatch)
            },
            RedirectOutcome::Code { code, .. } if code.is_empty() => Err(
                Error::ProviderAuthorization("redirect carried no authorization code".into()),
            ),
            RedirectOutcome::Code { code, .. } => Ok(code),
        }
    }
}
