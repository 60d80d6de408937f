use serde::{Deserialize, Serialize};

/// The persisted credential record.
///
/// Created by a successful authorization or refresh exchange and always
/// overwritten whole; the store never applies a partial update. The file
/// holding it is equivalent to a password and is documented as such to the
/// operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub client_id: String,
    pub client_secret: String,
    pub access_token: String,
    /// Unix timestamp when the access token expires.
    pub expires_at: u64,
    /// Absent on credentials issued before the provider supported refresh.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl Credential {
    /// Assemble a credential from the application identity and a fresh grant.
    pub fn from_grant(client_id: &str, client_secret: &str, grant: TokenGrant) -> Self {
        Self {
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            access_token: grant.access_token,
            expires_at: grant.expires_at,
            refresh_token: grant.refresh_token,
        }
    }
}

/// Token fields returned by the provider's token endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Unix timestamp when the access token expires.
    #[serde(default)]
    pub expires_at: u64,
}

/// What the redirect listener extracted from the provider's callback.
///
/// Exactly one outcome is produced per listener session, or none at all if
/// the session times out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectOutcome {
    /// The provider sent back a code. It may be empty if the redirect was
    /// malformed; that is an exchange failure, not a listener failure.
    Code { code: String, state: String },
    /// The provider reported an error; any `code` present is ignored.
    ProviderError(String),
}
