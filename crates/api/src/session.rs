use {inkctl_oauth::Credential, tracing::debug};

use crate::{client::Client, error::Result, types::User};

/// An authenticated handle plus the identity it resolved to.
///
/// Produced once per command invocation and threaded through the handlers
/// explicitly; there is no process-wide client or user.
#[derive(Debug, Clone)]
pub struct Session {
    pub client: Client,
    pub user: User,
}

impl Session {
    /// Build a client from the stored credential and resolve the current
    /// user with it.
    ///
    /// A rejected access token surfaces as [`crate::Error::Authentication`]
    /// and is never retried with the same credential.
    pub async fn establish(credential: &Credential) -> Result<Self> {
        Self::establish_with(Client::new(&credential.access_token)).await
    }

    /// Establish over a pre-built client (tests point it at a mock server).
    pub async fn establish_with(client: Client) -> Result<Self> {
        let user = client.me().await?;
        debug!(username = %user.username, "session established");
        Ok(Self { client, user })
    }
}
