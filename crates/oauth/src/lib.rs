pub mod callback_server;
pub mod error;
pub mod exchange;
pub mod flow;
pub mod state;
pub mod storage;
pub mod types;

pub use {
    callback_server::CallbackServer,
    error::{Error, Result},
    exchange::{TokenClient, refresh_credential},
    flow::{AuthorizeRequest, OAuthFlow},
    state::generate_state,
    storage::CredentialStore,
    types::{Credential, RedirectOutcome, TokenGrant},
};
