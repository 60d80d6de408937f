pub mod client;
pub mod error;
pub mod session;
pub mod types;

pub use {
    client::Client,
    error::{Error, Result},
    session::Session,
    types::{Article, PostedArticle, Publication, User},
};
