use serde::{Deserialize, Serialize};

/// The authenticated account, as returned by `GET /v1/me`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// A publication the user can post to.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Publication {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub url: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// An article ready to publish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub title: String,
    /// `markdown` or `html`.
    pub content_format: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canonical_url: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// `public`, `draft`, or `unlisted`.
    pub publish_status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    pub notify_followers: bool,
}

/// What the provider reports back after a successful post.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostedArticle {
    pub id: String,
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub canonical_url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub publish_status: Option<String>,
    #[serde(default)]
    pub license: Option<String>,
}
