use {
    serde::{Deserialize, de::DeserializeOwned},
    tracing::debug,
};

use crate::{
    error::{Error, Result},
    types::{Article, PostedArticle, Publication, User},
};

/// Medium's REST base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.medium.com/v1";

/// Every response wraps its payload in a `data` envelope.
#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Deserialize)]
struct ApiErrors {
    errors: Vec<ApiErrorBody>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Authenticated handle to the provider's REST endpoints.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
    access_token: String,
}

impl Client {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            access_token: access_token.into(),
        }
    }

    /// Point the client at a different base URL (tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Resolve the current user.
    pub async fn me(&self) -> Result<User> {
        self.get("/me").await
    }

    /// List the publications `user_id` can contribute to.
    pub async fn publications(&self, user_id: &str) -> Result<Vec<Publication>> {
        self.get(&format!("/users/{user_id}/publications")).await
    }

    /// Post an article to the user's own profile.
    pub async fn publish_user_post(
        &self,
        user_id: &str,
        article: &Article,
    ) -> Result<PostedArticle> {
        self.post(&format!("/users/{user_id}/posts"), article).await
    }

    /// Post an article under a publication.
    pub async fn publish_publication_post(
        &self,
        publication_id: &str,
        article: &Article,
    ) -> Result<PostedArticle> {
        self.post(&format!("/publications/{publication_id}/posts"), article)
            .await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let resp = self
            .http
            .get(format!("{}{path}", self.base_url))
            .bearer_auth(&self.access_token)
            .send()
            .await?;
        Self::decode(path, resp).await
    }

    async fn post<T: DeserializeOwned>(&self, path: &str, body: &Article) -> Result<T> {
        let resp = self
            .http
            .post(format!("{}{path}", self.base_url))
            .bearer_auth(&self.access_token)
            .json(body)
            .send()
            .await?;
        Self::decode(path, resp).await
    }

    async fn decode<T: DeserializeOwned>(path: &str, resp: reqwest::Response) -> Result<T> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrors>(&body)
                .ok()
                .and_then(|e| e.errors.into_iter().next())
                .map(|e| e.message)
                .unwrap_or(body);

            if status == reqwest::StatusCode::UNAUTHORIZED
                || status == reqwest::StatusCode::FORBIDDEN
            {
                return Err(Error::Authentication(message));
            }
            return Err(Error::Api {
                status: status.as_u16(),
                message,
            });
        }

        debug!(path, %status, "api call succeeded");
        Ok(resp.json::<Envelope<T>>().await?.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article() -> Article {
        Article {
            title: "Hello".into(),
            content_format: "markdown".into(),
            content: "# Hello".into(),
            canonical_url: None,
            tags: vec!["testing".into()],
            publish_status: "draft".into(),
            published_at: None,
            license: None,
            notify_followers: false,
        }
    }

    #[tokio::test]
    async fn me_decodes_the_data_envelope() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v1/me")
            .match_header("authorization", "Bearer access")
            .with_status(200)
            .with_body(
                r#"{"data":{"id":"u1","username":"ada","name":"Ada","url":"https://medium.com/@ada"}}"#,
            )
            .create_async()
            .await;

        let client = Client::new("access").with_base_url(format!("{}/v1", server.url()));
        let user = client.me().await.unwrap();
        assert_eq!(user.id, "u1");
        assert_eq!(user.username, "ada");
    }

    #[tokio::test]
    async fn rejected_token_is_an_authentication_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v1/me")
            .with_status(401)
            .with_body(r#"{"errors":[{"message":"Token was invalid.","code":6000}]}"#)
            .create_async()
            .await;

        let client = Client::new("stale").with_base_url(format!("{}/v1", server.url()));
        match client.me().await.unwrap_err() {
            Error::Authentication(message) => assert_eq!(message, "Token was invalid."),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn other_failures_carry_status_and_message() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v1/users/u1/publications")
            .with_status(500)
            .with_body(r#"{"errors":[{"message":"server on fire","code":5000}]}"#)
            .create_async()
            .await;

        let client = Client::new("access").with_base_url(format!("{}/v1", server.url()));
        match client.publications("u1").await.unwrap_err() {
            Error::Api { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "server on fire");
            },
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn publish_posts_the_article() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/users/u1/posts")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "title": "Hello",
                "contentFormat": "markdown",
                "publishStatus": "draft",
            })))
            .with_status(201)
            .with_body(
                r#"{"data":{"id":"p1","title":"Hello","url":"https://medium.com/p/p1","publishStatus":"draft","tags":["testing"]}}"#,
            )
            .create_async()
            .await;

        let client = Client::new("access").with_base_url(format!("{}/v1", server.url()));
        let posted = client.publish_user_post("u1", &article()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(posted.id, "p1");
        assert_eq!(posted.publish_status.as_deref(), Some("draft"));
    }

    #[tokio::test]
    async fn publication_posts_use_the_publication_route() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/publications/pub9/posts")
            .with_status(201)
            .with_body(r#"{"data":{"id":"p2","title":"Hello","url":"https://medium.com/p/p2"}}"#)
            .create_async()
            .await;

        let client = Client::new("access").with_base_url(format!("{}/v1", server.url()));
        let posted = client
            .publish_publication_post("pub9", &article())
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(posted.id, "p2");
    }
}
