use std::{collections::HashMap, net::SocketAddr, sync::Arc, time::Duration};

use {
    axum::{Router, extract::Query, response::Html, routing::get},
    tokio::{
        net::TcpListener,
        sync::{Mutex, oneshot},
        task::JoinHandle,
    },
    tracing::debug,
    url::Url,
};

use crate::{
    error::{Error, Result},
    types::RedirectOutcome,
};

/// Body returned to the browser: closes the tab and nothing else.
const CLOSE_PAGE: &str = r#"<script>window.open("about:blank","_self").close()</script>"#;

/// How long graceful shutdown may spend flushing an in-flight response.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// One-shot HTTP listener for the provider's authorization redirect.
///
/// Binds the host:port derived from the registered redirect URI, serves the
/// redirect path, and delivers exactly one [`RedirectOutcome`] to the caller.
/// The serve task is torn down when [`CallbackServer::wait`] returns,
/// whether or not a request ever arrived.
#[derive(Debug)]
pub struct CallbackServer {
    local_addr: SocketAddr,
    rx: oneshot::Receiver<RedirectOutcome>,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl CallbackServer {
    /// Bind the listener on the address parsed out of `redirect_uri`.
    ///
    /// A bind failure (port in use, unroutable host) is fatal and never
    /// retried.
    pub async fn bind(redirect_uri: &str) -> Result<Self> {
        let url = Url::parse(redirect_uri).map_err(|e| Error::InvalidUri {
            uri: redirect_uri.to_string(),
            reason: e.to_string(),
        })?;
        let host = url
            .host_str()
            .ok_or_else(|| Error::InvalidUri {
                uri: redirect_uri.to_string(),
                reason: "missing host".into(),
            })?
            .to_string();
        let port = url
            .port_or_known_default()
            .ok_or_else(|| Error::InvalidUri {
                uri: redirect_uri.to_string(),
                reason: "missing port".into(),
            })?;

        let addr = format!("{host}:{port}");
        let listener = TcpListener::bind(&addr).await.map_err(|source| Error::Bind {
            addr: addr.clone(),
            source,
        })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| Error::Bind { addr, source })?;

        let (tx, rx) = oneshot::channel();
        let tx = Arc::new(Mutex::new(Some(tx)));

        let app = Router::new().route(
            url.path(),
            get(move |Query(params): Query<HashMap<String, String>>| {
                let tx = tx.clone();
                async move {
                    // A non-empty `error` wins; any code alongside it is
                    // ignored. An absent code is delivered as empty and
                    // rejected downstream by the exchange, not here.
                    let outcome = match params.get("error").filter(|e| !e.is_empty()) {
                        Some(error) => RedirectOutcome::ProviderError(error.clone()),
                        None => RedirectOutcome::Code {
                            code: params.get("code").cloned().unwrap_or_default(),
                            state: params.get("state").cloned().unwrap_or_default(),
                        },
                    };

                    // Only the first request delivers; the sender is gone
                    // for any duplicate fire from the browser.
                    if let Some(sender) = tx.lock().await.take() {
                        let _ = sender.send(outcome);
                    }

                    Html(CLOSE_PAGE)
                }
            }),
        );

        debug!(%local_addr, "redirect listener bound");
        let (shutdown, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(async move {
            let _ = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await;
        });

        Ok(Self {
            local_addr,
            rx,
            shutdown,
            task,
        })
    }

    /// The address actually bound (resolves port 0 in tests).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Race the single redirect outcome against `window`.
    ///
    /// Teardown order: any in-flight response is flushed to the browser
    /// first, then the listener socket is released. Either way the socket
    /// is free before this returns, so a timed-out attempt can be
    /// restarted on the same address immediately.
    pub async fn wait(self, window: Duration) -> Result<RedirectOutcome> {
        let outcome = tokio::time::timeout(window, self.rx).await;

        let _ = self.shutdown.send(());
        let mut task = self.task;
        if tokio::time::timeout(SHUTDOWN_GRACE, &mut task).await.is_err() {
            // A client holding its connection open must not wedge teardown.
            task.abort();
            let _ = task.await;
        }

        match outcome {
            Ok(Ok(outcome)) => Ok(outcome),
            Ok(Err(_)) => Err(Error::ProviderAuthorization(
                "redirect listener closed before delivering an outcome".into(),
            )),
            Err(_) => Err(Error::Timeout(window)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn bind_ephemeral() -> CallbackServer {
        CallbackServer::bind("http://127.0.0.1:0/callback")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn delivers_code_and_state() {
        let server = bind_ephemeral().await;
        let addr = server.local_addr();

        tokio::spawn(async move {
            let _ = reqwest::get(format!("http://{addr}/callback?code=abc123&state=xyz")).await;
        });

        let outcome = server.wait(Duration::from_secs(5)).await.unwrap();
        assert_eq!(
            outcome,
            RedirectOutcome::Code {
                code: "abc123".into(),
                state: "xyz".into(),
            }
        );
    }

    #[tokio::test]
    async fn provider_error_wins_over_code() {
        let server = bind_ephemeral().await;
        let addr = server.local_addr();

        tokio::spawn(async move {
            let _ =
                reqwest::get(format!("http://{addr}/callback?error=access_denied&code=zzz")).await;
        });

        let outcome = server.wait(Duration::from_secs(5)).await.unwrap();
        assert_eq!(outcome, RedirectOutcome::ProviderError("access_denied".into()));
    }

    #[tokio::test]
    async fn missing_code_is_delivered_empty() {
        let server = bind_ephemeral().await;
        let addr = server.local_addr();

        tokio::spawn(async move {
            let _ = reqwest::get(format!("http://{addr}/callback?state=xyz")).await;
        });

        let outcome = server.wait(Duration::from_secs(5)).await.unwrap();
        assert_eq!(
            outcome,
            RedirectOutcome::Code {
                code: String::new(),
                state: "xyz".into(),
            }
        );
    }

    #[tokio::test]
    async fn close_page_is_flushed_before_teardown() {
        let server = bind_ephemeral().await;
        let addr = server.local_addr();

        let request = tokio::spawn(async move {
            reqwest::get(format!("http://{addr}/callback?code=abc123&state=xyz")).await
        });

        // Once wait() has returned the listener is gone, so the browser
        // must already have its close page by then.
        server.wait(Duration::from_secs(5)).await.unwrap();

        let resp = request.await.unwrap().unwrap();
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.text().await.unwrap(), CLOSE_PAGE);
    }

    #[tokio::test]
    async fn timeout_releases_the_socket() {
        let server = bind_ephemeral().await;
        let addr = server.local_addr();

        let err = server.wait(Duration::from_millis(200)).await.unwrap_err();
        assert!(matches!(err, Error::Timeout(_)));

        // The port must be free again once wait() has returned.
        TcpListener::bind(addr).await.unwrap();
    }

    #[tokio::test]
    async fn bind_failure_is_fatal() {
        let server = bind_ephemeral().await;
        let addr = server.local_addr();

        let err = CallbackServer::bind(&format!("http://{addr}/callback"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Bind { .. }));

        drop(server);
    }

    #[tokio::test]
    async fn rejects_unparsable_redirect_uri() {
        let err = CallbackServer::bind("not a uri").await.unwrap_err();
        assert!(matches!(err, Error::InvalidUri { .. }));
    }
}
