use std::path::Path;

use {
    anyhow::{Context, Result, bail},
    inkctl_api::{PostedArticle, Session},
    inkctl_oauth::{
        CallbackServer, Credential, CredentialStore, OAuthFlow, TokenClient, refresh_credential,
    },
};

/// Run the interactive authorization flow and persist the credential.
pub async fn auth(client_id: &str, client_secret: &str, redirect_uri: &str) -> Result<()> {
    let flow = OAuthFlow::new(client_id, redirect_uri);

    // Bind before presenting the URL so the redirect cannot beat the
    // listener.
    let server = CallbackServer::bind(redirect_uri).await?;
    let request = flow.start()?;

    println!("Please open this URL to authorize inkctl:\n\n{}\n", request.url);
    if open::that(&request.url).is_ok() {
        println!("(opened in your default browser)");
    }
    println!("Waiting for the authorization redirect on {} ...", server.local_addr());

    let outcome = server.wait(flow.window()).await?;
    let code = flow.complete(&request, outcome)?;

    let grant = TokenClient::new()
        .exchange_code(client_id, client_secret, &code, redirect_uri)
        .await?;
    let credential = Credential::from_grant(client_id, client_secret, grant);

    let store = CredentialStore::resolve()?;
    store.write(&credential)?;

    println!("Your API credential was saved in '{}'.", store.path().display());
    println!("Note: treat this file as a password and do NOT expose it.");
    Ok(())
}

/// Refresh the stored credential.
pub async fn refresh() -> Result<()> {
    let store = CredentialStore::resolve()?;
    refresh_credential(&TokenClient::new(), &store).await?;
    println!("Done");
    Ok(())
}

/// Show the current user and their publications.
pub async fn info() -> Result<()> {
    let session = establish_session().await?;
    let user = &session.user;

    println!("Name: {}", user.name);
    println!("Username: {}", user.username);
    println!("URL: {}", user.url);

    let publications = session.client.publications(&user.id).await?;
    if publications.is_empty() {
        println!("---");
        println!("You have no publications.");
        return Ok(());
    }

    for (number, publication) in publications.iter().enumerate() {
        println!("---");
        println!("Number: {number}");
        println!("Name: {}", publication.name);
        println!("Description: {}", publication.description);
        println!("URL: {}", publication.url);
    }
    Ok(())
}

/// Post an article file, either to the user's profile or to the
/// publication its front matter selects.
pub async fn post(file: &Path, to_user: bool) -> Result<()> {
    let (article, publication_number) = inkctl_article::parse_article(file)?;
    let session = establish_session().await?;

    let posted = if to_user {
        session
            .client
            .publish_user_post(&session.user.id, &article)
            .await?
    } else {
        let publications = session.client.publications(&session.user.id).await?;
        if publications.is_empty() {
            bail!("you have no publications yet");
        }
        let publication = publications
            .get(publication_number)
            .with_context(|| format!("publication number '{publication_number}' is invalid"))?;
        session
            .client
            .publish_publication_post(&publication.id, &article)
            .await?
    };

    show_posted_article(&posted);
    Ok(())
}

async fn establish_session() -> Result<Session> {
    let store = CredentialStore::resolve()?;
    let credential = store.read()?;
    Ok(Session::establish(&credential).await?)
}

fn show_posted_article(posted: &PostedArticle) {
    println!("Your article was successfully posted.\n");
    println!("title: {}", posted.title);
    println!("URL: {}", posted.url);
    if let Some(canonical_url) = &posted.canonical_url {
        println!("canonicalURL: {canonical_url}");
    }
    match posted.publish_status.as_deref() {
        Some(status) if !status.is_empty() => println!("publishStatus: {status}"),
        _ => println!("publishStatus: public"),
    }
    if !posted.tags.is_empty() {
        println!("tags: {}", posted.tags.join(" "));
    }
}
