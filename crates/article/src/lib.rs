use std::path::Path;

use {
    anyhow::{Context, bail},
    inkctl_api::Article,
    serde::Deserialize,
};

/// Front-matter options recognized at the top of an article file.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct FrontMatter {
    title: Option<String>,
    tags: Vec<String>,
    status: Option<String>,
    license: Option<String>,
    #[serde(rename = "canonicalURL")]
    canonical_url: Option<String>,
    published_at: Option<String>,
    publication_number: usize,
    notify_followers: bool,
}

/// Parse an article file into the wire representation plus the publication
/// index chosen in its front matter.
///
/// `.html`/`.htm` files post as HTML, everything else as Markdown. Front
/// matter is optional; a file without it posts whole with the defaults
/// (title "untitled", status "public").
pub fn parse_article(path: &Path) -> anyhow::Result<(Article, usize)> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    if raw.trim().is_empty() {
        bail!("{} is empty", path.display());
    }

    let (front, content) = split_front_matter(&raw)?;

    let content_format = match path.extension().and_then(|e| e.to_str()) {
        Some("html") | Some("htm") => "html",
        _ => "markdown",
    };

    let article = Article {
        title: front.title.unwrap_or_else(|| "untitled".to_string()),
        content_format: content_format.to_string(),
        content,
        canonical_url: front.canonical_url,
        tags: front.tags,
        publish_status: front.status.unwrap_or_else(|| "public".to_string()),
        published_at: front.published_at,
        license: front.license,
        notify_followers: front.notify_followers,
    };

    Ok((article, front.publication_number))
}

/// Split optional `---` delimited YAML front matter off the body.
fn split_front_matter(raw: &str) -> anyhow::Result<(FrontMatter, String)> {
    let trimmed = raw.trim_start();
    if !trimmed.starts_with("---") {
        return Ok((FrontMatter::default(), raw.to_string()));
    }

    let after_open = &trimmed[3..];
    let close = after_open
        .find("\n---")
        .context("unterminated front matter: missing closing ---")?;

    let front: FrontMatter =
        serde_yaml::from_str(after_open[..close].trim()).context("invalid front matter")?;
    let body = after_open[close + 4..]
        .trim_start_matches(['\r', '\n'])
        .to_string();
    Ok((front, body))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn markdown_with_front_matter() {
        let dir = std::env::temp_dir();
        let path = write(
            &dir,
            "inkctl-test-article.md",
            "---\ntitle: Test article\ntags: [rust, cli]\nstatus: draft\npublicationNumber: 2\n---\n\n# Body\n",
        );

        let (article, number) = parse_article(&path).unwrap();
        assert_eq!(article.title, "Test article");
        assert_eq!(article.content_format, "markdown");
        assert_eq!(article.tags, vec!["rust", "cli"]);
        assert_eq!(article.publish_status, "draft");
        assert_eq!(article.content, "# Body\n");
        assert_eq!(number, 2);
    }

    #[test]
    fn html_extension_switches_the_format() {
        let dir = std::env::temp_dir();
        let path = write(
            &dir,
            "inkctl-test-article.html",
            "---\ntitle: Test article HTML\n---\n<p>hi</p>\n",
        );

        let (article, number) = parse_article(&path).unwrap();
        assert_eq!(article.content_format, "html");
        assert_eq!(number, 0);
    }

    #[test]
    fn file_without_front_matter_posts_whole() {
        let dir = std::env::temp_dir();
        let path = write(&dir, "inkctl-test-plain.md", "Just a paragraph.\n");

        let (article, number) = parse_article(&path).unwrap();
        assert_eq!(article.title, "untitled");
        assert_eq!(article.publish_status, "public");
        assert_eq!(article.content, "Just a paragraph.\n");
        assert_eq!(number, 0);
    }

    #[test]
    fn canonical_url_and_notify_round_through() {
        let dir = std::env::temp_dir();
        let path = write(
            &dir,
            "inkctl-test-canonical.md",
            "---\ntitle: T\ncanonicalURL: https://example.com/t\nnotifyFollowers: true\n---\nbody\n",
        );

        let (article, _) = parse_article(&path).unwrap();
        assert_eq!(article.canonical_url.as_deref(), Some("https://example.com/t"));
        assert!(article.notify_followers);
    }

    #[test]
    fn empty_file_is_rejected() {
        let dir = std::env::temp_dir();
        let path = write(&dir, "inkctl-test-empty.md", "");
        assert!(parse_article(&path).is_err());
    }

    #[test]
    fn unterminated_front_matter_is_rejected() {
        let dir = std::env::temp_dir();
        let path = write(&dir, "inkctl-test-open.md", "---\ntitle: T\nno closing\n");
        assert!(parse_article(&path).is_err());
    }
}
