use crate::config::Config;
use crate::constants::{MAX_REPOSITORY_FILE_BYTES, REPOSITORY_EXTENSIONS};
use crate::models::{Document, FileMeta};
use crate::utils::get_extension;
use anyhow::{Context, Result};
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Downloads a branch archive from GitHub and turns its text files into documents
pub struct GithubClient {
    archive_url: String,
    token: Option<String>,
    client: reqwest::Client,
}

impl GithubClient {
    pub fn new(archive_url: &str, token: Option<String>) -> Self {
        Self {
            archive_url: archive_url.trim_end_matches('/').to_string(),
            token,
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.github.archive_url, config.github_token())
    }

    pub fn archive_url_for(&self, owner: &str, repo: &str, branch: &str) -> String {
        format!("{}/{}/{}/zip/refs/heads/{}", self.archive_url, owner, repo, branch)
    }

    /// Documents for every accepted file of `owner/repo` at `branch`
    pub async fn fetch_documents(&self, owner: &str, repo: &str, branch: &str) -> Result<Vec<Document>> {
        let url = self.archive_url_for(owner, repo, branch);
        tracing::info!(%url, "downloading repository archive");

        let mut request = self
            .client
            .get(&url)
            .header(reqwest::header::USER_AGENT, concat!("chatrag/", env!("CARGO_PKG_VERSION")));
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("Failed to connect to GitHub for {}/{}", owner, repo))?;

        if !response.status().is_success() {
            let status = response.status();
            anyhow::bail!("GitHub returned {} for {}/{} branch {}", status, owner, repo, branch);
        }

        let bytes = response
            .bytes()
            .await
            .context("Failed to download repository archive")?;

        let prefix = PathBuf::from(owner).join(repo);
        tokio::task::spawn_blocking(move || extract_documents(&bytes, &prefix)).await?
    }
}

fn accepted(name: &str) -> bool {
    get_extension(Path::new(name))
        .map(|ext| REPOSITORY_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// Read accepted files from a GitHub zip archive. The archive's top-level
/// `<repo>-<branch>/` directory is replaced by `prefix`.
fn extract_documents(bytes: &[u8], prefix: &Path) -> Result<Vec<Document>> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).context("Failed to read repository archive")?;
    let now = SystemTime::now();

    let mut docs = Vec::new();
    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .with_context(|| format!("Failed to read archive entry {}", i))?;
        if entry.is_dir() {
            continue;
        }

        let name = entry.name().to_string();
        let relative = match name.split_once('/') {
            Some((_, rest)) if !rest.is_empty() => rest.to_string(),
            _ => name.clone(),
        };
        if !accepted(&relative) || entry.size() > MAX_REPOSITORY_FILE_BYTES {
            tracing::debug!(file = %relative, size = entry.size(), "skipping repository file");
            continue;
        }

        let mut raw = Vec::with_capacity(entry.size() as usize);
        entry
            .read_to_end(&mut raw)
            .with_context(|| format!("Failed to read {} from archive", name))?;

        let path = prefix.join(&relative);
        let meta = FileMeta::new(
            path.clone(),
            raw.len() as u64,
            get_extension(&path),
            now,
            now,
            blake3::hash(&raw).to_hex().to_string(),
        );
        docs.push(Document::new(String::from_utf8_lossy(&raw).into_owned(), meta, None));
    }

    tracing::info!(files = docs.len(), repo = %prefix.display(), "repository files extracted");
    Ok(docs)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};
    use zip::write::FileOptions;

    pub(crate) fn repo_archive(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .add_directory("treasure-main/", FileOptions::default())
            .unwrap();
        for (name, body) in entries {
            writer
                .start_file(format!("treasure-main/{}", name), FileOptions::default())
                .unwrap();
            writer.write_all(body.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_archive_url() {
        let client = GithubClient::new("https://codeload.github.com/", None);
        assert_eq!(
            client.archive_url_for("blackbeard", "treasure", "main"),
            "https://codeload.github.com/blackbeard/treasure/zip/refs/heads/main"
        );
    }

    #[test]
    fn test_extract_filters_and_prefixes() {
        let bytes = repo_archive(&[
            ("README.md", "# Treasure map"),
            ("src/ship.rs", "fn sail() {}"),
            ("assets/logo.png", "not text"),
            ("Makefile", "all:"),
        ]);
        let docs = extract_documents(&bytes, Path::new("blackbeard/treasure")).unwrap();

        let paths: Vec<PathBuf> = docs.iter().map(|d| d.meta.path.clone()).collect();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("blackbeard/treasure/README.md"),
                PathBuf::from("blackbeard/treasure/src/ship.rs"),
            ]
        );
        assert_eq!(docs[1].text, "fn sail() {}");
        assert_eq!(docs[1].meta.extension.as_deref(), Some("rs"));
    }

    #[test]
    fn test_extract_rejects_garbage() {
        assert!(extract_documents(b"not a zip", Path::new("o/r")).is_err());
    }

    #[tokio::test]
    async fn test_fetch_documents_with_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/blackbeard/treasure/zip/refs/heads/main"))
            .and(header("authorization", "Bearer ghp_test"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(repo_archive(&[("map.txt", "X marks the spot")]), "application/zip"),
            )
            .mount(&server)
            .await;

        let client = GithubClient::new(&server.uri(), Some("ghp_test".to_string()));
        let docs = client.fetch_documents("blackbeard", "treasure", "main").await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].text, "X marks the spot");
    }

    #[tokio::test]
    async fn test_fetch_documents_missing_branch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = GithubClient::new(&server.uri(), None);
        let err = client.fetch_documents("blackbeard", "treasure", "nope").await.unwrap_err();
        assert!(err.to_string().contains("404"));
    }
}
