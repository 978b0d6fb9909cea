//! Remote folder synchronization.
//!
//! The pipeline never lists the remote side directly; it mirrors the
//! folder into a local directory first and scans that. The [`FolderSync`]
//! trait keeps the orchestrator testable without a network.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};
use vendas_common::{PipelineError, Result};

/// Brings the remote folder's files into a local directory.
#[async_trait]
pub trait FolderSync: Send + Sync {
    async fn sync(&self, dest: &Path) -> Result<()>;
}

/// One entry of the remote folder index.
#[derive(Debug, Clone, Deserialize)]
pub struct FolderEntry {
    pub name: String,
    pub url: String,
}

/// Syncs an HTTP folder into a local directory.
///
/// The locator URL must answer a JSON array of `{ "name", "url" }`
/// entries; each entry is streamed into the destination under its
/// `name`. Entry names are plain base names; anything carrying a path
/// separator is rejected.
pub struct HttpFolderSync {
    client: Client,
    index_url: String,
    show_progress: bool,
}

impl HttpFolderSync {
    pub fn new(index_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(300))
            .user_agent(format!("vendas-etl/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            index_url: index_url.into(),
            show_progress: true,
        })
    }

    /// Disable download progress bars (tests, CI logs).
    pub fn quiet(mut self) -> Self {
        self.show_progress = false;
        self
    }

    async fn fetch_index(&self) -> Result<Vec<FolderEntry>> {
        let response = self
            .client
            .get(&self.index_url)
            .send()
            .await
            .map_err(|e| PipelineError::sync(format!("folder index request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(PipelineError::sync(format!(
                "folder index request to {} returned {}",
                self.index_url,
                response.status()
            )));
        }

        let entries: Vec<FolderEntry> = response
            .json()
            .await
            .map_err(|e| PipelineError::sync(format!("malformed folder index: {}", e)))?;

        for entry in &entries {
            if entry.name.is_empty()
                || entry.name == ".."
                || entry.name.contains(['/', '\\'])
            {
                return Err(PipelineError::sync(format!(
                    "invalid entry name '{}' in folder index",
                    entry.name
                )));
            }
        }

        Ok(entries)
    }

    async fn download_entry(&self, entry: &FolderEntry, dest: &Path) -> Result<()> {
        let response = self
            .client
            .get(&entry.url)
            .send()
            .await
            .map_err(|e| {
                PipelineError::sync(format!("download of '{}' failed: {}", entry.name, e))
            })?;

        if !response.status().is_success() {
            return Err(PipelineError::sync(format!(
                "download of '{}' returned {}",
                entry.name,
                response.status()
            )));
        }

        let pb = self.show_progress.then(|| {
            let pb = ProgressBar::new(response.content_length().unwrap_or(0));
            let style = ProgressStyle::default_bar()
                .template("{msg}\n{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {bytes}/{total_bytes} ({eta})")
                .unwrap_or_else(|_| ProgressStyle::default_bar());
            pb.set_style(style.progress_chars("#>-"));
            pb.set_message(format!("Downloading {}", entry.name));
            pb
        });

        let mut file = std::fs::File::create(dest.join(&entry.name))?;
        let mut downloaded = 0u64;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| {
                PipelineError::sync(format!("download of '{}' interrupted: {}", entry.name, e))
            })?;
            std::io::Write::write_all(&mut file, &chunk)?;
            downloaded += chunk.len() as u64;
            if let Some(pb) = &pb {
                pb.set_position(downloaded);
            }
        }

        if let Some(pb) = &pb {
            pb.finish_with_message(format!("Downloaded {}", entry.name));
        }

        Ok(())
    }
}

#[async_trait]
impl FolderSync for HttpFolderSync {
    async fn sync(&self, dest: &Path) -> Result<()> {
        std::fs::create_dir_all(dest)?;

        let entries = self.fetch_index().await?;
        info!(count = entries.len(), "syncing remote folder");

        for entry in &entries {
            debug!(name = %entry.name, url = %entry.url, "downloading");
            self.download_entry(entry, dest).await?;
        }

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn sync_against(server: &MockServer) -> (Result<()>, TempDir) {
        let dest = TempDir::new().unwrap();
        let sync = HttpFolderSync::new(format!("{}/index.json", server.uri()))
            .unwrap()
            .quiet();
        let result = sync.sync(dest.path()).await;
        (result, dest)
    }

    #[tokio::test]
    async fn test_sync_downloads_every_indexed_file() {
        let server = MockServer::start().await;
        let index = json!([
            { "name": "vendas1.csv", "url": format!("{}/files/vendas1.csv", server.uri()) },
            { "name": "vendas2.json", "url": format!("{}/files/vendas2.json", server.uri()) },
        ]);
        Mock::given(method("GET"))
            .and(path("/index.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&index))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/files/vendas1.csv"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("quantidade,valor\n3,2.5\n"),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/files/vendas2.json"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(r#"[{"quantidade":5,"valor":1.0}]"#),
            )
            .mount(&server)
            .await;

        let (result, dest) = sync_against(&server).await;
        result.unwrap();

        let csv = fs::read_to_string(dest.path().join("vendas1.csv")).unwrap();
        assert_eq!(csv, "quantidade,valor\n3,2.5\n");
        assert!(dest.path().join("vendas2.json").exists());
    }

    #[tokio::test]
    async fn test_failed_index_request_is_a_sync_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/index.json"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let (result, _dest) = sync_against(&server).await;
        assert!(matches!(result, Err(PipelineError::Sync(_))));
    }

    #[tokio::test]
    async fn test_malformed_index_is_a_sync_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/index.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not an index"))
            .mount(&server)
            .await;

        let (result, _dest) = sync_against(&server).await;
        assert!(matches!(result, Err(PipelineError::Sync(_))));
    }

    #[tokio::test]
    async fn test_entry_name_with_separator_is_rejected() {
        let server = MockServer::start().await;
        let index = json!([
            { "name": "../escapa.csv", "url": format!("{}/x", server.uri()) },
        ]);
        Mock::given(method("GET"))
            .and(path("/index.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&index))
            .mount(&server)
            .await;

        let (result, dest) = sync_against(&server).await;
        assert!(matches!(result, Err(PipelineError::Sync(_))));
        assert!(fs::read_dir(dest.path()).unwrap().next().is_none());
    }

    #[tokio::test]
    async fn test_failed_download_names_the_file() {
        let server = MockServer::start().await;
        let index = json!([
            { "name": "vendas1.csv", "url": format!("{}/files/vendas1.csv", server.uri()) },
        ]);
        Mock::given(method("GET"))
            .and(path("/index.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&index))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/files/vendas1.csv"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let (result, _dest) = sync_against(&server).await;
        let err = result.unwrap_err();
        assert!(matches!(err, PipelineError::Sync(_)));
        assert!(err.to_string().contains("vendas1.csv"));
    }
}
