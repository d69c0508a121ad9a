//! Release publication to GitHub.
//!
//! Attaches the generated installer to the release record for the
//! triggering tag, creating the record if it does not exist yet.
//! Publication is attempted exactly once per run: a missing installer file
//! or an already-published asset of the same name fails fatally rather
//! than leaving a partial or duplicated release.

use crate::error::StageError;
use crate::pipeline::PipelineContext;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::path::PathBuf;

/// A published release record for one tag.
#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseRecord {
    /// GitHub release id
    pub id: u64,

    /// Tag the release is keyed by
    pub tag_name: String,

    /// Asset upload URL template
    pub upload_url: String,

    /// Browser URL of the release page
    pub html_url: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Assets already attached to this release
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

/// A downloadable asset attached to a release.
#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseAsset {
    /// Asset filename
    pub name: String,

    /// Size in bytes
    pub size: u64,

    /// Direct download URL
    pub browser_download_url: String,
}

/// Narrow interface over the release hosting service.
///
/// The real implementation talks to the GitHub API; tests drive the
/// pipeline with an in-memory fake.
#[allow(async_fn_in_trait)]
pub trait ReleasePublisher {
    /// Look up the release keyed by `tag`, if one exists.
    async fn find_release(&self, tag: &str) -> Result<Option<ReleaseRecord>, StageError>;

    /// Create a release record for `tag`.
    async fn create_release(&self, tag: &str) -> Result<ReleaseRecord, StageError>;

    /// Attach `content` to `release` as a downloadable asset named `name`.
    async fn upload_asset(
        &self,
        release: &ReleaseRecord,
        name: &str,
        content: Bytes,
    ) -> Result<ReleaseAsset, StageError>;
}

/// Publication stage.
///
/// The installer must already exist at the exact version-interpolated path;
/// nothing is looked up loosely and no "close enough" file is ever
/// attached.
pub async fn run<P: ReleasePublisher>(
    ctx: &PipelineContext,
    publisher: &P,
) -> Result<ReleaseAsset, StageError> {
    let installer_path = ctx
        .installer_path()
        .map(|p| p.to_path_buf())
        .ok_or_else(|| StageError::MissingInput {
            path: PathBuf::from("<installer>"),
        })?;
    if !installer_path.is_file() {
        return Err(StageError::MissingInput {
            path: installer_path,
        });
    }

    let asset_name = ctx
        .installer_file_name()
        .ok_or_else(|| StageError::MissingInput {
            path: PathBuf::from("<derived version>"),
        })?;

    let tag = ctx.tag();
    let release = match publisher.find_release(tag).await? {
        Some(release) => {
            log::info!("Found existing release for {}", tag);
            release
        }
        None => {
            log::info!("Creating release for {}", tag);
            publisher.create_release(tag).await?
        }
    };

    // At most one asset per tag; never silently replace a published file
    if release.assets.iter().any(|a| a.name == asset_name) {
        return Err(StageError::AssetConflict {
            tag: tag.to_string(),
            asset: asset_name,
        });
    }

    let content = Bytes::from(tokio::fs::read(&installer_path).await?);
    let asset = publisher.upload_asset(&release, &asset_name, content).await?;

    log::info!(
        "Published {} ({} bytes) to {}",
        asset.name,
        asset.size,
        release.html_url
    );

    Ok(asset)
}

/// Release publisher backed by the GitHub REST API.
pub struct GitHubPublisher {
    client: reqwest::Client,
    base_url: String,
    owner: String,
    repo: String,
    token: String,
}

impl GitHubPublisher {
    /// Create a publisher for `owner/repo`.
    ///
    /// The token is injected per run and never persisted.
    pub fn new(owner: &str, repo: &str, token: &str) -> Self {
        Self::with_base_url("https://api.github.com", owner, repo, token)
    }

    /// Create a publisher against a custom API endpoint (used by tests).
    pub fn with_base_url(base_url: &str, owner: &str, repo: &str, token: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            owner: owner.to_string(),
            repo: repo.to_string(),
            token: token.to_string(),
        }
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .bearer_auth(&self.token)
            .header(reqwest::header::USER_AGENT, "sim-cpdlc-release")
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
    }
}

impl ReleasePublisher for GitHubPublisher {
    async fn find_release(&self, tag: &str) -> Result<Option<ReleaseRecord>, StageError> {
        let url = format!(
            "{}/repos/{}/{}/releases/tags/{}",
            self.base_url, self.owner, self.repo, tag
        );
        let response = self.request(reqwest::Method::GET, &url).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(StageError::Api(format!(
                "GET {} returned {}",
                url,
                response.status()
            )));
        }

        Ok(Some(response.json::<ReleaseRecord>().await?))
    }

    async fn create_release(&self, tag: &str) -> Result<ReleaseRecord, StageError> {
        let url = format!(
            "{}/repos/{}/{}/releases",
            self.base_url, self.owner, self.repo
        );
        let body = serde_json::json!({
            "tag_name": tag,
            "name": tag,
            "draft": false,
            "prerelease": false,
        });

        let response = self
            .request(reqwest::Method::POST, &url)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StageError::Api(format!(
                "POST {} returned {}",
                url,
                response.status()
            )));
        }

        Ok(response.json::<ReleaseRecord>().await?)
    }

    async fn upload_asset(
        &self,
        release: &ReleaseRecord,
        name: &str,
        content: Bytes,
    ) -> Result<ReleaseAsset, StageError> {
        // The upload_url is an RFC 6570 template ending in "{?name,label}"
        let upload_url = release
            .upload_url
            .split('{')
            .next()
            .unwrap_or(&release.upload_url);
        let url = format!("{}?name={}", upload_url, name);

        let response = self
            .request(reqwest::Method::POST, &url)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(content)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StageError::Api(format!(
                "asset upload to {} returned {}",
                url,
                response.status()
            )));
        }

        Ok(response.json::<ReleaseAsset>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_record_deserializes_github_payload() {
        let payload = serde_json::json!({
            "id": 42,
            "tag_name": "v1.0.0",
            "upload_url": "https://uploads.github.com/repos/robin24/sim-cpdlc/releases/42/assets{?name,label}",
            "html_url": "https://github.com/robin24/sim-cpdlc/releases/tag/v1.0.0",
            "created_at": "2024-05-01T12:00:00Z",
            "assets": [
                {
                    "name": "Sim-CPDLC-1.0.0.exe",
                    "size": 1024,
                    "browser_download_url": "https://github.com/robin24/sim-cpdlc/releases/download/v1.0.0/Sim-CPDLC-1.0.0.exe"
                }
            ]
        });

        let record: ReleaseRecord = serde_json::from_value(payload).unwrap();
        assert_eq!(record.tag_name, "v1.0.0");
        assert_eq!(record.assets.len(), 1);
        assert_eq!(record.assets[0].name, "Sim-CPDLC-1.0.0.exe");
    }
}
