use crate::blob::BlobStore;
use crate::error::{BlobError, BlobResult};
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument, warn};
use vidnote_document::{LogicalPath, ResolvedUrl};

pub const DEFAULT_API_BASE: &str = "https://cloud-api.yandex.net/v1/disk";

#[derive(Debug, Deserialize)]
struct HrefResponse {
    href: Option<String>,
}

/// Blob store backed by a cloud-disk REST API.
///
/// Uploads are two-step: ask the API for an upload href, then PUT the bytes
/// there. Downloads likewise go through a short-lived href.
pub struct DiskApiBlobStore {
    client: Client,
    api_base: String,
    token: String,
}

impl DiskApiBlobStore {
    pub fn new(api_base: impl Into<String>, token: impl Into<String>) -> BlobResult<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(60))
            .build()?;
        Ok(Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    fn endpoint(&self, resource: &str) -> String {
        format!("{}/resources/{}", self.api_base, resource)
    }

    fn authorized(&self, req: RequestBuilder) -> RequestBuilder {
        req.header(AUTHORIZATION, format!("OAuth {}", self.token))
    }

    async fn href(resp: reqwest::Response) -> Option<String> {
        resp.json::<HrefResponse>()
            .await
            .ok()
            .and_then(|body| body.href)
            .filter(|href| !href.is_empty())
    }
}

#[async_trait]
impl BlobStore for DiskApiBlobStore {
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    async fn upload(&self, path: &LogicalPath, bytes: Vec<u8>) -> BlobResult<()> {
        let resp = self
            .authorized(self.client.get(self.endpoint("upload")))
            .query(&[("path", path.as_str()), ("overwrite", "false")])
            .send()
            .await?;

        match resp.status() {
            StatusCode::CONFLICT => return Err(BlobError::Conflict { path: path.clone() }),
            status if !status.is_success() => {
                return Err(BlobError::Failure(format!("upload url request failed: {}", status)))
            }
            _ => {}
        }

        let href = Self::href(resp)
            .await
            .ok_or_else(|| BlobError::Failure("no upload href".to_string()))?;

        let put = self.client.put(&href).body(bytes).send().await?;
        if !put.status().is_success() {
            return Err(BlobError::Failure(format!("upload failed: {}", put.status())));
        }

        debug!(path = %path, "uploaded");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn resolve_download_url(&self, path: &LogicalPath) -> BlobResult<ResolvedUrl> {
        let resp = self
            .authorized(self.client.get(self.endpoint("download")))
            .query(&[("path", path.as_str())])
            .send()
            .await
            .map_err(|e| BlobError::unavailable(path, e.to_string()))?;

        if !resp.status().is_success() {
            return Err(BlobError::unavailable(
                path,
                format!("download link request failed: {}", resp.status()),
            ));
        }

        Self::href(resp)
            .await
            .map(ResolvedUrl::new)
            .ok_or_else(|| BlobError::unavailable(path, "no download href"))
    }

    #[instrument(skip(self))]
    async fn publish(&self, path: &LogicalPath) -> BlobResult<()> {
        let resp = self
            .authorized(self.client.put(self.endpoint("publish")))
            .query(&[("path", path.as_str())])
            .send()
            .await?;

        if !resp.status().is_success() {
            warn!(path = %path, status = %resp.status(), "publish failed");
            return Err(BlobError::Failure(format!("publish failed: {}", resp.status())));
        }
        Ok(())
    }
}
