// SPDX-FileCopyrightText: 2026 Wabridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP implementation of [`MediaRelay`].
//!
//! Three stages, each with its own deadline:
//! 1. resolve: `GET {api_base_url}/{media_id}` -> `{url, mime_type}`
//! 2. download: `GET {url}`, up to the response headers
//! 3. upload: the download body streamed as a multipart `file` part to
//!    `store_url`, up to the store's JSON answer `{filePath}`

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::HeaderName;
use reqwest::multipart::{Form, Part};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, info, warn};

use wabridge_config::model::{MediaConfig, WhatsAppConfig};
use wabridge_core::recording;
use wabridge_core::{BridgeError, MediaRelay, RelayedMedia, with_timeout};

use crate::extension::extension_for;

#[derive(Debug, Deserialize)]
struct MediaInfo {
    url: Option<String>,
    #[serde(alias = "mimeType")]
    mime_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    #[serde(rename = "filePath", alias = "file_path", alias = "url")]
    file_path: Option<String>,
}

/// Streams consumer-platform media into an object store.
pub struct HttpMediaRelay {
    client: reqwest::Client,
    api_base_url: String,
    store_url: String,
    api_key: SecretString,
    tenant_header: HeaderName,
    resolve_timeout: Duration,
    download_timeout: Duration,
    upload_timeout: Duration,
}

impl HttpMediaRelay {
    /// Builds a relay from configuration.
    ///
    /// Fails with [`BridgeError::Config`] when no store is configured.
    pub fn new(media: &MediaConfig, whatsapp: &WhatsAppConfig) -> Result<Self, BridgeError> {
        let store_url = media
            .store_url
            .clone()
            .ok_or_else(|| BridgeError::Config("media.store_url is not set".into()))?;
        let api_key = media
            .api_key
            .clone()
            .map(SecretString::from)
            .ok_or_else(|| BridgeError::Config("media.api_key is not set".into()))?;
        let tenant_header = HeaderName::from_bytes(media.tenant_header.as_bytes())
            .map_err(|e| BridgeError::Config(format!("invalid media.tenant_header: {e}")))?;

        let client = reqwest::Client::builder()
            .connect_timeout(media.resolve_timeout())
            .build()
            .map_err(|e| BridgeError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_base_url: whatsapp.api_base_url.trim_end_matches('/').to_string(),
            store_url,
            api_key,
            tenant_header,
            resolve_timeout: media.resolve_timeout(),
            download_timeout: media.download_timeout(),
            upload_timeout: media.upload_timeout(),
        })
    }

    async fn resolve(
        &self,
        media_id: &str,
        token: &SecretString,
    ) -> Result<(String, String), BridgeError> {
        let resolution_error = |message: String, source: Option<reqwest::Error>| {
            BridgeError::MediaResolution {
                media_id: media_id.to_string(),
                message,
                source: source.map(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>),
            }
        };

        let url = format!("{}/{}", self.api_base_url, media_id);
        with_timeout("media_resolve", self.resolve_timeout, async {
            let response = self
                .client
                .get(&url)
                .bearer_auth(token.expose_secret())
                .send()
                .await
                .map_err(|e| resolution_error(format!("media-info request failed: {e}"), Some(e)))?;

            let status = response.status();
            if !status.is_success() {
                return Err(resolution_error(
                    format!("media-info endpoint returned {status}"),
                    None,
                ));
            }

            let info: MediaInfo = response
                .json()
                .await
                .map_err(|e| resolution_error(format!("invalid media-info body: {e}"), Some(e)))?;
            match (info.url, info.mime_type) {
                (Some(url), Some(mime_type)) if !url.is_empty() && !mime_type.is_empty() => {
                    Ok((url, mime_type))
                }
                _ => Err(resolution_error(
                    "media-info response lacks url or mime_type".into(),
                    None,
                )),
            }
        })
        .await
    }

    async fn download(
        &self,
        download_url: &str,
        token: &SecretString,
    ) -> Result<reqwest::Response, BridgeError> {
        with_timeout("media_download", self.download_timeout, async {
            let response = self
                .client
                .get(download_url)
                .bearer_auth(token.expose_secret())
                .send()
                .await
                .map_err(|e| BridgeError::MediaUpload {
                    message: format!("download failed: {e}"),
                    source: Some(Box::new(e)),
                })?;
            let status = response.status();
            if !status.is_success() {
                return Err(BridgeError::MediaUpload {
                    message: format!("download returned {status}"),
                    source: None,
                });
            }
            Ok(response)
        })
        .await
    }

    async fn upload(
        &self,
        download: reqwest::Response,
        mime_type: &str,
        namespace: &str,
    ) -> Result<String, BridgeError> {
        let file_name = format!("{}.{}", uuid::Uuid::new_v4(), extension_for(mime_type));
        let length = download.content_length();
        let body = reqwest::Body::wrap_stream(download.bytes_stream());
        let part = match length {
            Some(length) => Part::stream_with_length(body, length),
            None => Part::stream(body),
        }
        .file_name(file_name.clone())
        .mime_str(mime_type)
        .map_err(|e| BridgeError::MediaUpload {
            message: format!("unusable mime type `{mime_type}`: {e}"),
            source: Some(Box::new(e)),
        })?;
        let form = Form::new().part("file", part);

        with_timeout("media_upload", self.upload_timeout, async {
            let response = self
                .client
                .post(&self.store_url)
                .bearer_auth(self.api_key.expose_secret())
                .header(self.tenant_header.clone(), namespace)
                .multipart(form)
                .send()
                .await
                .map_err(|e| BridgeError::MediaUpload {
                    message: format!("upload failed: {e}"),
                    source: Some(Box::new(e)),
                })?;

            let status = response.status();
            if !status.is_success() {
                return Err(BridgeError::MediaUpload {
                    message: format!("object store returned {status}"),
                    source: None,
                });
            }

            let uploaded: UploadResponse =
                response.json().await.map_err(|e| BridgeError::MediaUpload {
                    message: format!("invalid object store response: {e}"),
                    source: Some(Box::new(e)),
                })?;
            uploaded
                .file_path
                .filter(|path| !path.is_empty())
                .ok_or_else(|| BridgeError::MediaUpload {
                    message: "object store response lacks filePath".into(),
                    source: None,
                })
        })
        .await
        .inspect(|_| debug!(%file_name, namespace, "media uploaded"))
    }

    async fn run(
        &self,
        media_id: &str,
        token: &SecretString,
        namespace: &str,
    ) -> Result<RelayedMedia, BridgeError> {
        let (download_url, mime_type) = self.resolve(media_id, token).await?;
        let download = self.download(&download_url, token).await?;
        let uri = self.upload(download, &mime_type, namespace).await?;
        Ok(RelayedMedia { uri, mime_type })
    }
}

#[async_trait]
impl MediaRelay for HttpMediaRelay {
    async fn relay(
        &self,
        media_id: &str,
        source_token: &SecretString,
        namespace: &str,
    ) -> Result<RelayedMedia, BridgeError> {
        let result = self.run(media_id, source_token, namespace).await;
        recording::record_media_relay(recording::result_label(&result));
        match &result {
            Ok(relayed) => info!(media_id, namespace, mime = %relayed.mime_type, "media relayed"),
            Err(e) => warn!(media_id, namespace, error = %e, "media relay failed"),
        }
        result
    }
}
