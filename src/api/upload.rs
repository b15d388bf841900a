// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Document upload client
//!
//! Documents go to `/api/upload` as multipart form data. Spreadsheets are
//! too large for that path and are written straight to object storage
//! through a presigned URL, then confirmed with the backend.

use futures::StreamExt;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Method, Response};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tokio_util::io::ReaderStream;
use tokio_util::sync::CancellationToken;

use crate::api::client::{error_message, ApiClient};
use crate::config::UploadConfig;
use crate::error::{ChatError, Result, UploadError};
use crate::utils::lock;

const SPREADSHEET_XLSX: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
const SPREADSHEET_XLS: &str = "application/vnd.ms-excel";

/// Log transfer progress every this many bytes
const PROGRESS_LOG_INTERVAL: u64 = 10 * 1024 * 1024;

/// File types accepted by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
    Doc,
    Txt,
    Md,
    Xlsx,
    Xls,
}

impl DocumentKind {
    /// Kind for a file name, by extension (case-insensitive)
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            "doc" => Some(Self::Doc),
            "txt" => Some(Self::Txt),
            "md" => Some(Self::Md),
            "xlsx" => Some(Self::Xlsx),
            "xls" => Some(Self::Xls),
            _ => None,
        }
    }

    /// Whether this kind takes the presigned upload path
    pub fn is_spreadsheet(&self) -> bool {
        matches!(self, Self::Xlsx | Self::Xls)
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Docx => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
            Self::Doc => "application/msword",
            Self::Txt => "text/plain",
            Self::Md => "text/markdown",
            Self::Xlsx => SPREADSHEET_XLSX,
            Self::Xls => SPREADSHEET_XLS,
        }
    }
}

/// Backend record of an uploaded document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedDocument {
    pub document_id: String,
    pub filename: String,
    pub file_type: String,
    pub file_size: u64,
    /// Preview of the extracted text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Object storage key, for spreadsheets
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s3_key: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PresignRequest<'a> {
    session_id: &'a str,
    filename: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PresignedUpload {
    upload_url: String,
    file_key: String,
    #[serde(default)]
    bucket_name: String,
    #[serde(default)]
    expires_in: u64,
    document_id: String,
}

/// Bytes of the current file handed to the HTTP body so far
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadProgress {
    pub sent: u64,
    pub total: u64,
}

impl UploadProgress {
    pub fn is_complete(&self) -> bool {
        self.sent >= self.total
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConfirmRequest {
    file_size: u64,
}

/// Uploads documents for a session and tracks the ones ready to attach
#[derive(Debug)]
pub struct DocumentUploader {
    api: ApiClient,
    limits: UploadConfig,
    uploaded: Mutex<Vec<UploadedDocument>>,
    progress: Arc<watch::Sender<UploadProgress>>,
}

impl DocumentUploader {
    pub fn new(api: ApiClient, limits: UploadConfig) -> Self {
        Self {
            api,
            limits,
            uploaded: Mutex::new(Vec::new()),
            progress: Arc::new(watch::channel(UploadProgress::default()).0),
        }
    }

    /// Watch the progress of the file being uploaded
    pub fn subscribe_progress(&self) -> watch::Receiver<UploadProgress> {
        self.progress.subscribe()
    }

    /// Validate a file against the session and upload limits.
    ///
    /// Runs before any network I/O.
    pub fn validate(&self, session_id: &str, path: &Path, size: u64) -> Result<DocumentKind> {
        if session_id.trim().is_empty() {
            return Err(UploadError::NoSession.into());
        }
        let kind = DocumentKind::from_path(path).ok_or_else(|| {
            UploadError::UnsupportedType(
                path.extension()
                    .map(|e| e.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "unknown".to_string()),
            )
        })?;
        let limit = if kind.is_spreadsheet() {
            self.limits.max_spreadsheet_size
        } else {
            self.limits.max_file_size
        };
        if size > limit {
            return Err(UploadError::SizeExceeded { size, limit }.into());
        }
        Ok(kind)
    }

    /// Upload a local file. Cancelling the token aborts the transfer.
    pub async fn upload(
        &self,
        session_id: &str,
        path: &Path,
        cancel: &CancellationToken,
    ) -> Result<UploadedDocument> {
        let size = tokio::fs::metadata(path).await?.len();
        let kind = self.validate(session_id, path, size)?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());

        tracing::info!(
            target: "agentchat.upload",
            "Uploading {} ({} bytes) to session {}",
            filename,
            size,
            session_id
        );

        self.progress
            .send_replace(UploadProgress { sent: 0, total: size });

        let transfer = async {
            let document = if kind.is_spreadsheet() {
                self.upload_presigned(session_id, path, &filename, kind, size)
                    .await?
            } else {
                self.upload_direct(session_id, path, &filename, kind, size)
                    .await?
            };
            Ok::<_, ChatError>(document)
        };

        let document = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::info!(target: "agentchat.upload", "Upload of {} cancelled", filename);
                return Err(UploadError::Cancelled.into());
            }
            result = transfer => result?,
        };

        tracing::debug!(
            target: "agentchat.upload",
            "Uploaded {} as document {}",
            document.filename,
            document.document_id
        );
        lock(&self.uploaded).push(document.clone());
        Ok(document)
    }

    /// Documents uploaded and not yet removed
    pub fn documents(&self) -> Vec<UploadedDocument> {
        lock(&self.uploaded).clone()
    }

    /// Ids to attach to the next chat request
    pub fn document_ids(&self) -> Vec<String> {
        lock(&self.uploaded)
            .iter()
            .map(|d| d.document_id.clone())
            .collect()
    }

    pub fn remove(&self, document_id: &str) {
        lock(&self.uploaded).retain(|d| d.document_id != document_id);
    }

    pub fn clear(&self) {
        lock(&self.uploaded).clear();
    }

    async fn upload_direct(
        &self,
        session_id: &str,
        path: &Path,
        filename: &str,
        kind: DocumentKind,
        size: u64,
    ) -> Result<UploadedDocument> {
        let body = self.file_body(path).await?;
        let part = Part::stream_with_length(body, size)
            .file_name(filename.to_string())
            .mime_str(kind.content_type())
            .map_err(upload_network_error)?;
        let form = Form::new()
            .text("sessionId", session_id.to_string())
            .part("file", part);

        let response = self
            .api
            .streaming(Method::POST, "/upload")
            .multipart(form)
            .send()
            .await
            .map_err(upload_network_error)?;

        decode(accepted(response).await?).await
    }

    async fn upload_presigned(
        &self,
        session_id: &str,
        path: &Path,
        filename: &str,
        kind: DocumentKind,
        file_size: u64,
    ) -> Result<UploadedDocument> {
        let response = self
            .api
            .request(Method::POST, "/excel/presigned-url")
            .json(&PresignRequest {
                session_id,
                filename,
            })
            .send()
            .await
            .map_err(upload_network_error)?;
        let presigned: PresignedUpload = decode(accepted(response).await?).await?;
        tracing::debug!(
            target: "agentchat.upload",
            "Presigned upload for {} to {}/{} (expires in {}s)",
            filename,
            presigned.bucket_name,
            presigned.file_key,
            presigned.expires_in
        );

        let response = self
            .api
            .http()
            .put(&presigned.upload_url)
            .header(CONTENT_TYPE, kind.content_type())
            .header(CONTENT_LENGTH, file_size)
            .body(self.file_body(path).await?)
            .send()
            .await
            .map_err(upload_network_error)?;
        accepted(response).await?;

        let response = self
            .api
            .request(
                Method::POST,
                &format!("/excel/{}/confirm", presigned.document_id),
            )
            .json(&ConfirmRequest { file_size })
            .send()
            .await
            .map_err(upload_network_error)?;
        decode(accepted(response).await?).await
    }

    /// Stream a file into a request body, publishing bytes sent.
    async fn file_body(&self, path: &Path) -> Result<Body> {
        let file = tokio::fs::File::open(path).await?;
        let progress = Arc::clone(&self.progress);
        let chunks = ReaderStream::new(file).inspect(move |chunk| {
            let Ok(chunk) = chunk else { return };
            let len = chunk.len() as u64;
            progress.send_modify(|p| {
                p.sent += len;
                if p.sent % PROGRESS_LOG_INTERVAL < len {
                    tracing::debug!(
                        target: "agentchat.upload",
                        "Upload progress: {}/{} bytes",
                        p.sent,
                        p.total
                    );
                }
            });
        });
        Ok(Body::wrap_stream(chunks))
    }
}

fn upload_network_error(err: reqwest::Error) -> ChatError {
    UploadError::Network(err.to_string()).into()
}

async fn accepted(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body);
    Err(UploadError::Rejected {
        status: status.as_u16(),
        message: if message.is_empty() {
            "Upload failed".to_string()
        } else {
            message
        },
    }
    .into())
}

async fn decode<T: serde::de::DeserializeOwned>(response: Response) -> Result<T> {
    let body = response.text().await.map_err(upload_network_error)?;
    Ok(serde_json::from_str(&body)?)
}
