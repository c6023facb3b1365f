// API client module: a small blocking HTTP client that posts files to the
// conversion server's `/upload` endpoint and interprets its JSON reply.

use anyhow::{Context, Result};
use reqwest::blocking::{multipart, Client};
use reqwest::StatusCode;
use serde::Deserialize;
use std::fs::File;
use std::path::Path;
use tracing::{debug, info};

use crate::conversion::ConversionType;

/// Blocking client bound to one conversion server.
pub struct ApiClient {
    client: Client,
    base_url: String,
}

/// JSON body returned by `/upload`. Success replies carry `message` and
/// usually `path`; failures carry `error`.
#[derive(Deserialize, Debug)]
pub struct UploadResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
}

/// What the server made of an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// 2xx status.
    Converted {
        message: Option<String>,
        path: Option<String>,
    },
    /// Any other status, with the server's `error` text if it sent one.
    Rejected {
        status: StatusCode,
        error: Option<String>,
    },
}

impl UploadOutcome {
    /// Build the outcome from a status and the raw body. The body must be
    /// JSON whatever the status; anything else is an error.
    pub fn from_reply(status: StatusCode, body: &str) -> Result<Self> {
        let resp: UploadResponse =
            serde_json::from_str(body).context("Parsing upload response json")?;
        let outcome = if status.is_success() {
            UploadOutcome::Converted {
                message: resp.message,
                path: resp.path.filter(|p| !p.is_empty()),
            }
        } else {
            UploadOutcome::Rejected {
                status,
                error: resp.error.filter(|e| !e.is_empty()),
            }
        };
        Ok(outcome)
    }
}

impl ApiClient {
    /// Create a client for the server at `base_url` (no trailing slash).
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("docpdf/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(ApiClient {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Post `file_path` as the `file` field and the conversion tag as the
    /// `type` field. Transport and parse failures are returned as errors;
    /// a non-2xx status is a `Rejected` outcome.
    pub fn upload(&self, file_path: &Path, ty: &ConversionType) -> Result<UploadOutcome> {
        let url = format!("{}/upload", &self.base_url);

        let file = File::open(file_path)
            .with_context(|| format!("Failed to open {}", file_path.display()))?;
        let len = file
            .metadata()
            .with_context(|| format!("Failed to stat {}", file_path.display()))?
            .len();
        let file_name = file_path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("upload.bin")
            .to_string();
        let mime = mime_guess::from_path(file_path).first_or_octet_stream();

        let part = multipart::Part::reader_with_length(file, len)
            .file_name(file_name.clone())
            .mime_str(mime.essence_str())
            .context("Invalid mime type for upload")?;
        let form = multipart::Form::new()
            .part("file", part)
            .text("type", ty.tag().to_string());

        info!(%url, file = %file_name, size = len, conversion = ty.tag(), "uploading file");
        let res = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .context("Failed to send upload request")?;

        let status = res.status();
        let body = res.text().context("Failed to read upload response")?;
        debug!(%status, body = %body, "upload response");
        UploadOutcome::from_reply(status, &body)
    }
}
