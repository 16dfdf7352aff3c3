//! Label rendering: one HTTP call to the rendering service per label.
//!
//! The service takes the raw ZPL as the request body and answers with a PDF.
//! It only accepts the payload when it is declared as
//! `application/x-www-form-urlencoded`, even though the body is not
//! form-encoded; the header must stay as it is.

use crate::config::ConversionConfig;
use crate::error::LabelError;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use std::time::Duration;
use tracing::debug;

/// Anything that can turn one label's ZPL into document bytes.
///
/// The batch converter only sees this trait, which lets tests swap the
/// network for an in-process stub.
#[async_trait]
pub trait LabelRenderer: Send + Sync {
    async fn render(&self, zpl: &str) -> Result<Vec<u8>, LabelError>;
}

/// [`LabelRenderer`] backed by the Labelary HTTP API.
#[derive(Debug, Clone)]
pub struct LabelaryRenderer {
    client: reqwest::Client,
    url: String,
    timeout_secs: Option<u64>,
}

impl LabelaryRenderer {
    pub fn new(url: impl Into<String>, timeout_secs: Option<u64>) -> Result<Self, LabelError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().map_err(|e| LabelError::Transport {
            detail: e.to_string(),
        })?;

        Ok(Self {
            client,
            url: url.into(),
            timeout_secs,
        })
    }

    /// Build a renderer from the job configuration.
    pub fn from_config(config: &ConversionConfig) -> Result<Self, LabelError> {
        Self::new(config.renderer_url.clone(), config.request_timeout_secs)
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl LabelRenderer for LabelaryRenderer {
    async fn render(&self, zpl: &str) -> Result<Vec<u8>, LabelError> {
        let response = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header(ACCEPT, "application/pdf")
            .body(zpl.to_owned())
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("HTTP {} ({})", status, e));
            return Err(LabelError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await.map_err(|e| self.transport_error(e))?;
        debug!("Rendered label → {} bytes", bytes.len());
        Ok(bytes.to_vec())
    }
}

impl LabelaryRenderer {
    fn transport_error(&self, e: reqwest::Error) -> LabelError {
        match self.timeout_secs {
            Some(secs) if e.is_timeout() => LabelError::Timeout { secs },
            _ => LabelError::Transport {
                detail: e.to_string(),
            },
        }
    }
}
