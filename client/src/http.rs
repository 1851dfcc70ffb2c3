//! HTTP implementation of the study backend
//!
//! ```text
//! GET  {base}/projections                  -> {"dataset": ["projection", ...]}
//! GET  {base}/data/{dataset}/{projection}  -> {"X": [[x, y], ...], "y": [label, ...], ...}
//! POST {base}/submit                       <- {"results": [...], "timestamp": ..., "participantCode": ...}
//! ```
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use async_trait::async_trait;
use log::{debug, info};
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;

use study_core::{Catalog, StudyBackend, Submission, TrialData};

use crate::config::ClientConfig;
use crate::error::ClientError;

/// `reqwest`-backed collaborator
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base: Url,
}

impl HttpBackend {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        config.validate()?;
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|source| ClientError::Transport {
                url: config.base_url.clone(),
                source,
            })?;
        Ok(Self {
            client,
            base: config.base_url()?,
        })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Endpoint URL below the base, each segment percent-encoded
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ClientError> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                url: url.to_string(),
                source,
            })?;
        let body = Self::success_body(&url, response).await?;
        serde_json::from_slice(&body).map_err(|source| ClientError::Decode {
            url: url.to_string(),
            source,
        })
    }

    async fn success_body(url: &Url, response: Response) -> Result<Vec<u8>, ClientError> {
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let bytes = response.bytes().await.map_err(|source| ClientError::Transport {
            url: url.to_string(),
            source,
        })?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl StudyBackend for HttpBackend {
    type Error = ClientError;

    async fn catalog(&self) -> Result<Catalog, ClientError> {
        self.get_json(self.endpoint(&["projections"])).await
    }

    async fn trial_data(&self, dataset: &str, projection: &str) -> Result<TrialData, ClientError> {
        self.get_json(self.endpoint(&["data", dataset, projection])).await
    }

    async fn submit(&self, submission: &Submission) -> Result<(), ClientError> {
        let url = self.endpoint(&["submit"]);
        info!("POST {} with {} records", url, submission.results.len());
        let response = self
            .client
            .post(url.clone())
            .json(submission)
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                url: url.to_string(),
                source,
            })?;
        Self::success_body(&url, response).await?;
        Ok(())
    }
}
