//! Note list sources.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use mn_core::{ListNotesResponse, SourceName};

use crate::SourceError;

/// A remote provider of one page of notes.
///
/// Implementations only transport and decode; validating the envelope's
/// `code` is left to [`crate::SourceFetcher`].
#[async_trait]
pub trait NoteSource: Send + Sync {
    fn name(&self) -> &SourceName;

    async fn fetch_page(&self) -> Result<ListNotesResponse, SourceError>;
}

fn decode(body: &str) -> Result<ListNotesResponse, SourceError> {
    serde_json::from_str(body).map_err(|err| SourceError::InvalidResponse(err.to_string()))
}

/// Fetches the first page of a list endpoint over HTTP.
#[derive(Debug, Clone)]
pub struct HttpSource {
    name: SourceName,
    url: String,
    http: reqwest::Client,
}

impl HttpSource {
    /// Creates a source that GETs `url`, giving up after `timeout`.
    pub fn new(
        name: SourceName,
        url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, SourceError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(SourceError::ClientBuild)?;
        Ok(Self {
            name,
            url: url.into(),
            http,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl NoteSource for HttpSource {
    fn name(&self) -> &SourceName {
        &self.name
    }

    async fn fetch_page(&self) -> Result<ListNotesResponse, SourceError> {
        let response = self.http.get(&self.url).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            tracing::debug!(source = %self.name, %status, %body, "list endpoint returned error status");
            return Err(SourceError::Status {
                status: status.as_u16(),
            });
        }
        decode(&body)
    }
}

#[derive(Debug, Clone)]
enum Fixture {
    Response(ListNotesResponse),
    File(PathBuf),
}

/// Serves a canned response, optionally after a delay.
///
/// Stands in for a real endpoint during demos and tests.
#[derive(Debug, Clone)]
pub struct FixtureSource {
    name: SourceName,
    fixture: Fixture,
    delay: Duration,
}

impl FixtureSource {
    pub const fn from_response(name: SourceName, response: ListNotesResponse) -> Self {
        Self {
            name,
            fixture: Fixture::Response(response),
            delay: Duration::ZERO,
        }
    }

    /// Reads and decodes `path` on every fetch.
    pub fn from_file(name: SourceName, path: impl Into<PathBuf>) -> Self {
        Self {
            name,
            fixture: Fixture::File(path.into()),
            delay: Duration::ZERO,
        }
    }

    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl NoteSource for FixtureSource {
    fn name(&self) -> &SourceName {
        &self.name
    }

    async fn fetch_page(&self) -> Result<ListNotesResponse, SourceError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match &self.fixture {
            Fixture::Response(response) => Ok(response.clone()),
            Fixture::File(path) => {
                let body = tokio::fs::read_to_string(path)
                    .await
                    .map_err(|source| SourceError::Fixture {
                        path: path.clone(),
                        source,
                    })?;
                decode(&body)
            }
        }
    }
}
