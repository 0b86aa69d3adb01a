//! Configuration loading and management.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use mn_core::SourceName;
use mn_fetch::{FixtureSource, HttpSource, NoteSource};
use serde::{Deserialize, Serialize};

const MEETING_A_URL: &str =
    "https://6cxx9pggi4.execute-api.us-east1.amazonaws.com/prod/mock/meeting-a/list";
const MEETING_B_URL: &str =
    "https://6cxx9pggi4.execute-api.us-east1.amazonaws.com/prod/mock/meeting-b/list";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Per-request timeout for HTTP sources.
    pub request_timeout_secs: u64,
    /// Sources in display order.
    pub sources: Vec<SourceConfig>,
}

/// One note list source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SourceConfig {
    /// A live list endpoint.
    Http { name: String, url: String },
    /// A JSON file holding a list response, served after `delay_ms`.
    Fixture {
        name: String,
        path: PathBuf,
        #[serde(default)]
        delay_ms: u64,
    },
}

impl SourceConfig {
    pub fn name(&self) -> &str {
        match self {
            Self::Http { name, .. } | Self::Fixture { name, .. } => name,
        }
    }

    /// Where the source reads from, for display.
    pub fn location(&self) -> String {
        match self {
            Self::Http { url, .. } => url.clone(),
            Self::Fixture { path, .. } => path.display().to_string(),
        }
    }

    /// Instantiates the source.
    pub fn build(&self, timeout: Duration) -> anyhow::Result<Arc<dyn NoteSource>> {
        let name = SourceName::new(self.name()).context("invalid source name")?;
        let source: Arc<dyn NoteSource> = match self {
            Self::Http { url, .. } => Arc::new(
                HttpSource::new(name, url.clone(), timeout)
                    .with_context(|| format!("failed to set up source {}", self.name()))?,
            ),
            Self::Fixture { path, delay_ms, .. } => Arc::new(
                FixtureSource::from_file(name, path.clone())
                    .with_delay(Duration::from_millis(*delay_ms)),
            ),
        };
        Ok(source)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
            sources: vec![
                SourceConfig::Http {
                    name: "meeting-a".to_string(),
                    url: MEETING_A_URL.to_string(),
                },
                SourceConfig::Http {
                    name: "meeting-b".to_string(),
                    url: MEETING_B_URL.to_string(),
                },
            ],
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (MN_*)
        figment = figment.merge(Env::prefixed("MN_"));

        figment.extract()
    }

    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Instantiates every configured source, in order.
    pub fn build_sources(&self) -> anyhow::Result<Vec<Arc<dyn NoteSource>>> {
        self.sources
            .iter()
            .map(|source| source.build(self.request_timeout()))
            .collect()
    }
}

/// Returns the platform-specific config directory for mn.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("mn"))
}
