//! Concurrent fetching of note lists from independent sources.
//!
//! Provides:
//! - [`NoteSource`]: the injected "fetch one page from a named source" capability
//! - [`HttpSource`] and [`FixtureSource`] implementations
//! - [`SourceFetcher`]: one fetch, failures folded into [`FetchOutcome::Failed`]
//! - [`Aggregator`]: runs every source at once and publishes merged snapshots

mod aggregator;
pub mod demo;
mod fetcher;
mod source;

use std::path::PathBuf;

use mn_core::ResponseError;
use thiserror::Error;

pub use aggregator::{Aggregator, Snapshot, SourceState, SourceStatus};
pub use fetcher::{FetchOutcome, SourceFetcher};
pub use source::{FixtureSource, HttpSource, NoteSource};

/// Source fetch errors.
///
/// These never escape a [`SourceFetcher`]; they are logged and the source
/// contributes no notes.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Failed to build HTTP client.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    /// HTTP request failed.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// Server answered with a non-success HTTP status.
    #[error("HTTP status {status}")]
    Status { status: u16 },
    /// Envelope decoded but reported failure.
    #[error(transparent)]
    Response(#[from] ResponseError),
    /// Failed to parse response.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    /// Fixture file could not be read.
    #[error("failed to read fixture {}: {source}", path.display())]
    Fixture {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The fetch task panicked or was cancelled.
    #[error("fetch task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
