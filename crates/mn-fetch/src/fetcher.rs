//! Single-source fetch with failure folding.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use mn_core::{Note, NoteList, SourceName};
use tokio::task::AbortHandle;

use crate::{NoteSource, SourceError};

/// Result of fetching one source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Loaded(Vec<Note>),
    /// Any failure; the cause has already been logged.
    Failed,
}

impl FetchOutcome {
    /// Notes this outcome contributes. Failures contribute none.
    pub fn notes(&self) -> &[Note] {
        match self {
            Self::Loaded(notes) => notes,
            Self::Failed => &[],
        }
    }

    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed)
    }
}

/// Fetches one source and reports whether a fetch is in flight.
#[derive(Clone)]
pub struct SourceFetcher {
    source: Arc<dyn NoteSource>,
    in_flight: Arc<AtomicBool>,
}

impl std::fmt::Debug for SourceFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceFetcher")
            .field("source", self.source.name())
            .field("in_flight", &self.is_loading())
            .finish()
    }
}

/// Clears the in-flight flag however the fetch future ends.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn enter(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::Release);
        Self(flag)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Aborts the spawned source fetch if the awaiting future is dropped first.
struct AbortOnDrop(AbortHandle);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

impl SourceFetcher {
    pub fn new(source: Arc<dyn NoteSource>) -> Self {
        Self {
            source,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn name(&self) -> &SourceName {
        self.source.name()
    }

    /// True from the start of [`Self::fetch`] until it produces an outcome.
    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Fetches the source once.
    ///
    /// Transport errors, undecodable bodies, non-zero codes and even a
    /// panicking source all come back as [`FetchOutcome::Failed`].
    pub async fn fetch(&self) -> FetchOutcome {
        let _in_flight = InFlight::enter(&self.in_flight);
        match self.fetch_list().await {
            Ok(list) => {
                tracing::debug!(
                    source = %self.name(),
                    notes = list.list.len(),
                    page = ?list.page,
                    "source loaded"
                );
                FetchOutcome::Loaded(list.list)
            }
            Err(err) => {
                tracing::warn!(source = %self.name(), error = %err, "source fetch failed");
                FetchOutcome::Failed
            }
        }
    }

    async fn fetch_list(&self) -> Result<NoteList, SourceError> {
        let source = Arc::clone(&self.source);
        // Run on its own task so a panic inside the source is caught as a JoinError.
        let task = tokio::spawn(async move { source.fetch_page().await });
        let _abort = AbortOnDrop(task.abort_handle());
        let response = task.await??;
        tracing::debug!(
            source = %self.name(),
            code = response.code,
            msg = %response.msg,
            "source responded"
        );
        Ok(response.into_data()?)
    }
}
