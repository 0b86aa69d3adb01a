//! Running several sources at once and merging their results.
//!
//! Each run is tagged with a generation. Fetch completions from an older
//! generation are dropped on arrival, so a slow fetch from a superseded run can
//! never overwrite fresher state even though its task keeps running.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use mn_core::{Note, SourceName};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::{FetchOutcome, NoteSource, SourceFetcher};

/// Per-source progress within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceState {
    Loading,
    /// Settled successfully with this many notes.
    Loaded(usize),
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceStatus {
    pub name: SourceName,
    pub state: SourceState,
}

/// Merged view of a run, published after every change.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Snapshot {
    pub generation: u64,
    /// True until every source in this generation has settled.
    pub loading: bool,
    /// Settled sources' notes, in registration order.
    pub notes: Vec<Note>,
    pub sources: Vec<SourceStatus>,
}

struct Run {
    generation: u64,
    names: Vec<SourceName>,
    outcomes: Vec<Option<FetchOutcome>>,
}

impl Run {
    fn new(generation: u64, names: Vec<SourceName>) -> Self {
        let outcomes = vec![None; names.len()];
        Self {
            generation,
            names,
            outcomes,
        }
    }

    fn snapshot(&self) -> Snapshot {
        let notes = self
            .outcomes
            .iter()
            .flatten()
            .flat_map(|outcome| outcome.notes().iter().cloned())
            .collect();
        let sources = self
            .names
            .iter()
            .zip(&self.outcomes)
            .map(|(name, outcome)| SourceStatus {
                name: name.clone(),
                state: match outcome {
                    None => SourceState::Loading,
                    Some(FetchOutcome::Loaded(notes)) => SourceState::Loaded(notes.len()),
                    Some(FetchOutcome::Failed) => SourceState::Failed,
                },
            })
            .collect();
        Snapshot {
            generation: self.generation,
            loading: self.outcomes.iter().any(Option::is_none),
            notes,
            sources,
        }
    }
}

struct Shared {
    run: Mutex<Run>,
    tx: watch::Sender<Snapshot>,
}

impl Shared {
    fn lock_run(&self) -> MutexGuard<'_, Run> {
        self.run.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records one source's outcome unless its run has been superseded.
    fn settle(&self, generation: u64, index: usize, outcome: FetchOutcome) {
        let mut run = self.lock_run();
        if run.generation != generation {
            tracing::debug!(
                generation,
                current = run.generation,
                "discarding result from superseded run"
            );
            return;
        }
        let Some(slot) = run.outcomes.get_mut(index) else {
            return;
        };
        *slot = Some(outcome);

        let snapshot = run.snapshot();
        if !snapshot.loading {
            tracing::info!(
                generation,
                notes = snapshot.notes.len(),
                "all sources settled"
            );
        }
        // Published under the run lock so receivers never see snapshots out of order.
        self.tx.send_replace(snapshot);
    }
}

/// Fetches a fixed set of sources concurrently and merges their notes.
///
/// Must be used from within a Tokio runtime. Dropping the aggregator aborts
/// any fetches still running.
pub struct Aggregator {
    shared: Arc<Shared>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl std::fmt::Debug for Aggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Aggregator")
            .field("snapshot", &*self.shared.tx.borrow())
            .finish_non_exhaustive()
    }
}

impl Aggregator {
    /// Starts fetching every source. Registration order is display order.
    pub fn start(sources: Vec<Arc<dyn NoteSource>>) -> Self {
        let (tx, _rx) = watch::channel(Snapshot::default());
        let aggregator = Self {
            shared: Arc::new(Shared {
                run: Mutex::new(Run::new(0, Vec::new())),
                tx,
            }),
            tasks: Mutex::new(Vec::new()),
        };
        aggregator.restart(sources);
        aggregator
    }

    /// Begins a new run over `sources` and returns its generation.
    ///
    /// Results still in flight from earlier runs are ignored when they land.
    pub fn restart(&self, sources: Vec<Arc<dyn NoteSource>>) -> u64 {
        let fetchers: Vec<SourceFetcher> = sources.into_iter().map(SourceFetcher::new).collect();
        let names = fetchers.iter().map(|f| f.name().clone()).collect();

        let generation = {
            let mut run = self.shared.lock_run();
            let generation = run.generation + 1;
            *run = Run::new(generation, names);
            self.shared.tx.send_replace(run.snapshot());
            generation
        };
        tracing::info!(generation, sources = fetchers.len(), "starting fetch run");

        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        tasks.retain(|task| !task.is_finished());
        for (index, fetcher) in fetchers.into_iter().enumerate() {
            let shared = Arc::clone(&self.shared);
            tasks.push(tokio::spawn(async move {
                let outcome = fetcher.fetch().await;
                shared.settle(generation, index, outcome);
            }));
        }
        generation
    }

    /// Generation of the current run.
    pub fn generation(&self) -> u64 {
        self.shared.lock_run().generation
    }

    /// The latest published snapshot.
    pub fn snapshot(&self) -> Snapshot {
        self.shared.tx.borrow().clone()
    }

    /// Receives every snapshot published from now on.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.shared.tx.subscribe()
    }

    /// Waits until the current run has no sources left loading.
    pub async fn settled(&self) -> Snapshot {
        let mut rx = self.subscribe();
        let generation = self.generation();
        match rx
            .wait_for(|snapshot| snapshot.generation >= generation && !snapshot.loading)
            .await
        {
            Ok(snapshot) => snapshot.clone(),
            // The sender lives as long as `self`, so this is unreachable in practice.
            Err(_) => self.snapshot(),
        }
    }
}

impl Drop for Aggregator {
    fn drop(&mut self) {
        let tasks = self.tasks.get_mut().unwrap_or_else(PoisonError::into_inner);
        for task in tasks.drain(..) {
            task.abort();
        }
    }
}
