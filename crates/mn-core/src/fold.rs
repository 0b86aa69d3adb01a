//! User-controlled fold (collapsed/expanded) state for day segments.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;

use crate::segment::Segment;

/// Fold overrides keyed by day label.
///
/// Overrides outlive any particular segment list: rebuilding segments produces
/// new [`Segment`] values with the same labels, so accumulated toggles still
/// apply. Clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct FoldStateStore {
    overrides: Arc<Mutex<HashMap<String, bool>>>,
}

/// A segment paired with its effective fold state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FoldedSegment<'a> {
    #[serde(flatten)]
    pub segment: &'a Segment,
    pub folded: bool,
}

impl FoldStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, bool>> {
        // The map is always left consistent, so a poisoned lock is still usable.
        self.overrides
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Effective fold state: the override if one exists, else the segment default.
    pub fn resolve(&self, segment: &Segment) -> bool {
        resolve_in(&self.lock(), segment)
    }

    /// Flips the effective fold state and returns the new value.
    ///
    /// Read and write happen under one lock, so toggles issued back to back
    /// from different handles each see the previous toggle's result.
    pub fn toggle(&self, segment: &Segment) -> bool {
        let mut overrides = self.lock();
        let folded = !resolve_in(&overrides, segment);
        overrides.insert(segment.day_label.clone(), folded);
        tracing::debug!(day = %segment.day_label, folded, "toggled segment fold");
        folded
    }

    /// Pairs each segment with its effective fold state.
    pub fn apply<'a>(&self, segments: &'a [Segment]) -> Vec<FoldedSegment<'a>> {
        let overrides = self.lock();
        segments
            .iter()
            .map(|segment| FoldedSegment {
                segment,
                folded: resolve_in(&overrides, segment),
            })
            .collect()
    }

    /// Number of days the user has toggled at least once.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

fn resolve_in(overrides: &HashMap<String, bool>, segment: &Segment) -> bool {
    overrides
        .get(&segment.day_label)
        .copied()
        .unwrap_or(segment.default_folded)
}
