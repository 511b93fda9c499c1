//! Edits and deletions that can span the future members of a series.

use uuid::Uuid;

use crate::engine::{EngineError, EngineResult};
use crate::storage::{BatchOutcome, EntryFilter, EntryPatch, FinanceStore};

/// How far a mutation on a series member reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationScope {
    /// The picked entry only.
    OnlyThis,
    /// The picked entry and every member of its series due on or after it.
    ThisAndFuture,
}

/// Applies edits and deletions to entries, widening to future series members
/// when asked. Members are matched by series id and due date, never by
/// position, so previously deleted members leave no holes to trip over.
pub struct SeriesService;

impl SeriesService {
    /// Applies `patch` to the entry, or to it and its future series members.
    /// Returns how many entries changed.
    ///
    /// The future scope never rewrites member due dates or statuses; each
    /// member keeps its own place in the cadence and its own settlement
    /// state.
    pub fn apply_edit(
        store: &mut dyn FinanceStore,
        entry_id: Uuid,
        patch: &EntryPatch,
        scope: MutationScope,
    ) -> EngineResult<usize> {
        let pivot = store.get_entry(entry_id)?;
        let series_id = match (scope, pivot.series_id()) {
            (MutationScope::OnlyThis, _) | (_, None) => {
                store.update_entry(entry_id, patch)?;
                return Ok(1);
            }
            (MutationScope::ThisAndFuture, Some(series_id)) => series_id,
        };

        let filter = EntryFilter {
            series_id: Some(series_id),
            due_on_or_after: Some(pivot.due_date),
            ..EntryFilter::default()
        };
        let members = store.list_entries(&filter)?;
        let member_patch = patch.preserving_cadence();

        let mut outcome = BatchOutcome::default();
        for member in members {
            match store.update_entry(member.id, &member_patch) {
                Ok(updated) => outcome.succeeded.push(updated),
                Err(error) => outcome.failed.push((member, error)),
            }
        }
        if outcome.is_complete() {
            Ok(outcome.succeeded.len())
        } else {
            Err(EngineError::PartialBatch(outcome))
        }
    }

    /// Deletes the entry, or it and its future series members. Returns how
    /// many entries were removed.
    pub fn apply_delete(
        store: &mut dyn FinanceStore,
        entry_id: Uuid,
        scope: MutationScope,
    ) -> EngineResult<usize> {
        let pivot = store.get_entry(entry_id)?;
        let series_id = match (scope, pivot.series_id()) {
            (MutationScope::OnlyThis, _) | (_, None) => {
                store.delete_entry(entry_id)?;
                return Ok(1);
            }
            (MutationScope::ThisAndFuture, Some(series_id)) => series_id,
        };

        let filter = EntryFilter {
            series_id: Some(series_id),
            due_on_or_after: Some(pivot.due_date),
            ..EntryFilter::default()
        };
        Ok(store.delete_many(&filter)?)
    }
}
