//! Settlement helpers for individual entries.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::engine::EngineResult;
use crate::ledger::LedgerEntry;
use crate::storage::{EntryPatch, FinanceStore, StatusChange};

/// Marks entries settled or reopens them.
pub struct EntryService;

impl EntryService {
    /// Settles the entry as of `on` and returns the stored copy.
    pub fn settle(
        store: &mut dyn FinanceStore,
        id: Uuid,
        on: NaiveDate,
    ) -> EngineResult<LedgerEntry> {
        let patch = EntryPatch {
            status: Some(StatusChange::Settle { on }),
            ..EntryPatch::default()
        };
        Ok(store.update_entry(id, &patch)?)
    }

    /// Puts a settled entry back to pending, clearing its settlement date.
    pub fn reopen(store: &mut dyn FinanceStore, id: Uuid) -> EngineResult<LedgerEntry> {
        let patch = EntryPatch {
            status: Some(StatusChange::Reopen),
            ..EntryPatch::default()
        };
        Ok(store.update_entry(id, &patch)?)
    }
}
