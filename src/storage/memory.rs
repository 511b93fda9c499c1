use uuid::Uuid;

use crate::errors::StoreError;
use crate::ledger::{AutomationRule, FinanceBook, Instrument, LedgerEntry};

use super::{EntryFilter, EntryPatch, EntryStore, InstrumentStore, Result, RuleStore};

/// Store kept entirely in memory, backed by one book document. Used by tests
/// and by callers embedding the engine without persistence.
#[derive(Debug)]
pub struct MemoryStore {
    book: FinanceBook,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(FinanceBook::new("in-memory"))
    }
}

impl MemoryStore {
    pub fn new(book: FinanceBook) -> Self {
        Self { book }
    }

    pub fn book(&self) -> &FinanceBook {
        &self.book
    }

    pub fn into_book(self) -> FinanceBook {
        self.book
    }
}

impl EntryStore for MemoryStore {
    fn create_entry(&mut self, entry: LedgerEntry) -> Result<LedgerEntry> {
        if self.book.entry(entry.id).is_some() {
            return Err(StoreError::DuplicateEntry(entry.id));
        }
        let stored = entry.clone();
        self.book.insert_entry(entry);
        Ok(stored)
    }

    fn get_entry(&self, id: Uuid) -> Result<LedgerEntry> {
        self.book
            .entry(id)
            .cloned()
            .ok_or(StoreError::EntryNotFound(id))
    }

    fn update_entry(&mut self, id: Uuid, patch: &EntryPatch) -> Result<LedgerEntry> {
        let entry = self
            .book
            .entry_mut(id)
            .ok_or(StoreError::EntryNotFound(id))?;
        patch.apply(entry);
        let updated = entry.clone();
        self.book.touch();
        Ok(updated)
    }

    fn delete_entry(&mut self, id: Uuid) -> Result<LedgerEntry> {
        self.book
            .remove_entry(id)
            .ok_or(StoreError::EntryNotFound(id))
    }

    fn list_entries(&self, filter: &EntryFilter) -> Result<Vec<LedgerEntry>> {
        let mut matches: Vec<LedgerEntry> = self
            .book
            .entries()
            .filter(|entry| filter.matches(entry))
            .cloned()
            .collect();
        matches.sort_by_key(|entry| entry.due_date);
        Ok(matches)
    }

    fn update_many(&mut self, filter: &EntryFilter, patch: &EntryPatch) -> Result<usize> {
        let ids: Vec<Uuid> = self
            .book
            .entries()
            .filter(|entry| filter.matches(entry))
            .map(|entry| entry.id)
            .collect();
        for id in &ids {
            if let Some(entry) = self.book.entry_mut(*id) {
                patch.apply(entry);
            }
        }
        if !ids.is_empty() {
            self.book.touch();
        }
        Ok(ids.len())
    }

    fn delete_many(&mut self, filter: &EntryFilter) -> Result<usize> {
        let before = self.book.entry_count();
        self.book.payables.retain(|entry| !filter.matches(entry));
        self.book.receivables.retain(|entry| !filter.matches(entry));
        let removed = before - self.book.entry_count();
        if removed > 0 {
            self.book.touch();
        }
        Ok(removed)
    }
}

impl InstrumentStore for MemoryStore {
    fn add_instrument(&mut self, instrument: Instrument) -> Result<Uuid> {
        Ok(self.book.add_instrument(instrument))
    }

    fn get_instrument(&self, id: Uuid) -> Result<Instrument> {
        self.book
            .instrument(id)
            .cloned()
            .ok_or(StoreError::InstrumentNotFound(id))
    }

    fn list_instruments(&self) -> Result<Vec<Instrument>> {
        Ok(self.book.instruments.clone())
    }
}

impl RuleStore for MemoryStore {
    fn add_rule(&mut self, rule: AutomationRule) -> Result<Uuid> {
        Ok(self.book.add_rule(rule))
    }

    fn list_rules(&self, active_only: bool) -> Result<Vec<AutomationRule>> {
        Ok(self
            .book
            .rules
            .iter()
            .filter(|rule| !active_only || rule.active)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Direction;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn entry(day: u32) -> LedgerEntry {
        LedgerEntry::new(
            Direction::Payable,
            "Utilities",
            "Office",
            Decimal::from(120),
            NaiveDate::from_ymd_opt(2026, 3, day).unwrap(),
        )
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut store = MemoryStore::default();
        let draft = entry(10);
        store.create_entry(draft.clone()).unwrap();
        let err = store
            .create_entry(draft)
            .expect_err("second insert with same id must fail");
        assert!(matches!(err, StoreError::DuplicateEntry(_)));
    }

    #[test]
    fn list_orders_by_due_date() {
        let mut store = MemoryStore::default();
        store.create_entry(entry(20)).unwrap();
        store.create_entry(entry(5)).unwrap();
        store.create_entry(entry(12)).unwrap();

        let listed = store.list_entries(&EntryFilter::default()).unwrap();
        let days: Vec<u32> = listed
            .iter()
            .map(|entry| chrono::Datelike::day(&entry.due_date))
            .collect();
        assert_eq!(days, vec![5, 12, 20]);
    }

    #[test]
    fn delete_many_reports_removed_count() {
        let mut store = MemoryStore::default();
        store.create_entry(entry(5)).unwrap();
        store.create_entry(entry(25)).unwrap();

        let filter = EntryFilter {
            due_on_or_after: Some(NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()),
            ..EntryFilter::default()
        };
        assert_eq!(store.delete_many(&filter).unwrap(), 1);
        assert_eq!(store.book().entry_count(), 1);
    }
}
