pub mod json_backend;
pub mod memory;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::errors::StoreError;
use crate::ledger::{
    AutomationRule, CycleKey, Direction, EntryStatus, Funding, Instrument, LedgerEntry,
};

pub type Result<T> = std::result::Result<T, StoreError>;

/// Row-level operations over the two obligation collections. Every write is
/// atomic per row only; multi-entry helpers issue independent per-row
/// operations.
pub trait EntryStore: Send + Sync {
    /// Inserts a draft, keeping its id. Fails on duplicate ids.
    fn create_entry(&mut self, entry: LedgerEntry) -> Result<LedgerEntry>;
    fn get_entry(&self, id: Uuid) -> Result<LedgerEntry>;
    fn update_entry(&mut self, id: Uuid, patch: &EntryPatch) -> Result<LedgerEntry>;
    fn delete_entry(&mut self, id: Uuid) -> Result<LedgerEntry>;
    /// Matching entries ordered by due date.
    fn list_entries(&self, filter: &EntryFilter) -> Result<Vec<LedgerEntry>>;

    /// Persists drafts one by one; a failed draft does not abort the rest.
    fn create_many(&mut self, entries: Vec<LedgerEntry>) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();
        for entry in entries {
            match self.create_entry(entry.clone()) {
                Ok(created) => outcome.succeeded.push(created),
                Err(error) => outcome.failed.push((entry, error)),
            }
        }
        outcome
    }

    /// Applies `patch` to every matching entry, returning how many changed.
    fn update_many(&mut self, filter: &EntryFilter, patch: &EntryPatch) -> Result<usize>;
    fn delete_many(&mut self, filter: &EntryFilter) -> Result<usize>;
}

/// Lookup and registration of wallets and cards.
pub trait InstrumentStore: Send + Sync {
    fn add_instrument(&mut self, instrument: Instrument) -> Result<Uuid>;
    fn get_instrument(&self, id: Uuid) -> Result<Instrument>;
    fn list_instruments(&self) -> Result<Vec<Instrument>>;
}

/// Access to the standing automation rules.
pub trait RuleStore: Send + Sync {
    fn add_rule(&mut self, rule: AutomationRule) -> Result<Uuid>;
    fn list_rules(&self, active_only: bool) -> Result<Vec<AutomationRule>>;
}

/// Everything the engine entry points need from a backend.
pub trait FinanceStore: EntryStore + InstrumentStore + RuleStore {}

impl<T: EntryStore + InstrumentStore + RuleStore> FinanceStore for T {}

/// Equality and range predicates the stores understand. Unset fields match
/// everything.
#[derive(Debug, Clone, Default)]
pub struct EntryFilter {
    pub direction: Option<Direction>,
    pub status: Option<EntryStatus>,
    pub series_id: Option<Uuid>,
    pub instrument_id: Option<Uuid>,
    pub statement_cycle: Option<CycleKey>,
    pub billed: Option<bool>,
    pub due_on_or_after: Option<NaiveDate>,
    pub due_on_or_before: Option<NaiveDate>,
}

impl EntryFilter {
    pub fn matches(&self, entry: &LedgerEntry) -> bool {
        if let Some(direction) = self.direction {
            if entry.direction != direction {
                return false;
            }
        }
        if let Some(status) = self.status {
            if entry.status != status {
                return false;
            }
        }
        if let Some(series_id) = self.series_id {
            if entry.series_id() != Some(series_id) {
                return false;
            }
        }
        if let Some(instrument_id) = self.instrument_id {
            if entry.instrument_id() != Some(instrument_id) {
                return false;
            }
        }
        if let Some(cycle) = self.statement_cycle {
            if entry.statement_cycle() != Some(cycle) {
                return false;
            }
        }
        if let Some(billed) = self.billed {
            // The billed predicate only ever matches card charges.
            match entry.card_charge() {
                Some(charge) if charge.billed == billed => {}
                _ => return false,
            }
        }
        if let Some(from) = self.due_on_or_after {
            if entry.due_date < from {
                return false;
            }
        }
        if let Some(to) = self.due_on_or_before {
            if entry.due_date > to {
                return false;
            }
        }
        true
    }
}

/// Field-wise update applied to an existing entry. Unset fields stay
/// untouched; the series link and statement cycle are never patchable.
#[derive(Debug, Clone, Default)]
pub struct EntryPatch {
    pub description: Option<String>,
    pub category: Option<String>,
    pub amount: Option<Decimal>,
    pub due_date: Option<NaiveDate>,
    pub status: Option<StatusChange>,
    /// Repoints the funding instrument. Card charges keep their cycle and
    /// billed state; anything else becomes wallet-funded.
    pub instrument: Option<Uuid>,
    /// Flags card charges as consolidated into an invoice. Never unset.
    pub mark_billed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusChange {
    Settle { on: NaiveDate },
    Reopen,
}

impl EntryPatch {
    pub fn apply(&self, entry: &mut LedgerEntry) {
        if let Some(description) = &self.description {
            entry.description = description.clone();
        }
        if let Some(category) = &self.category {
            entry.category = category.clone();
        }
        if let Some(amount) = self.amount {
            entry.amount = amount;
        }
        if let Some(due_date) = self.due_date {
            entry.due_date = due_date;
        }
        match self.status {
            Some(StatusChange::Settle { on }) => entry.settle(on),
            Some(StatusChange::Reopen) => entry.reopen(),
            None => {}
        }
        if let Some(instrument) = self.instrument {
            entry.funding = match entry.funding.clone() {
                Funding::Card(mut charge) => {
                    charge.instrument_id = instrument;
                    Funding::Card(charge)
                }
                _ => Funding::Wallet(instrument),
            };
        }
        if self.mark_billed {
            if let Some(charge) = entry.card_charge_mut() {
                charge.billed = true;
            }
        }
    }

    /// Copy of this patch safe to apply across series members: member due
    /// dates and settlement state are preserved.
    pub fn preserving_cadence(&self) -> EntryPatch {
        EntryPatch {
            due_date: None,
            status: None,
            ..self.clone()
        }
    }
}

/// Result of a per-entry batch write: which drafts landed and which did not.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub succeeded: Vec<LedgerEntry>,
    pub failed: Vec<(LedgerEntry, StoreError)>,
}

impl BatchOutcome {
    pub fn attempted(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

pub use json_backend::{load_book_from_path, save_book_to_path, JsonStore};
pub use memory::MemoryStore;
