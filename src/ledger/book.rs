use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::entry::{Direction, LedgerEntry};
use super::instrument::Instrument;
use super::rule::AutomationRule;

pub const CURRENT_SCHEMA_VERSION: u8 = 1;

/// Serializable aggregate holding the four collections the engine works on:
/// obligations owed, obligations owed to us, instruments, and automation
/// rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinanceBook {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub payables: Vec<LedgerEntry>,
    #[serde(default)]
    pub receivables: Vec<LedgerEntry>,
    #[serde(default)]
    pub instruments: Vec<Instrument>,
    #[serde(default)]
    pub rules: Vec<AutomationRule>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default = "FinanceBook::schema_version_default")]
    pub schema_version: u8,
}

impl FinanceBook {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            payables: Vec::new(),
            receivables: Vec::new(),
            instruments: Vec::new(),
            rules: Vec::new(),
            created_at: now,
            updated_at: now,
            schema_version: CURRENT_SCHEMA_VERSION,
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = &LedgerEntry> {
        self.payables.iter().chain(self.receivables.iter())
    }

    pub fn entry(&self, id: Uuid) -> Option<&LedgerEntry> {
        self.entries().find(|entry| entry.id == id)
    }

    pub fn entry_mut(&mut self, id: Uuid) -> Option<&mut LedgerEntry> {
        self.payables
            .iter_mut()
            .chain(self.receivables.iter_mut())
            .find(|entry| entry.id == id)
    }

    /// Appends an entry to the collection matching its direction.
    pub fn insert_entry(&mut self, entry: LedgerEntry) -> Uuid {
        let id = entry.id;
        match entry.direction {
            Direction::Payable => self.payables.push(entry),
            Direction::Receivable => self.receivables.push(entry),
        }
        self.touch();
        id
    }

    pub fn remove_entry(&mut self, id: Uuid) -> Option<LedgerEntry> {
        let collections = [&mut self.payables, &mut self.receivables];
        for collection in collections {
            if let Some(position) = collection.iter().position(|entry| entry.id == id) {
                let removed = collection.remove(position);
                self.touch();
                return Some(removed);
            }
        }
        None
    }

    pub fn entry_count(&self) -> usize {
        self.payables.len() + self.receivables.len()
    }

    pub fn instrument(&self, id: Uuid) -> Option<&Instrument> {
        self.instruments
            .iter()
            .find(|instrument| instrument.id == id)
    }

    pub fn add_instrument(&mut self, instrument: Instrument) -> Uuid {
        let id = instrument.id;
        self.instruments.push(instrument);
        self.touch();
        id
    }

    pub fn add_rule(&mut self, rule: AutomationRule) -> Uuid {
        let id = rule.id;
        self.rules.push(rule);
        self.touch();
        id
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn schema_version_default() -> u8 {
        CURRENT_SCHEMA_VERSION
    }
}
