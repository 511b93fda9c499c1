use std::{
    collections::HashSet,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use uuid::Uuid;

use crate::errors::StoreError;
use crate::ledger::{
    AutomationRule, FinanceBook, Funding, Instrument, LedgerEntry, CURRENT_SCHEMA_VERSION,
};
use crate::utils::ensure_dir;

use super::{EntryFilter, EntryPatch, EntryStore, InstrumentStore, MemoryStore, Result, RuleStore};

const TMP_SUFFIX: &str = "tmp";

/// File-backed store. Every mutation rewrites the whole document through a
/// temporary file so a crash mid-write never truncates the book.
#[derive(Debug)]
pub struct JsonStore {
    inner: MemoryStore,
    path: PathBuf,
}

impl JsonStore {
    /// Creates a new book at `path` and writes it out immediately.
    /// Fails if the file already exists.
    pub fn create(path: impl Into<PathBuf>, name: &str) -> Result<Self> {
        let path = path.into();
        if path.exists() {
            return Err(StoreError::Storage(format!(
                "book file `{}` already exists",
                path.display()
            )));
        }
        let store = Self {
            inner: MemoryStore::new(FinanceBook::new(name)),
            path,
        };
        store.flush()?;
        Ok(store)
    }

    /// Opens an existing book file, rejecting documents written by a newer
    /// schema. Referential problems are logged, not fatal.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let book = load_book_from_path(&path)?;
        for warning in book_warnings(&book) {
            tracing::warn!("{}", warning);
        }
        Ok(Self {
            inner: MemoryStore::new(book),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn book(&self) -> &FinanceBook {
        self.inner.book()
    }

    fn flush(&self) -> Result<()> {
        save_book_to_path(self.inner.book(), &self.path)
    }
}

impl EntryStore for JsonStore {
    fn create_entry(&mut self, entry: LedgerEntry) -> Result<LedgerEntry> {
        let stored = self.inner.create_entry(entry)?;
        self.flush()?;
        Ok(stored)
    }

    fn get_entry(&self, id: Uuid) -> Result<LedgerEntry> {
        self.inner.get_entry(id)
    }

    fn update_entry(&mut self, id: Uuid, patch: &EntryPatch) -> Result<LedgerEntry> {
        let updated = self.inner.update_entry(id, patch)?;
        self.flush()?;
        Ok(updated)
    }

    fn delete_entry(&mut self, id: Uuid) -> Result<LedgerEntry> {
        let removed = self.inner.delete_entry(id)?;
        self.flush()?;
        Ok(removed)
    }

    fn list_entries(&self, filter: &EntryFilter) -> Result<Vec<LedgerEntry>> {
        self.inner.list_entries(filter)
    }

    fn update_many(&mut self, filter: &EntryFilter, patch: &EntryPatch) -> Result<usize> {
        let touched = self.inner.update_many(filter, patch)?;
        if touched > 0 {
            self.flush()?;
        }
        Ok(touched)
    }

    fn delete_many(&mut self, filter: &EntryFilter) -> Result<usize> {
        let removed = self.inner.delete_many(filter)?;
        if removed > 0 {
            self.flush()?;
        }
        Ok(removed)
    }
}

impl InstrumentStore for JsonStore {
    fn add_instrument(&mut self, instrument: Instrument) -> Result<Uuid> {
        let id = self.inner.add_instrument(instrument)?;
        self.flush()?;
        Ok(id)
    }

    fn get_instrument(&self, id: Uuid) -> Result<Instrument> {
        self.inner.get_instrument(id)
    }

    fn list_instruments(&self) -> Result<Vec<Instrument>> {
        self.inner.list_instruments()
    }
}

impl RuleStore for JsonStore {
    fn add_rule(&mut self, rule: AutomationRule) -> Result<Uuid> {
        let id = self.inner.add_rule(rule)?;
        self.flush()?;
        Ok(id)
    }

    fn list_rules(&self, active_only: bool) -> Result<Vec<AutomationRule>> {
        self.inner.list_rules(active_only)
    }
}

pub fn save_book_to_path(book: &FinanceBook, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let json = serde_json::to_string_pretty(book)?;
    let tmp = tmp_path(path);
    write_atomic(&tmp, &json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

pub fn load_book_from_path(path: &Path) -> Result<FinanceBook> {
    let data = fs::read_to_string(path)?;
    let book: FinanceBook = serde_json::from_str(&data)?;
    if book.schema_version > CURRENT_SCHEMA_VERSION {
        return Err(StoreError::Storage(format!(
            "book file `{}` was written by a newer schema version",
            path.display()
        )));
    }
    Ok(book)
}

/// Referential checks run when a book is opened. None of these block loading;
/// the engine validates instruments again before using them.
pub fn book_warnings(book: &FinanceBook) -> Vec<String> {
    let instrument_ids: HashSet<Uuid> = book.instruments.iter().map(|i| i.id).collect();
    let mut warnings = Vec::new();
    for entry in book.entries() {
        match &entry.funding {
            Funding::Wallet(id) => {
                if !instrument_ids.contains(id) {
                    warnings.push(format!("entry {} references unknown wallet {}", entry.id, id));
                }
            }
            Funding::Card(charge) => {
                if !instrument_ids.contains(&charge.instrument_id) {
                    warnings.push(format!(
                        "entry {} references unknown card {}",
                        entry.id, charge.instrument_id
                    ));
                } else if book
                    .instrument(charge.instrument_id)
                    .is_some_and(|instrument| !instrument.is_revolving_credit())
                {
                    warnings.push(format!(
                        "entry {} carries a card charge against non-credit instrument {}",
                        entry.id, charge.instrument_id
                    ));
                }
            }
            Funding::None => {}
        }
    }
    warnings
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}
