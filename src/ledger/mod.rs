//! Ledger domain models: entries, instruments, billing cycles, recurrence
//! expansion, and the serializable book document.

pub mod book;
pub mod cycle;
pub mod entry;
pub mod instrument;
pub mod recurrence;
pub mod rule;

pub use book::{FinanceBook, CURRENT_SCHEMA_VERSION};
pub use cycle::{add_months, days_in_month, CycleKey, ParseCycleKeyError};
pub use entry::{CardCharge, Direction, EntryStatus, Funding, LedgerEntry, SeriesRef};
pub use instrument::{CardTerms, Instrument, InstrumentKind};
pub use recurrence::{
    build_series, split_installments, EntryTemplate, ExpansionPolicy, FundingSource, RepeatRule,
    DEFAULT_AUTO_RENEW_LOOKAHEAD,
};
pub use rule::{AutomationRule, RuleFormula, RuleTrigger};
