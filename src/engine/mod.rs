//! Validated operations over a finance store.
//!
//! Services are stateless; every operation receives the store it acts on and,
//! where behavior depends on the calendar, an explicit `today`.

pub mod automation_service;
pub mod entry_service;
pub mod invoice_service;
pub mod recurrence_service;
pub mod series_service;
pub mod summary_service;

pub use automation_service::AutomationService;
pub use entry_service::EntryService;
pub use invoice_service::InvoiceService;
pub use recurrence_service::RecurrenceService;
pub use series_service::{MutationScope, SeriesService};
pub use summary_service::{BookTotals, MonthlyFlow, SummaryService};

use uuid::Uuid;

use crate::errors::StoreError;
use crate::ledger::{CardTerms, CycleKey, Instrument, InstrumentKind};
use crate::storage::BatchOutcome;

pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("{0}")]
    Validation(String),
    #[error("cycle {cycle} of instrument {instrument} is already closed")]
    AlreadyClosed { instrument: Uuid, cycle: CycleKey },
    #[error("cycle {cycle} of instrument {instrument} has no entries")]
    EmptyCycle { instrument: Uuid, cycle: CycleKey },
    #[error("{} of {} batch entries persisted", .0.succeeded.len(), .0.attempted())]
    PartialBatch(BatchOutcome),
}

/// Extracts billing terms from an instrument, rejecting wallets and
/// out-of-range day fields.
pub(crate) fn credit_terms(instrument: &Instrument) -> EngineResult<&CardTerms> {
    match &instrument.kind {
        InstrumentKind::RevolvingCredit(terms) if terms.day_fields_in_range() => Ok(terms),
        InstrumentKind::RevolvingCredit(_) => Err(EngineError::Validation(format!(
            "instrument `{}` has billing days outside 1-31",
            instrument.name
        ))),
        InstrumentKind::Wallet => Err(EngineError::Validation(format!(
            "instrument `{}` is not a credit instrument",
            instrument.name
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credit_terms_rejects_wallets() {
        let wallet = Instrument::wallet("Checking");
        let err = credit_terms(&wallet).expect_err("wallet must be rejected");
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[test]
    fn credit_terms_rejects_out_of_range_days() {
        let card = Instrument::revolving_credit("Visa", CardTerms::new(0, 15));
        let err = credit_terms(&card).expect_err("closing day 0 must be rejected");
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[test]
    fn credit_terms_returns_valid_terms() {
        let card = Instrument::revolving_credit("Visa", CardTerms::new(5, 15));
        let terms = credit_terms(&card).expect("valid terms");
        assert_eq!(terms.closing_day, 5);
        assert_eq!(terms.due_day, 15);
    }
}
