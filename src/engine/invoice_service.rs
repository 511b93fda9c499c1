//! Statement-cycle consolidation for revolving-credit instruments.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::engine::{credit_terms, EngineError, EngineResult};
use crate::ledger::{CycleKey, Direction, LedgerEntry};
use crate::storage::{EntryFilter, EntryPatch, FinanceStore};

/// Category assigned to consolidated invoice payables.
pub const INVOICE_CATEGORY: &str = "Credit Card";

/// Closes statement cycles: all unbilled charges of one instrument and cycle
/// become a single payable, and the charges are flagged as billed.
pub struct InvoiceService;

impl InvoiceService {
    /// Closes `cycle` for `instrument_id` and returns the invoice payable.
    ///
    /// The invoice is created before any charge is flagged, so an interrupted
    /// close can leave extra unbilled charges but never a billed charge
    /// without an invoice. Re-running the close reports the cycle as already
    /// closed once every charge is flagged.
    ///
    /// The invoice falls due on the cycle's due day; when that day is already
    /// behind `today` it rolls forward one month.
    pub fn close(
        store: &mut dyn FinanceStore,
        instrument_id: Uuid,
        cycle: CycleKey,
        today: NaiveDate,
    ) -> EngineResult<LedgerEntry> {
        let instrument = store.get_instrument(instrument_id)?;
        let terms = credit_terms(&instrument)?;
        let due = cycle.due_date_rolled(terms.due_day, today);

        let cycle_filter = EntryFilter {
            instrument_id: Some(instrument_id),
            statement_cycle: Some(cycle),
            ..EntryFilter::default()
        };
        let charges = store.list_entries(&cycle_filter)?;
        if charges.is_empty() {
            return Err(EngineError::EmptyCycle {
                instrument: instrument_id,
                cycle,
            });
        }

        if charges.iter().all(|charge| charge.is_billed()) {
            return Err(EngineError::AlreadyClosed {
                instrument: instrument_id,
                cycle,
            });
        }
        let total: Decimal = charges
            .iter()
            .filter(|charge| !charge.is_billed())
            .map(|charge| charge.amount)
            .sum();

        let invoice = store.create_entry(LedgerEntry::new(
            Direction::Payable,
            format!("{} invoice - {}", instrument.name, cycle),
            INVOICE_CATEGORY,
            total,
            due,
        ))?;

        let unbilled_filter = EntryFilter {
            billed: Some(false),
            ..cycle_filter
        };
        let mark = EntryPatch {
            mark_billed: true,
            ..EntryPatch::default()
        };
        let flagged = store.update_many(&unbilled_filter, &mark)?;
        tracing::debug!(
            instrument = %instrument_id,
            cycle = %cycle,
            flagged,
            "closed statement cycle"
        );
        Ok(invoice)
    }
}
