use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::cycle::CycleKey;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Direction {
    Payable,
    Receivable,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum EntryStatus {
    Pending,
    Settled,
}

/// Link back to the recurrence request an entry was generated from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeriesRef {
    pub id: Uuid,
    /// Part of an open-ended series whose buffer is extended over time.
    #[serde(default)]
    pub auto_renew: bool,
}

/// How an entry is funded. Statement-cycle data exists only on card charges,
/// so cash entries and receivables cannot carry a cycle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum Funding {
    #[default]
    None,
    Wallet(Uuid),
    Card(CardCharge),
}

/// A purchase on a revolving-credit instrument, pinned to the statement cycle
/// computed from its purchase date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CardCharge {
    pub instrument_id: Uuid,
    pub cycle: CycleKey,
    #[serde(default)]
    pub billed: bool,
}

/// One ledger line: an obligation to pay or to receive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: Uuid,
    pub direction: Direction,
    pub description: String,
    pub category: String,
    pub amount: Decimal,
    pub due_date: NaiveDate,
    pub status: EntryStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settled_on: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series: Option<SeriesRef>,
    #[serde(default)]
    pub funding: Funding,
}

impl LedgerEntry {
    pub fn new(
        direction: Direction,
        description: impl Into<String>,
        category: impl Into<String>,
        amount: Decimal,
        due_date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            direction,
            description: description.into(),
            category: category.into(),
            amount,
            due_date,
            status: EntryStatus::Pending,
            settled_on: None,
            series: None,
            funding: Funding::None,
        }
    }

    pub fn series_id(&self) -> Option<Uuid> {
        self.series.map(|series| series.id)
    }

    pub fn instrument_id(&self) -> Option<Uuid> {
        match &self.funding {
            Funding::None => None,
            Funding::Wallet(id) => Some(*id),
            Funding::Card(charge) => Some(charge.instrument_id),
        }
    }

    pub fn card_charge(&self) -> Option<&CardCharge> {
        match &self.funding {
            Funding::Card(charge) => Some(charge),
            _ => None,
        }
    }

    pub fn card_charge_mut(&mut self) -> Option<&mut CardCharge> {
        match &mut self.funding {
            Funding::Card(charge) => Some(charge),
            _ => None,
        }
    }

    pub fn statement_cycle(&self) -> Option<CycleKey> {
        self.card_charge().map(|charge| charge.cycle)
    }

    pub fn is_billed(&self) -> bool {
        self.card_charge().map(|charge| charge.billed).unwrap_or(false)
    }

    /// Overdue is derived, never stored: a pending entry whose due date has
    /// passed relative to the injected `today`.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status == EntryStatus::Pending && self.due_date < today
    }

    pub fn settle(&mut self, on: NaiveDate) {
        self.status = EntryStatus::Settled;
        self.settled_on = Some(on);
    }

    pub fn reopen(&mut self) {
        self.status = EntryStatus::Pending;
        self.settled_on = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn sample_entry() -> LedgerEntry {
        LedgerEntry::new(
            Direction::Payable,
            "Hosting",
            "Infrastructure",
            Decimal::new(4990, 2),
            NaiveDate::from_ymd_opt(2026, 5, 10).unwrap(),
        )
    }

    #[test]
    fn settle_and_reopen_track_settled_date() {
        let mut entry = sample_entry();
        let paid_on = NaiveDate::from_ymd_opt(2026, 5, 8).unwrap();
        entry.settle(paid_on);
        assert_eq!(entry.status, EntryStatus::Settled);
        assert_eq!(entry.settled_on, Some(paid_on));

        entry.reopen();
        assert_eq!(entry.status, EntryStatus::Pending);
        assert!(entry.settled_on.is_none());
    }

    #[test]
    fn overdue_is_derived_from_today() {
        let mut entry = sample_entry();
        let before_due = NaiveDate::from_ymd_opt(2026, 5, 10).unwrap();
        let after_due = NaiveDate::from_ymd_opt(2026, 5, 11).unwrap();
        assert!(!entry.is_overdue(before_due), "due today is not overdue");
        assert!(entry.is_overdue(after_due));

        entry.settle(after_due);
        assert!(!entry.is_overdue(after_due), "settled entries never go overdue");
    }

    #[test]
    fn cycle_data_only_exists_on_card_charges() {
        let mut entry = sample_entry();
        assert!(entry.statement_cycle().is_none());
        assert!(!entry.is_billed());

        entry.funding = Funding::Wallet(Uuid::new_v4());
        assert!(entry.statement_cycle().is_none());

        let card = Uuid::new_v4();
        entry.funding = Funding::Card(CardCharge {
            instrument_id: card,
            cycle: "2026-04".parse().unwrap(),
            billed: false,
        });
        assert_eq!(entry.instrument_id(), Some(card));
        assert_eq!(entry.statement_cycle().unwrap().to_string(), "2026-04");
    }
}
