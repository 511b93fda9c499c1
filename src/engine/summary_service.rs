//! Read-only aggregates over a finance store.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::engine::EngineResult;
use crate::ledger::{CycleKey, Direction, EntryStatus, LedgerEntry};
use crate::storage::{EntryFilter, FinanceStore};

/// Cash position of a book, split into settled history and pending outlook.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookTotals {
    pub settled_income: Decimal,
    pub settled_expense: Decimal,
    /// Settled income minus settled expense.
    pub balance: Decimal,
    pub projected_income: Decimal,
    pub projected_expense: Decimal,
    /// `balance` plus every pending flow.
    pub projected_balance: Decimal,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MonthlyFlow {
    pub income: Decimal,
    pub expense: Decimal,
}

/// Derived views over the book. Billed card charges are excluded everywhere;
/// their amounts travel on the consolidated invoice instead.
pub struct SummaryService;

impl SummaryService {
    pub fn totals(store: &dyn FinanceStore) -> EngineResult<BookTotals> {
        let entries = store.list_entries(&EntryFilter::default())?;
        let mut totals = BookTotals::default();
        for entry in entries.iter().filter(|entry| !entry.is_billed()) {
            match (entry.direction, entry.status) {
                (Direction::Receivable, EntryStatus::Settled) => {
                    totals.settled_income += entry.amount
                }
                (Direction::Receivable, EntryStatus::Pending) => {
                    totals.projected_income += entry.amount
                }
                (Direction::Payable, EntryStatus::Settled) => {
                    totals.settled_expense += entry.amount
                }
                (Direction::Payable, EntryStatus::Pending) => {
                    totals.projected_expense += entry.amount
                }
            }
        }
        totals.balance = totals.settled_income - totals.settled_expense;
        totals.projected_balance =
            totals.balance + totals.projected_income - totals.projected_expense;
        Ok(totals)
    }

    /// Pending entries whose due date is strictly before `today`, soonest
    /// first.
    pub fn overdue(store: &dyn FinanceStore, today: NaiveDate) -> EngineResult<Vec<LedgerEntry>> {
        let filter = EntryFilter {
            status: Some(EntryStatus::Pending),
            ..EntryFilter::default()
        };
        let entries = store.list_entries(&filter)?;
        Ok(entries
            .into_iter()
            .filter(|entry| entry.is_overdue(today) && !entry.is_billed())
            .collect())
    }

    /// Settled expense per category, largest first.
    pub fn expense_breakdown(store: &dyn FinanceStore) -> EngineResult<Vec<(String, Decimal)>> {
        let filter = EntryFilter {
            direction: Some(Direction::Payable),
            status: Some(EntryStatus::Settled),
            ..EntryFilter::default()
        };
        let mut by_category: BTreeMap<String, Decimal> = BTreeMap::new();
        for entry in store.list_entries(&filter)? {
            *by_category.entry(entry.category).or_default() += entry.amount;
        }
        let mut breakdown: Vec<(String, Decimal)> = by_category.into_iter().collect();
        breakdown.sort_by(|a, b| b.1.cmp(&a.1));
        Ok(breakdown)
    }

    /// Income and expense bucketed by due month.
    pub fn monthly_flows(
        store: &dyn FinanceStore,
    ) -> EngineResult<BTreeMap<CycleKey, MonthlyFlow>> {
        let entries = store.list_entries(&EntryFilter::default())?;
        let mut flows: BTreeMap<CycleKey, MonthlyFlow> = BTreeMap::new();
        for entry in entries.iter().filter(|entry| !entry.is_billed()) {
            let flow = flows.entry(CycleKey::of(entry.due_date)).or_default();
            match entry.direction {
                Direction::Receivable => flow.income += entry.amount,
                Direction::Payable => flow.expense += entry.amount,
            }
        }
        Ok(flows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{EntryStore, MemoryStore};
    use rust_decimal_macros::dec;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn entry(
        direction: Direction,
        category: &str,
        amount: Decimal,
        due: NaiveDate,
        settled: bool,
    ) -> LedgerEntry {
        let mut entry = LedgerEntry::new(direction, "entry", category, amount, due);
        if settled {
            entry.settle(due);
        }
        entry
    }

    #[test]
    fn totals_split_settled_from_pending() {
        let mut store = MemoryStore::default();
        let d = date(2026, 3, 10);
        store
            .create_entry(entry(Direction::Receivable, "Salary", dec!(1000), d, true))
            .unwrap();
        store
            .create_entry(entry(Direction::Payable, "Rent", dec!(600), d, true))
            .unwrap();
        store
            .create_entry(entry(Direction::Receivable, "Bonus", dec!(200), d, false))
            .unwrap();
        store
            .create_entry(entry(Direction::Payable, "Power", dec!(80), d, false))
            .unwrap();

        let totals = SummaryService::totals(&store).unwrap();
        assert_eq!(totals.settled_income, dec!(1000));
        assert_eq!(totals.settled_expense, dec!(600));
        assert_eq!(totals.balance, dec!(400));
        assert_eq!(totals.projected_income, dec!(200));
        assert_eq!(totals.projected_expense, dec!(80));
        assert_eq!(totals.projected_balance, dec!(520));
    }

    #[test]
    fn overdue_lists_pending_entries_past_due() {
        let mut store = MemoryStore::default();
        store
            .create_entry(entry(
                Direction::Payable,
                "Rent",
                dec!(600),
                date(2026, 3, 1),
                false,
            ))
            .unwrap();
        store
            .create_entry(entry(
                Direction::Payable,
                "Settled late",
                dec!(50),
                date(2026, 2, 1),
                true,
            ))
            .unwrap();
        store
            .create_entry(entry(
                Direction::Payable,
                "Not due yet",
                dec!(70),
                date(2026, 4, 1),
                false,
            ))
            .unwrap();

        let overdue = SummaryService::overdue(&store, date(2026, 3, 15)).unwrap();
        assert_eq!(overdue.len(), 1);
        assert_eq!(overdue[0].category, "Rent");
    }

    #[test]
    fn breakdown_orders_categories_by_spend() {
        let mut store = MemoryStore::default();
        let d = date(2026, 3, 10);
        store
            .create_entry(entry(Direction::Payable, "Food", dec!(120), d, true))
            .unwrap();
        store
            .create_entry(entry(Direction::Payable, "Housing", dec!(900), d, true))
            .unwrap();
        store
            .create_entry(entry(Direction::Payable, "Food", dec!(60), d, true))
            .unwrap();
        store
            .create_entry(entry(Direction::Payable, "Pending", dec!(999), d, false))
            .unwrap();

        let breakdown = SummaryService::expense_breakdown(&store).unwrap();
        assert_eq!(
            breakdown,
            vec![
                ("Housing".to_string(), dec!(900)),
                ("Food".to_string(), dec!(180)),
            ]
        );
    }

    #[test]
    fn flows_bucket_by_due_month() {
        let mut store = MemoryStore::default();
        store
            .create_entry(entry(
                Direction::Receivable,
                "Salary",
                dec!(1000),
                date(2026, 3, 25),
                false,
            ))
            .unwrap();
        store
            .create_entry(entry(
                Direction::Payable,
                "Rent",
                dec!(600),
                date(2026, 3, 1),
                false,
            ))
            .unwrap();
        store
            .create_entry(entry(
                Direction::Payable,
                "Rent",
                dec!(600),
                date(2026, 4, 1),
                false,
            ))
            .unwrap();

        let flows = SummaryService::monthly_flows(&store).unwrap();
        let march: CycleKey = "2026-03".parse().unwrap();
        let april: CycleKey = "2026-04".parse().unwrap();
        assert_eq!(flows[&march].income, dec!(1000));
        assert_eq!(flows[&march].expense, dec!(600));
        assert_eq!(flows[&april].expense, dec!(600));
        assert_eq!(flows.len(), 2);
    }
}
