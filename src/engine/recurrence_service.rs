//! Expansion of recurrence requests into concrete ledger entries.

use rust_decimal::Decimal;

use crate::engine::{credit_terms, AutomationService, EngineError, EngineResult};
use crate::ledger::{
    build_series, Direction, EntryTemplate, ExpansionPolicy, FundingSource, Instrument,
    InstrumentKind, LedgerEntry, RepeatRule,
};
use crate::storage::FinanceStore;

/// Turns one recurrence request into its full set of entries, up front.
///
/// Counted modes land `count` members; auto-renew lands a lookahead buffer.
/// Nothing is generated lazily, so every future obligation is visible in the
/// book the moment it is recorded.
pub struct RecurrenceService;

impl RecurrenceService {
    /// Validates a request and assembles its drafts without persisting them.
    /// `instrument` must be the resolved instrument for
    /// `template.instrument_id`, or `None` for unfunded entries.
    pub fn expand(
        template: &EntryTemplate,
        rule: RepeatRule,
        instrument: Option<&Instrument>,
        policy: &ExpansionPolicy,
    ) -> EngineResult<Vec<LedgerEntry>> {
        if template.amount <= Decimal::ZERO {
            return Err(EngineError::Validation("amount must be positive".into()));
        }
        if template.description.trim().is_empty() {
            return Err(EngineError::Validation(
                "description must not be blank".into(),
            ));
        }
        if let RepeatRule::Installments(0) | RepeatRule::Recurring(0) = rule {
            return Err(EngineError::Validation(
                "occurrence count must be at least 1".into(),
            ));
        }

        let source = match instrument {
            None => FundingSource::None,
            Some(instrument) => match &instrument.kind {
                InstrumentKind::Wallet => FundingSource::Wallet(instrument.id),
                InstrumentKind::RevolvingCredit(_) => {
                    if template.direction == Direction::Receivable {
                        return Err(EngineError::Validation(
                            "a receivable cannot be funded by a credit instrument".into(),
                        ));
                    }
                    let terms = credit_terms(instrument)?;
                    FundingSource::Card {
                        instrument_id: instrument.id,
                        terms: terms.clone(),
                    }
                }
            },
        };

        Ok(build_series(template, rule, source, policy))
    }

    /// Expands a request and persists every member. Entries are written one
    /// by one; when any write fails the ones already stored stay stored and
    /// the outcome is reported as a partial batch.
    ///
    /// Recorded receivables feed the automation rules after the batch lands.
    pub fn record(
        store: &mut dyn FinanceStore,
        template: &EntryTemplate,
        rule: RepeatRule,
        policy: &ExpansionPolicy,
    ) -> EngineResult<Vec<LedgerEntry>> {
        let instrument = match template.instrument_id {
            Some(id) => Some(store.get_instrument(id)?),
            None => None,
        };
        let drafts = Self::expand(template, rule, instrument.as_ref(), policy)?;

        let outcome = store.create_many(drafts);
        if !outcome.is_complete() {
            return Err(EngineError::PartialBatch(outcome));
        }

        let created = outcome.succeeded;
        for entry in &created {
            if entry.direction == Direction::Receivable {
                AutomationService::on_income_recorded(store, entry);
            }
        }
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{CardTerms, EntryStatus};
    use crate::storage::{EntryFilter, EntryStore, InstrumentStore, MemoryStore};
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn payable(amount: i64) -> EntryTemplate {
        EntryTemplate::new(
            Direction::Payable,
            "Office chairs",
            "Equipment",
            Decimal::from(amount),
            date(2026, 1, 15),
        )
    }

    #[test]
    fn expand_rejects_non_positive_amounts() {
        let err = RecurrenceService::expand(
            &payable(0),
            RepeatRule::Single,
            None,
            &ExpansionPolicy::default(),
        )
        .expect_err("zero amount must be rejected");
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[test]
    fn expand_rejects_blank_descriptions() {
        let mut template = payable(100);
        template.description = "   ".into();
        let err = RecurrenceService::expand(
            &template,
            RepeatRule::Single,
            None,
            &ExpansionPolicy::default(),
        )
        .expect_err("blank description must be rejected");
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[test]
    fn expand_rejects_zero_occurrences() {
        let err = RecurrenceService::expand(
            &payable(100),
            RepeatRule::Installments(0),
            None,
            &ExpansionPolicy::default(),
        )
        .expect_err("zero installments must be rejected");
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[test]
    fn expand_rejects_receivables_on_credit() {
        let card = Instrument::revolving_credit("Visa", CardTerms::new(5, 15));
        let mut template = payable(100);
        template.direction = Direction::Receivable;
        let err = RecurrenceService::expand(
            &template,
            RepeatRule::Single,
            Some(&card),
            &ExpansionPolicy::default(),
        )
        .expect_err("credit-funded receivable must be rejected");
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[test]
    fn record_persists_every_member() {
        let mut store = MemoryStore::default();
        let created = RecurrenceService::record(
            &mut store,
            &payable(300),
            RepeatRule::Installments(3),
            &ExpansionPolicy::default(),
        )
        .expect("record installments");

        assert_eq!(created.len(), 3);
        let listed = store.list_entries(&EntryFilter::default()).unwrap();
        assert_eq!(listed.len(), 3);
        let total: Decimal = listed.iter().map(|entry| entry.amount).sum();
        assert_eq!(total, Decimal::from(300));
    }

    #[test]
    fn record_fails_for_unknown_instrument() {
        let mut store = MemoryStore::default();
        let template = payable(100).with_instrument(Uuid::new_v4());
        let err = RecurrenceService::record(
            &mut store,
            &template,
            RepeatRule::Single,
            &ExpansionPolicy::default(),
        )
        .expect_err("unknown instrument must fail");
        assert!(matches!(err, EngineError::Store(_)));
    }

    #[test]
    fn record_resolves_wallet_funding() {
        let mut store = MemoryStore::default();
        let wallet = Instrument::wallet("Checking");
        let wallet_id = store.add_instrument(wallet).unwrap();

        let template = payable(50).with_instrument(wallet_id);
        let created = RecurrenceService::record(
            &mut store,
            &template,
            RepeatRule::Single,
            &ExpansionPolicy::default(),
        )
        .expect("record wallet payable");
        assert_eq!(created[0].instrument_id(), Some(wallet_id));
        assert_eq!(created[0].status, EntryStatus::Pending);
    }
}
