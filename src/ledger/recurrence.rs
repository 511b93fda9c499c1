use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::cycle::{add_months, CycleKey};
use super::entry::{CardCharge, Direction, EntryStatus, Funding, LedgerEntry, SeriesRef};
use super::instrument::CardTerms;

/// Default number of occurrences materialized up front for an auto-renewing
/// series. A downstream process extends the buffer as entries settle.
pub const DEFAULT_AUTO_RENEW_LOOKAHEAD: u32 = 6;

/// How a template expands into concrete entries.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RepeatRule {
    /// One entry, no series.
    Single,
    /// `count` entries splitting the template total, monthly cadence.
    Installments(u32),
    /// `count` entries each carrying the full template amount, monthly cadence.
    Recurring(u32),
    /// Open-ended monthly series, materialized as a fixed lookahead buffer.
    AutoRenew,
}

impl RepeatRule {
    pub fn occurrence_count(&self, policy: &ExpansionPolicy) -> u32 {
        match self {
            RepeatRule::Single => 1,
            RepeatRule::Installments(count) | RepeatRule::Recurring(count) => *count,
            RepeatRule::AutoRenew => policy.auto_renew_lookahead,
        }
    }

    pub fn wants_series(&self) -> bool {
        !matches!(self, RepeatRule::Single)
    }

    /// Counted modes carry an `(i/count)` suffix; auto-renew stays unsuffixed
    /// because its member count is open-ended.
    pub fn suffixes_description(&self) -> bool {
        matches!(self, RepeatRule::Installments(_) | RepeatRule::Recurring(_))
    }
}

/// Tunable expansion behavior, sourced from configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExpansionPolicy {
    pub auto_renew_lookahead: u32,
}

impl Default for ExpansionPolicy {
    fn default() -> Self {
        Self {
            auto_renew_lookahead: DEFAULT_AUTO_RENEW_LOOKAHEAD,
        }
    }
}

/// Caller-supplied template from which a series is expanded. `base_date` is
/// the first due date, or the purchase date when the entry is card-funded.
#[derive(Debug, Clone)]
pub struct EntryTemplate {
    pub direction: Direction,
    pub description: String,
    pub category: String,
    pub amount: Decimal,
    pub base_date: NaiveDate,
    pub status: EntryStatus,
    pub instrument_id: Option<Uuid>,
}

impl EntryTemplate {
    pub fn new(
        direction: Direction,
        description: impl Into<String>,
        category: impl Into<String>,
        amount: Decimal,
        base_date: NaiveDate,
    ) -> Self {
        Self {
            direction,
            description: description.into(),
            category: category.into(),
            amount,
            base_date,
            status: EntryStatus::Pending,
            instrument_id: None,
        }
    }

    pub fn with_instrument(mut self, instrument_id: Uuid) -> Self {
        self.instrument_id = Some(instrument_id);
        self
    }

    pub fn with_status(mut self, status: EntryStatus) -> Self {
        self.status = status;
        self
    }
}

/// Resolved funding for an expansion, derived from the template's instrument.
#[derive(Debug, Clone)]
pub enum FundingSource {
    None,
    Wallet(Uuid),
    Card {
        instrument_id: Uuid,
        terms: CardTerms,
    },
}

/// Splits `total` into `count` parts of two decimal places whose sum is
/// exactly `total`: every part is the rounded quotient except the last, which
/// absorbs the rounding remainder.
pub fn split_installments(total: Decimal, count: u32) -> Vec<Decimal> {
    if count <= 1 {
        return vec![total];
    }
    let per = (total / Decimal::from(count)).round_dp(2);
    let mut parts = vec![per; count as usize - 1];
    parts.push(total - per * Decimal::from(count - 1));
    parts
}

/// Assembles the drafts for one recurrence request. Inputs are assumed
/// validated; the engine layer checks amounts, counts, and instrument kinds
/// before calling in.
///
/// Card-funded occurrences are re-mapped through the billing-cycle rules
/// using each occurrence's own date as the purchase date, so a run that
/// crosses a closing day lands in distinct cycles. Card charges always start
/// `Pending`; otherwise only the first entry carries the template status.
pub fn build_series(
    template: &EntryTemplate,
    rule: RepeatRule,
    source: FundingSource,
    policy: &ExpansionPolicy,
) -> Vec<LedgerEntry> {
    let count = rule.occurrence_count(policy).max(1);
    let series = rule.wants_series().then(|| SeriesRef {
        id: Uuid::new_v4(),
        auto_renew: matches!(rule, RepeatRule::AutoRenew),
    });
    let amounts = match rule {
        RepeatRule::Installments(_) => split_installments(template.amount, count),
        _ => vec![template.amount; count as usize],
    };

    let mut entries = Vec::with_capacity(count as usize);
    for (index, amount) in amounts.into_iter().enumerate() {
        let occurrence = add_months(template.base_date, index as i32);
        let (due_date, funding) = match &source {
            FundingSource::None => (occurrence, Funding::None),
            FundingSource::Wallet(id) => (occurrence, Funding::Wallet(*id)),
            FundingSource::Card {
                instrument_id,
                terms,
            } => {
                let cycle = CycleKey::for_purchase(occurrence, terms.closing_day);
                let charge = CardCharge {
                    instrument_id: *instrument_id,
                    cycle,
                    billed: false,
                };
                (cycle.due_date(terms.due_day), Funding::Card(charge))
            }
        };

        let on_card = matches!(source, FundingSource::Card { .. });
        let status = if on_card || index > 0 {
            EntryStatus::Pending
        } else {
            template.status
        };
        let description = if rule.suffixes_description() {
            format!("{} ({}/{})", template.description, index + 1, count)
        } else {
            template.description.clone()
        };

        let mut entry = LedgerEntry::new(
            template.direction,
            description,
            template.category.clone(),
            amount,
            due_date,
        );
        entry.status = status;
        if status == EntryStatus::Settled {
            entry.settled_on = Some(template.base_date);
        }
        entry.series = series;
        entry.funding = funding;
        entries.push(entry);
    }

    entries
}
