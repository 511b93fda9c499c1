use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A funding source for ledger entries: either a plain cash/debit wallet or a
/// revolving-credit card with billing terms.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Instrument {
    pub id: Uuid,
    pub name: String,
    pub kind: InstrumentKind,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum InstrumentKind {
    Wallet,
    RevolvingCredit(CardTerms),
}

/// Billing terms of a revolving-credit card. `closing_day` is the last day a
/// purchase still counts toward the current cycle; `due_day` is the
/// day-of-month the consolidated invoice falls due. Both range 1-31 and clamp
/// to shorter months.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CardTerms {
    pub closing_day: u32,
    pub due_day: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credit_limit: Option<Decimal>,
}

impl Instrument {
    pub fn wallet(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            kind: InstrumentKind::Wallet,
        }
    }

    pub fn revolving_credit(name: impl Into<String>, terms: CardTerms) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            kind: InstrumentKind::RevolvingCredit(terms),
        }
    }

    pub fn card_terms(&self) -> Option<&CardTerms> {
        match &self.kind {
            InstrumentKind::RevolvingCredit(terms) => Some(terms),
            InstrumentKind::Wallet => None,
        }
    }

    pub fn is_revolving_credit(&self) -> bool {
        matches!(self.kind, InstrumentKind::RevolvingCredit(_))
    }
}

impl CardTerms {
    pub fn new(closing_day: u32, due_day: u32) -> Self {
        Self {
            closing_day,
            due_day,
            credit_limit: None,
        }
    }

    pub fn with_credit_limit(mut self, limit: Decimal) -> Self {
        self.credit_limit = Some(limit);
        self
    }

    pub fn day_fields_in_range(&self) -> bool {
        (1..=31).contains(&self.closing_day) && (1..=31).contains(&self.due_day)
    }
}
