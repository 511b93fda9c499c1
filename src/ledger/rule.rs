use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Standing policy that derives an expense whenever a qualifying income entry
/// is recorded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AutomationRule {
    pub id: Uuid,
    pub name: String,
    pub active: bool,
    pub trigger: RuleTrigger,
    pub formula: RuleFormula,
    pub target_category: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RuleTrigger {
    Income,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum RuleFormula {
    /// Percentage of the triggering income amount, e.g. `Percentage(10)` for 10%.
    Percentage(Decimal),
    FixedAmount(Decimal),
}

impl AutomationRule {
    pub fn new(
        name: impl Into<String>,
        formula: RuleFormula,
        target_category: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            active: true,
            trigger: RuleTrigger::Income,
            formula,
            target_category: target_category.into(),
        }
    }

    /// Amount of the derived expense for a given income amount, rounded to two
    /// decimal places for percentage rules.
    pub fn derived_amount(&self, income_amount: Decimal) -> Decimal {
        match &self.formula {
            RuleFormula::Percentage(percentage) => {
                (income_amount * percentage / Decimal::ONE_HUNDRED).round_dp(2)
            }
            RuleFormula::FixedAmount(amount) => *amount,
        }
    }
}
