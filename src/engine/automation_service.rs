//! Rule-driven expenses derived from recorded income.

use rust_decimal::Decimal;

use crate::ledger::{Direction, Funding, LedgerEntry, RuleTrigger};
use crate::storage::FinanceStore;

/// Runs automation rules against newly recorded income entries.
pub struct AutomationService;

impl AutomationService {
    /// Derives one expense per active income rule and returns how many were
    /// created. The income entry is already committed when rules run, so
    /// failures here are logged and swallowed rather than propagated.
    pub fn on_income_recorded(store: &mut dyn FinanceStore, income: &LedgerEntry) -> usize {
        if income.direction != Direction::Receivable {
            return 0;
        }
        let rules = match store.list_rules(true) {
            Ok(rules) => rules,
            Err(error) => {
                tracing::warn!("automation skipped, rules unavailable: {}", error);
                return 0;
            }
        };

        let mut created = 0;
        for rule in rules.iter().filter(|rule| rule.trigger == RuleTrigger::Income) {
            let amount = rule.derived_amount(income.amount);
            if amount <= Decimal::ZERO {
                tracing::warn!(
                    rule = %rule.name,
                    "rule produced a non-positive amount, skipped"
                );
                continue;
            }

            let mut draft = LedgerEntry::new(
                Direction::Payable,
                format!("[Auto] {} - {}", rule.name, income.description),
                rule.target_category.clone(),
                amount,
                income.due_date,
            );
            if let Funding::Wallet(wallet) = &income.funding {
                draft.funding = Funding::Wallet(*wallet);
            }

            match store.create_entry(draft) {
                Ok(_) => created += 1,
                Err(error) => {
                    tracing::warn!(
                        rule = %rule.name,
                        "derived expense could not be stored: {}",
                        error
                    );
                }
            }
        }
        created
    }
}
