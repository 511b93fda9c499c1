#![doc(test(attr(deny(warnings))))]

//! Finance Core manages recurring obligations and billing cycles: entries are
//! expanded up front from recurrence rules, card charges are pinned to
//! statement cycles, and cycles close into consolidated invoice payables.

pub mod config;
pub mod engine;
pub mod errors;
pub mod ledger;
pub mod storage;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Finance Core tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
    }
}
