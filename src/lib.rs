#![doc(test(attr(deny(warnings))))]

//! GrantDesk Core offers the wizard state machine, domain catalog, and
//! list-projection primitives behind a research-grant batch administration
//! workflow, together with a mock submission backend and an interactive CLI.

pub mod backend;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod errors;
pub mod forms;
pub mod listing;
pub mod notify;
pub mod utils;
pub mod wizard;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("GrantDesk Core tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
    }
}
