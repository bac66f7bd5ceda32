//! CLI command implementations

pub mod run;
pub mod variants;

pub use run::run_reconcile;
pub use variants::run_variants;
