//! # sheetsync
//!
//! Batch reconciliation of tabular records against a remote web application.
//! Each input row becomes one form submission; submissions run concurrently on
//! a bounded worker pool and every row gets exactly one outcome written back,
//! in input order, regardless of completion order.
//!
//! ## Usage
//!
//! ```bash
//! sheetsync run price-sheet --input orders.csv --config config.csv [--mapping map.csv]
//! ```
//!
//! ## Modules
//!
//! - `config` - Key/value configuration loading and per-variant validation
//! - `mapping` - External to internal identifier mapping and composite-id formatting
//! - `source` - Record sources and sentinel-terminated reading
//! - `job` - Per-variant request builders
//! - `dispatch` - Network transport and the bounded dispatch pool
//! - `collector` - Outcomes and row-ordered result collection
//! - `writer` - Writing outcomes back next to the input
//! - `engine` - The read, build, dispatch, collect, write pipeline
//! - `variant` - Registry of run variants
pub mod app;
pub mod cli;
pub mod collector;
pub mod config;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod job;
pub mod mapping;
pub mod source;
pub mod variant;
pub mod writer;

pub use error::{Error, RecordError, Result};
