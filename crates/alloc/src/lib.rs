//! `siteledger-alloc` — financial correlation and allocation engine.
//!
//! Reconciles money across four independent ledgers (estimate line items,
//! vendor quotes, change orders, recorded expenses) to answer how much of
//! the estimated/quoted scope has actually been spent, on what, and whether
//! anything is still unallocated.
//!
//! Pure engine crate: receives pre-fetched ledger rows, returns allocation
//! reports. No CLI or IO dependencies.

pub mod aggregate;
pub mod config;
pub mod derived;
pub mod engine;
pub mod error;
pub mod links;
pub mod model;
pub mod normalize;
pub mod resolve;
pub mod rollup;
pub mod suggest;

pub use config::EngineConfig;
pub use engine::run;
pub use error::AllocError;
pub use model::{AllocationReport, ProjectInput};
pub use suggest::{suggest_allocation, Suggestion};
