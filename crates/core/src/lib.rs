//! `siteledger-core` — shared primitives for the siteledger workspace.
//!
//! Money is integer minor units end to end; fractional arithmetic happens
//! once, at the ingress boundary, and rounds to cents there.

pub mod category;
pub mod money;

pub use category::CostCategory;
pub use money::Cents;
