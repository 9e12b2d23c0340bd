//! Variance rollups — estimate→quote→actual deltas for margin reporting.
//!
//! Pure arithmetic over category summaries. Zero denominators yield zero
//! percent, never a division fault.

use siteledger_core::money::percent_of;

use crate::model::{CategorySummary, VarianceFigures};

/// Project-level variance figures from the per-category summaries.
pub fn project_variance(categories: &[CategorySummary]) -> VarianceFigures {
    let estimated_total_cents = categories.iter().map(|c| c.estimated_cents).sum();
    let quoted_total_cents = categories.iter().map(|c| c.quoted_cents).sum();
    let actual_total_cents = categories.iter().map(|c| c.actual_cents).sum();

    let estimate_to_quote_cents = quoted_total_cents - estimated_total_cents;
    let quote_to_actual_cents = actual_total_cents - quoted_total_cents;

    VarianceFigures {
        estimated_total_cents,
        quoted_total_cents,
        actual_total_cents,
        estimate_to_quote_cents,
        estimate_to_quote_percent: percent_of(estimate_to_quote_cents, estimated_total_cents),
        quote_to_actual_cents,
        quote_to_actual_percent: percent_of(quote_to_actual_cents, quoted_total_cents),
    }
}
