//! Allocation aggregation — derived allocation totals, category summaries,
//! and project-wide coverage.
//!
//! `allocated_cents` is recomputed from scratch on every pass; it is never
//! read back from storage and can never go negative.

use std::collections::{BTreeMap, HashMap, HashSet};

use siteledger_core::money::{percent_of, Cents};

use crate::model::{
    AllocationStatus, AllocationSummary, CategorySummary, ChangeOrderStatus, ItemAllocation,
    LineItem, Quote, QuoteLineItem, QuoteStatus, ResolvedAllocation, SourceType,
};
use crate::normalize::quote_item_cost;

/// Fold resolved allocations into per-item totals. Items without any
/// allocation reset to zero.
pub fn apply_allocations(items: &mut [LineItem], allocations: &[ResolvedAllocation]) {
    let mut totals: BTreeMap<&crate::model::LineItemKey, Cents> = BTreeMap::new();
    for allocation in allocations {
        *totals.entry(&allocation.target).or_insert(0) += allocation.amount_cents;
    }

    for item in items.iter_mut() {
        item.allocated_cents = totals.get(&item.key).copied().unwrap_or(0).max(0);
    }
}

/// Threshold-band status. The threshold is a tolerance band in basis
/// points, not an exact-match requirement: rounding and minor scope
/// changes are expected. Integer math only — no float comparison.
pub fn allocation_status(
    allocated_cents: Cents,
    baseline_cents: Cents,
    threshold_bps: u32,
) -> AllocationStatus {
    if allocated_cents <= 0 {
        return AllocationStatus::None;
    }
    if i128::from(allocated_cents) * 10_000
        >= i128::from(baseline_cents) * i128::from(threshold_bps)
    {
        AllocationStatus::Full
    } else {
        AllocationStatus::Partial
    }
}

/// Per-category rollup. Estimated cost comes from estimate items plus
/// approved change-order items; quoted cost substitutes the accepted-quote
/// price where one covers the item and falls back to the estimate
/// otherwise; actual cost is the sum of allocations across every item in
/// the category.
pub fn summarize_categories(
    items: &[LineItem],
    quotes: &[Quote],
    quote_line_items: &[QuoteLineItem],
) -> Vec<CategorySummary> {
    let accepted_quotes: HashSet<&str> = quotes
        .iter()
        .filter(|q| q.status == QuoteStatus::Accepted)
        .map(|q| q.id.as_str())
        .collect();

    // First accepted quote line item covering a budget item wins — the same
    // first-match heuristic the resolver applies.
    let mut estimate_cover: HashMap<&str, Cents> = HashMap::new();
    let mut change_order_cover: HashMap<&str, Cents> = HashMap::new();
    for row in quote_line_items {
        if !accepted_quotes.contains(row.quote_id.as_str()) {
            continue;
        }
        if let Some(target) = &row.estimate_line_item_id {
            estimate_cover
                .entry(target.as_str())
                .or_insert_with(|| quote_item_cost(row));
        }
        if let Some(target) = &row.change_order_line_item_id {
            change_order_cover
                .entry(target.as_str())
                .or_insert_with(|| quote_item_cost(row));
        }
    }

    #[derive(Default)]
    struct Acc {
        estimated: Cents,
        quoted: Cents,
        actual: Cents,
    }

    let mut by_category: BTreeMap<_, Acc> = BTreeMap::new();
    for item in items {
        let acc = by_category.entry(item.category).or_default();
        acc.actual += item.allocated_cents;

        match item.key.source {
            SourceType::Estimate => {
                acc.estimated += item.baseline_cents;
                acc.quoted += estimate_cover
                    .get(item.key.id.as_str())
                    .copied()
                    .unwrap_or(item.baseline_cents);
            }
            // Only approved change orders enter the budget baseline; spend
            // recorded against the rest still shows up in actual.
            SourceType::ChangeOrder
                if item.change_order_status == Some(ChangeOrderStatus::Approved) =>
            {
                acc.estimated += item.baseline_cents;
                acc.quoted += change_order_cover
                    .get(item.key.id.as_str())
                    .copied()
                    .unwrap_or(item.baseline_cents);
            }
            _ => {}
        }
    }

    by_category
        .into_iter()
        .map(|(category, acc)| {
            let baseline = if acc.quoted > 0 { acc.quoted } else { acc.estimated };
            let variance = acc.actual - baseline;
            CategorySummary {
                category,
                estimated_cents: acc.estimated,
                quoted_cents: acc.quoted,
                actual_cents: acc.actual,
                variance_cents: variance,
                variance_percent: percent_of(variance, baseline),
            }
        })
        .collect()
}

/// Project-wide allocation coverage. Only external budget items are
/// tracked: internal labor/management costs have no vendor-side
/// documentation, and quote-sourced items are candidate shadows that
/// allocations resolve *through*, never *to*.
pub fn summarize_allocation(items: &[LineItem], threshold_bps: u32) -> AllocationSummary {
    let mut rows = Vec::new();
    for item in items {
        if item.key.source == SourceType::Quote || item.category.is_internal() {
            continue;
        }
        let status = allocation_status(item.allocated_cents, item.baseline_cents, threshold_bps);
        rows.push(ItemAllocation {
            key: item.key.clone(),
            description: item.description.clone(),
            category: item.category,
            baseline_cents: item.baseline_cents,
            allocated_cents: item.allocated_cents,
            remaining_cents: (item.baseline_cents - item.allocated_cents).max(0),
            status,
        });
    }

    let allocated = rows.iter().filter(|r| r.status == AllocationStatus::Full).count();
    AllocationSummary {
        external_items: rows.len(),
        allocated,
        pending: rows.len() - allocated,
        items: rows,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
