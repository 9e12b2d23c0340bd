//! Suggestion scoring — ranks candidate line items for an unallocated
//! expense and picks the best one with a 0–100 confidence value.
//!
//! Ordering is total and deterministic: category-crosswalk matches outrank
//! non-matches, quote-sourced items outrank change-order items outrank
//! estimate items, confidence orders candidates within a band, and
//! description/id break residual ties. Scoring is additive and monotonic —
//! a better match never scores below a worse one.

use serde::Serialize;
use siteledger_core::money::Cents;
use siteledger_core::CostCategory;

use crate::config::SuggestionConfig;
use crate::model::{Expense, LineItem, LineItemKey};

#[derive(Debug, Clone, Serialize)]
pub struct ScoredCandidate {
    pub key: LineItemKey,
    pub description: String,
    pub category_match: bool,
    pub confidence: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub line_item: LineItemKey,
    pub confidence: u8,
}

/// Fixed category crosswalk: which line-item category an expense category
/// counts as a match against. Most categories only match themselves;
/// running costs with no budget line of their own map onto the budget
/// category that absorbs them.
pub fn categories_match(expense: CostCategory, item: CostCategory) -> bool {
    use CostCategory::*;
    expense == item
        || matches!(
            (expense, item),
            (VehicleMaintenance, Equipment) | (Gas, Equipment) | (Tools, Equipment) | (Meals, Other)
        )
}

/// Rank every candidate line item in the expense's project. Highest-ranked
/// first; the ordering bands are strict, confidence only orders within a
/// band.
pub fn rank_candidates(
    expense: &Expense,
    items: &[LineItem],
    config: &SuggestionConfig,
) -> Vec<ScoredCandidate> {
    let mut candidates: Vec<ScoredCandidate> = items
        .iter()
        .filter(|item| item.project_id == expense.project_id)
        .map(|item| score_candidate(expense, item, config))
        .collect();

    let source_rank = |key: &LineItemKey| key.source.suggestion_rank();
    candidates.sort_by(|a, b| {
        b.category_match
            .cmp(&a.category_match)
            .then_with(|| source_rank(&a.key).cmp(&source_rank(&b.key)))
            .then_with(|| b.confidence.cmp(&a.confidence))
            .then_with(|| a.description.cmp(&b.description))
            .then_with(|| a.key.id.cmp(&b.key.id))
    });

    candidates
}

/// Best candidate, or `None` when nothing clears the minimum confidence.
pub fn suggest_allocation(
    expense: &Expense,
    items: &[LineItem],
    config: &SuggestionConfig,
) -> Option<Suggestion> {
    rank_candidates(expense, items, config)
        .into_iter()
        .next()
        .filter(|best| best.confidence >= config.min_confidence)
        .map(|best| Suggestion {
            line_item: best.key,
            confidence: best.confidence,
        })
}

fn score_candidate(
    expense: &Expense,
    item: &LineItem,
    config: &SuggestionConfig,
) -> ScoredCandidate {
    let category_match = categories_match(expense.category, item.category);

    let mut confidence: u32 = 0;
    if category_match {
        confidence += config.category_weight;
    }
    if payee_matches(&expense.payee_name, item.payee_name.as_deref()) {
        confidence += config.payee_weight;
    }
    confidence += amount_proximity_points(
        expense.amount_cents,
        (item.baseline_cents - item.allocated_cents).max(0),
        config.amount_weight,
    );

    ScoredCandidate {
        key: item.key.clone(),
        description: item.description.clone(),
        category_match,
        confidence: confidence.min(100) as u8,
    }
}

/// Case-insensitive substring match in either direction: "Acme" on a quote
/// matches an expense payee of "Acme Supply Co".
fn payee_matches(expense_payee: &str, item_payee: Option<&str>) -> bool {
    let Some(item_payee) = item_payee else {
        return false;
    };
    let a = expense_payee.trim().to_lowercase();
    let b = item_payee.trim().to_lowercase();
    if a.is_empty() || b.is_empty() {
        return false;
    }
    a.contains(&b) || b.contains(&a)
}

/// Linear proximity of the expense amount to the item's remaining
/// (baseline − allocated) balance: full points at an exact fit, zero when
/// either side dwarfs the other.
fn amount_proximity_points(amount: Cents, remaining: Cents, weight: u32) -> u32 {
    let amount = amount.max(0);
    let larger = amount.max(remaining);
    if larger == 0 {
        return 0;
    }
    let gap = (amount - remaining).abs();
    let closeness = 1.0 - gap as f64 / larger as f64;
    (f64::from(weight) * closeness).round() as u32
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
