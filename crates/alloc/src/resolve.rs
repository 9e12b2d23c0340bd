//! Correlation resolution — turns raw expense↔target links into
//! deduplicated `ResolvedAllocation`s.
//!
//! Links can point at an estimate line item, a change-order line item, or a
//! whole quote; quote links resolve through the quote's own line items to
//! the budget-side items they reference. Every dollar attributed to a line
//! item corresponds to exactly one expense or one split and is counted
//! exactly once across the whole pass, keyed by the underlying spend source
//! rather than the link row.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use siteledger_core::Cents;

use crate::model::{
    CorrelationLink, Expense, ExpenseSplit, LineItem, LineItemKey, QuoteLineItem,
    ResolutionOutput, ResolutionWarning, ResolvedAllocation, SourceType, SpendSource,
};

// ---------------------------------------------------------------------------
// Quote target index
// ---------------------------------------------------------------------------

/// Budget-side targets a quote's line items reference, per chain, in input
/// order with duplicates removed. The two chains are independent: a single
/// quote line item may carry both an estimate and a change-order reference.
#[derive(Debug, Clone, Default)]
pub struct QuoteTargets {
    pub estimate_candidates: Vec<String>,
    pub change_order_candidates: Vec<String>,
}

#[derive(Debug, Default)]
pub struct QuoteTargetIndex {
    by_quote: BTreeMap<String, QuoteTargets>,
}

impl QuoteTargetIndex {
    pub fn get(&self, quote_id: &str) -> Option<&QuoteTargets> {
        self.by_quote.get(quote_id)
    }
}

pub fn build_quote_index(quote_line_items: &[QuoteLineItem]) -> QuoteTargetIndex {
    let mut index = QuoteTargetIndex::default();
    for row in quote_line_items {
        let targets = index.by_quote.entry(row.quote_id.clone()).or_default();
        if let Some(id) = &row.estimate_line_item_id {
            if !targets.estimate_candidates.contains(id) {
                targets.estimate_candidates.push(id.clone());
            }
        }
        if let Some(id) = &row.change_order_line_item_id {
            if !targets.change_order_candidates.contains(id) {
                targets.change_order_candidates.push(id.clone());
            }
        }
    }
    index
}

// ---------------------------------------------------------------------------
// Resolution pass
// ---------------------------------------------------------------------------

/// Resolve all links against the normalized item set. Orphaned references
/// drop the link with a warning; the pass never aborts. Repeated
/// `(target, spend)` pairs are no-ops.
pub fn resolve(
    links: &[CorrelationLink],
    items: &[LineItem],
    expenses: &[Expense],
    splits: &[ExpenseSplit],
    quote_index: &QuoteTargetIndex,
) -> ResolutionOutput {
    // Allocations only ever land on budget-side items; quote-sourced items
    // are resolved *through*, never *to*.
    let known_targets: HashSet<&LineItemKey> = items
        .iter()
        .filter(|i| i.key.source != SourceType::Quote)
        .map(|i| &i.key)
        .collect();
    let expense_amounts: HashMap<&str, Cents> = expenses
        .iter()
        .map(|e| (e.id.as_str(), e.amount_cents))
        .collect();
    let split_rows: HashMap<&str, &ExpenseSplit> =
        splits.iter().map(|s| (s.id.as_str(), s)).collect();
    let split_expense_ids: HashSet<&str> =
        splits.iter().map(|s| s.expense_id.as_str()).collect();

    let mut seen: BTreeSet<(LineItemKey, SpendSource)> = BTreeSet::new();
    let mut out = ResolutionOutput::default();

    for link in links {
        let Some((spend, amount_cents)) = resolve_spend(
            link,
            &expense_amounts,
            &split_rows,
            &split_expense_ids,
            &mut out.warnings,
        ) else {
            continue;
        };

        let targets = resolve_targets(link, quote_index, &mut out.warnings);
        for target in targets {
            if !known_targets.contains(&target) {
                out.warnings.push(ResolutionWarning::OrphanedReference {
                    link_id: link.id.clone(),
                    detail: format!("target line item '{target}' not found"),
                });
                continue;
            }
            if seen.insert((target.clone(), spend.clone())) {
                out.allocations.push(ResolvedAllocation {
                    target,
                    spend: spend.clone(),
                    amount_cents,
                    link_id: link.id.clone(),
                });
            }
        }
    }

    out
}

/// The dollar side of a link: the split's amount when the link references a
/// split, the expense's full amount otherwise — never both for the same
/// underlying transaction. Parent-level links on split expenses are
/// shadowed by the splits.
fn resolve_spend(
    link: &CorrelationLink,
    expense_amounts: &HashMap<&str, Cents>,
    split_rows: &HashMap<&str, &ExpenseSplit>,
    split_expense_ids: &HashSet<&str>,
    warnings: &mut Vec<ResolutionWarning>,
) -> Option<(SpendSource, Cents)> {
    if let Some(split_id) = &link.expense_split_id {
        return match split_rows.get(split_id.as_str()) {
            Some(split) => Some((SpendSource::Split(split_id.clone()), split.split_amount_cents)),
            None => {
                warnings.push(ResolutionWarning::OrphanedReference {
                    link_id: link.id.clone(),
                    detail: format!("expense split '{split_id}' not found"),
                });
                None
            }
        };
    }

    if let Some(expense_id) = &link.expense_id {
        let Some(amount) = expense_amounts.get(expense_id.as_str()) else {
            warnings.push(ResolutionWarning::OrphanedReference {
                link_id: link.id.clone(),
                detail: format!("expense '{expense_id}' not found"),
            });
            return None;
        };
        if split_expense_ids.contains(expense_id.as_str()) {
            warnings.push(ResolutionWarning::SplitShadowsParent {
                link_id: link.id.clone(),
                expense_id: expense_id.clone(),
            });
            return None;
        }
        return Some((SpendSource::Expense(expense_id.clone()), *amount));
    }

    warnings.push(ResolutionWarning::OrphanedReference {
        link_id: link.id.clone(),
        detail: "link references neither an expense nor a split".into(),
    });
    None
}

/// The target side of a link. Direct estimate/change-order references win
/// over a quote reference; quote references resolve through the index with
/// the documented first-match heuristic per chain.
fn resolve_targets(
    link: &CorrelationLink,
    quote_index: &QuoteTargetIndex,
    warnings: &mut Vec<ResolutionWarning>,
) -> Vec<LineItemKey> {
    if let Some(id) = &link.estimate_line_item_id {
        return vec![LineItemKey::estimate(id.clone())];
    }
    if let Some(id) = &link.change_order_line_item_id {
        return vec![LineItemKey::change_order(id.clone())];
    }

    if let Some(quote_id) = &link.quote_id {
        let Some(candidates) = quote_index.get(quote_id) else {
            warnings.push(ResolutionWarning::OrphanedReference {
                link_id: link.id.clone(),
                detail: format!("quote '{quote_id}' has no line items"),
            });
            return Vec::new();
        };

        // First-match heuristic: a quote fanning out to several budget items
        // cannot be split without a product decision, so take the first and
        // say so. Each chain resolves independently.
        if candidates.estimate_candidates.len() > 1 {
            warnings.push(ResolutionWarning::AmbiguousQuote {
                link_id: link.id.clone(),
                quote_id: quote_id.clone(),
                candidates: candidates.estimate_candidates.len(),
            });
        }
        if candidates.change_order_candidates.len() > 1 {
            warnings.push(ResolutionWarning::AmbiguousQuote {
                link_id: link.id.clone(),
                quote_id: quote_id.clone(),
                candidates: candidates.change_order_candidates.len(),
            });
        }

        let mut targets = Vec::new();
        if let Some(first) = candidates.estimate_candidates.first() {
            targets.push(LineItemKey::estimate(first.clone()));
        }
        if let Some(first) = candidates.change_order_candidates.first() {
            targets.push(LineItemKey::change_order(first.clone()));
        }
        if targets.is_empty() {
            warnings.push(ResolutionWarning::OrphanedReference {
                link_id: link.id.clone(),
                detail: format!("quote '{quote_id}' line items reference no budget items"),
            });
        }
        return targets;
    }

    warnings.push(ResolutionWarning::OrphanedReference {
        link_id: link.id.clone(),
        detail: "link has no target reference".into(),
    });
    Vec::new()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
