//! Allocation mutations — the one user-visible, persisted decision surface.
//!
//! Each operation is a single allocation decision applied atomically to the
//! in-memory link collection; the host commits it as a single-row
//! transaction and re-runs the engine to see it reflected. The spend and
//! target sides are enums, so a link with no target, two targets, or both
//! an expense and a split reference cannot be constructed.

use std::collections::HashSet;

use crate::error::AllocError;
use crate::model::{CorrelationLink, CorrelationType, Expense, ExpenseSplit};

/// The transaction paying for the target: a whole expense or one split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpendRef {
    Expense(String),
    Split(String),
}

/// What the money pays for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetRef {
    EstimateLineItem(String),
    ChangeOrderLineItem(String),
    Quote(String),
}

/// A new allocation decision, validated before it becomes a link row.
#[derive(Debug, Clone)]
pub struct NewAllocation {
    pub link_id: String,
    pub spend: SpendRef,
    pub target: TargetRef,
    pub correlation_type: CorrelationType,
    pub auto_correlated: bool,
    pub notes: Option<String>,
}

/// Record one allocation: append the link and mark the underlying expense
/// planned.
pub fn create_allocation(
    links: &mut Vec<CorrelationLink>,
    expenses: &mut [Expense],
    splits: &[ExpenseSplit],
    allocation: NewAllocation,
) -> Result<(), AllocError> {
    validate_new(links, expenses, splits, &allocation, None)?;
    commit_new(links, expenses, splits, allocation);
    Ok(())
}

/// Remove one allocation by link id. The expense is unmarked planned only
/// when no other link still references it, directly or through a split.
pub fn remove_allocation(
    links: &mut Vec<CorrelationLink>,
    expenses: &mut [Expense],
    splits: &[ExpenseSplit],
    link_id: &str,
) -> Result<CorrelationLink, AllocError> {
    let index = links
        .iter()
        .position(|l| l.id == link_id)
        .ok_or_else(|| AllocError::UnknownLink(link_id.to_string()))?;
    let removed = links.remove(index);

    if let Some(expense_id) = link_expense_id(&removed, splits) {
        if !expense_still_referenced(links, splits, &expense_id) {
            set_planned(expenses, &expense_id, false);
        }
    }

    Ok(removed)
}

/// Re-point an allocation: remove the old link and create the new one as a
/// single user action. The new allocation is validated before anything is
/// removed, so a rejected reallocation leaves the collection untouched.
pub fn reallocate(
    links: &mut Vec<CorrelationLink>,
    expenses: &mut [Expense],
    splits: &[ExpenseSplit],
    link_id: &str,
    replacement: NewAllocation,
) -> Result<CorrelationLink, AllocError> {
    if !links.iter().any(|l| l.id == link_id) {
        return Err(AllocError::UnknownLink(link_id.to_string()));
    }
    validate_new(links, expenses, splits, &replacement, Some(link_id))?;

    let removed = remove_allocation(links, expenses, splits, link_id)?;
    commit_new(links, expenses, splits, replacement);
    Ok(removed)
}

fn validate_new(
    links: &[CorrelationLink],
    expenses: &[Expense],
    splits: &[ExpenseSplit],
    allocation: &NewAllocation,
    replacing: Option<&str>,
) -> Result<(), AllocError> {
    let id_taken = links
        .iter()
        .any(|l| l.id == allocation.link_id && Some(l.id.as_str()) != replacing);
    if id_taken {
        return Err(AllocError::LinkValidation(format!(
            "link id '{}' already exists",
            allocation.link_id
        )));
    }

    // The spend side must resolve to a known expense.
    underlying_expense_id(expenses, splits, &allocation.spend)?;
    Ok(())
}

fn commit_new(
    links: &mut Vec<CorrelationLink>,
    expenses: &mut [Expense],
    splits: &[ExpenseSplit],
    allocation: NewAllocation,
) {
    // Validation already ran; a missing expense here cannot happen.
    if let Ok(expense_id) = underlying_expense_id(expenses, splits, &allocation.spend) {
        set_planned(expenses, &expense_id, true);
    }

    let (expense_id, expense_split_id) = match &allocation.spend {
        SpendRef::Expense(id) => (Some(id.clone()), None),
        SpendRef::Split(id) => (None, Some(id.clone())),
    };
    let (estimate_ref, change_order_ref, quote_ref) = match &allocation.target {
        TargetRef::EstimateLineItem(id) => (Some(id.clone()), None, None),
        TargetRef::ChangeOrderLineItem(id) => (None, Some(id.clone()), None),
        TargetRef::Quote(id) => (None, None, Some(id.clone())),
    };

    links.push(CorrelationLink {
        id: allocation.link_id,
        expense_id,
        expense_split_id,
        estimate_line_item_id: estimate_ref,
        change_order_line_item_id: change_order_ref,
        quote_id: quote_ref,
        correlation_type: allocation.correlation_type,
        auto_correlated: allocation.auto_correlated,
        notes: allocation.notes,
    });
}

/// The expense a spend reference ultimately belongs to.
fn underlying_expense_id(
    expenses: &[Expense],
    splits: &[ExpenseSplit],
    spend: &SpendRef,
) -> Result<String, AllocError> {
    match spend {
        SpendRef::Expense(id) => {
            if expenses.iter().any(|e| &e.id == id) {
                Ok(id.clone())
            } else {
                Err(AllocError::UnknownExpense(id.clone()))
            }
        }
        SpendRef::Split(id) => {
            let split = splits
                .iter()
                .find(|s| &s.id == id)
                .ok_or_else(|| AllocError::UnknownSplit(id.clone()))?;
            if expenses.iter().any(|e| e.id == split.expense_id) {
                Ok(split.expense_id.clone())
            } else {
                Err(AllocError::UnknownExpense(split.expense_id.clone()))
            }
        }
    }
}

fn link_expense_id(link: &CorrelationLink, splits: &[ExpenseSplit]) -> Option<String> {
    if let Some(id) = &link.expense_id {
        return Some(id.clone());
    }
    let split_id = link.expense_split_id.as_deref()?;
    splits
        .iter()
        .find(|s| s.id == split_id)
        .map(|s| s.expense_id.clone())
}

fn expense_still_referenced(
    links: &[CorrelationLink],
    splits: &[ExpenseSplit],
    expense_id: &str,
) -> bool {
    let split_ids: HashSet<&str> = splits
        .iter()
        .filter(|s| s.expense_id == expense_id)
        .map(|s| s.id.as_str())
        .collect();

    links.iter().any(|l| {
        l.expense_id.as_deref() == Some(expense_id)
            || l.expense_split_id
                .as_deref()
                .is_some_and(|sid| split_ids.contains(sid))
    })
}

fn set_planned(expenses: &mut [Expense], expense_id: &str, planned: bool) {
    if let Some(expense) = expenses.iter_mut().find(|e| e.id == expense_id) {
        expense.planned = planned;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
