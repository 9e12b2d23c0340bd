//! Derived dataset builders — computed analyses layered on top of a report.

use serde_json::json;

use crate::model::{AllocationReport, AllocationStatus, DerivedDataset, ResolutionWarning};

/// Build the `needs_attention.v1` derived dataset.
///
/// One row per external line item that is not fully allocated, plus one row
/// per resolution warning. An empty dataset means the project is clean.
pub fn build_needs_attention(report: &AllocationReport) -> DerivedDataset {
    let mut dataset = DerivedDataset::new("needs_attention");

    for item in &report.allocation.items {
        if item.status == AllocationStatus::Full {
            continue;
        }
        dataset.rows.push(json!({
            "kind": "pending_item",
            "line_item": item.key.to_string(),
            "description": item.description,
            "category": item.category.to_string(),
            "baseline_cents": item.baseline_cents,
            "allocated_cents": item.allocated_cents,
            "remaining_cents": item.remaining_cents,
            "status": item.status.to_string(),
        }));
    }

    for warning in &report.warnings {
        let mut row = json!({
            "kind": "warning",
            "link_id": warning_link_id(warning),
            "detail": warning.to_string(),
        });
        if let ResolutionWarning::AmbiguousQuote { quote_id, candidates, .. } = warning {
            row["quote_id"] = json!(quote_id);
            row["candidates"] = json!(candidates);
        }
        dataset.rows.push(row);
    }

    dataset.enforce_limit();
    dataset
}

fn warning_link_id(warning: &ResolutionWarning) -> &str {
    match warning {
        ResolutionWarning::OrphanedReference { link_id, .. }
        | ResolutionWarning::AmbiguousQuote { link_id, .. }
        | ResolutionWarning::SplitShadowsParent { link_id, .. } => link_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use siteledger_core::CostCategory;

    use crate::model::{
        AllocationSummary, ItemAllocation, LineItemKey, ReportMeta, VarianceFigures,
    };

    fn item(id: &str, baseline: i64, allocated: i64, status: AllocationStatus) -> ItemAllocation {
        ItemAllocation {
            key: LineItemKey::estimate(id),
            description: format!("item {id}"),
            category: CostCategory::Materials,
            baseline_cents: baseline,
            allocated_cents: allocated,
            remaining_cents: baseline - allocated,
            status,
        }
    }

    fn report(items: Vec<ItemAllocation>, warnings: Vec<ResolutionWarning>) -> AllocationReport {
        let pending = items
            .iter()
            .filter(|i| i.status != AllocationStatus::Full)
            .count();
        AllocationReport {
            meta: ReportMeta {
                project_id: "proj_1".into(),
                engine_version: "0.0.0".into(),
                run_at: "2026-03-14T00:00:00Z".into(),
            },
            line_items: Vec::new(),
            categories: Vec::new(),
            allocation: AllocationSummary {
                external_items: items.len(),
                allocated: items.len() - pending,
                pending,
                items,
            },
            variance: VarianceFigures {
                estimated_total_cents: 0,
                quoted_total_cents: 0,
                actual_total_cents: 0,
                estimate_to_quote_cents: 0,
                estimate_to_quote_percent: 0.0,
                quote_to_actual_cents: 0,
                quote_to_actual_percent: 0.0,
            },
            warnings,
        }
    }

    #[test]
    fn clean_project_yields_empty_dataset() {
        let r = report(vec![item("eli_1", 50000, 48000, AllocationStatus::Full)], vec![]);
        let ds = build_needs_attention(&r);
        assert!(ds.is_empty());
        assert_eq!(ds.schema, "needs_attention");
        assert_eq!(ds.version, 1);
        assert!(!ds.truncated);
    }

    #[test]
    fn pending_items_become_rows() {
        let r = report(
            vec![
                item("eli_1", 50000, 48000, AllocationStatus::Full),
                item("eli_2", 50000, 20000, AllocationStatus::Partial),
                item("eli_3", 50000, 0, AllocationStatus::None),
            ],
            vec![],
        );
        let ds = build_needs_attention(&r);
        assert_eq!(ds.rows.len(), 2);

        let row = &ds.rows[0];
        assert_eq!(row["kind"], "pending_item");
        assert_eq!(row["line_item"], "estimate:eli_2");
        assert_eq!(row["remaining_cents"], 30000);
        assert_eq!(row["status"], "partial");
        assert_eq!(ds.rows[1]["status"], "none");
    }

    #[test]
    fn warnings_become_rows() {
        let r = report(
            vec![],
            vec![
                ResolutionWarning::OrphanedReference {
                    link_id: "cl_1".into(),
                    detail: "estimate line item 'eli_gone' not found".into(),
                },
                ResolutionWarning::AmbiguousQuote {
                    link_id: "cl_2".into(),
                    quote_id: "q_1".into(),
                    candidates: 3,
                },
            ],
        );
        let ds = build_needs_attention(&r);
        assert_eq!(ds.rows.len(), 2);
        assert_eq!(ds.rows[0]["kind"], "warning");
        assert_eq!(ds.rows[0]["link_id"], "cl_1");
        assert_eq!(ds.rows[1]["quote_id"], "q_1");
        assert_eq!(ds.rows[1]["candidates"], 3);
    }

    #[test]
    fn truncates_at_max_rows() {
        let items: Vec<ItemAllocation> = (0..DerivedDataset::MAX_ROWS + 100)
            .map(|i| item(&format!("eli_{i}"), 1000, 0, AllocationStatus::None))
            .collect();
        let ds = build_needs_attention(&report(items, vec![]));
        assert_eq!(ds.rows.len(), DerivedDataset::MAX_ROWS);
        assert!(ds.truncated);
    }
}
