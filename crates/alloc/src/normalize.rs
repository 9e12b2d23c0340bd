//! Entity normalization — the single ingress boundary.
//!
//! All three scope ledgers flatten into one `LineItem` shape here; nothing
//! downstream needs to know which ledger a record came from. Missing or
//! partially-null monetary fields degrade through a fallback chain to a
//! zero baseline, never an error, and zero-baseline items are kept — they
//! still represent unbilled scope.

use std::collections::HashMap;

use siteledger_core::money::{baseline_from_unit_cost, Cents};

use crate::model::{
    ChangeOrderLineItem, EstimateLineItem, LineItem, LineItemKey, ProjectInput, QuoteLineItem,
};

/// Flatten one project's estimate, quote, and change-order line items into
/// normalized `LineItem`s. Pure transform; output order is estimates, then
/// quotes, then change orders, each in input order.
pub fn normalize(input: &ProjectInput) -> Vec<LineItem> {
    let quotes_by_id: HashMap<&str, &crate::model::Quote> =
        input.quotes.iter().map(|q| (q.id.as_str(), q)).collect();
    let change_orders_by_id: HashMap<&str, &crate::model::ChangeOrder> = input
        .change_orders
        .iter()
        .map(|co| (co.id.as_str(), co))
        .collect();

    let mut items = Vec::with_capacity(
        input.estimate_line_items.len()
            + input.quote_line_items.len()
            + input.change_order_line_items.len(),
    );

    for row in &input.estimate_line_items {
        items.push(LineItem {
            key: LineItemKey::estimate(&row.id),
            source_id: row.estimate_id.clone(),
            project_id: input.project_id.clone(),
            category: row.category,
            description: row.description.clone(),
            baseline_cents: estimate_item_cost(row),
            allocated_cents: 0,
            payee_name: None,
            change_order_number: None,
            change_order_status: None,
        });
    }

    for row in &input.quote_line_items {
        let parent = quotes_by_id.get(row.quote_id.as_str());
        items.push(LineItem {
            key: LineItemKey::quote(&row.id),
            source_id: row.quote_id.clone(),
            project_id: input.project_id.clone(),
            category: row.category,
            description: row.description.clone(),
            baseline_cents: quote_item_cost(row),
            allocated_cents: 0,
            payee_name: parent.map(|q| q.payee_name.clone()),
            change_order_number: None,
            change_order_status: None,
        });
    }

    for row in &input.change_order_line_items {
        let parent = change_orders_by_id.get(row.change_order_id.as_str());
        items.push(LineItem {
            key: LineItemKey::change_order(&row.id),
            source_id: row.change_order_id.clone(),
            project_id: input.project_id.clone(),
            category: row.category,
            description: row.description.clone(),
            baseline_cents: change_order_item_cost(row),
            allocated_cents: 0,
            payee_name: None,
            change_order_number: parent.map(|co| co.number.clone()),
            change_order_status: parent.map(|co| co.status),
        });
    }

    items
}

/// Estimate baseline: `quantity × cost_per_unit`, falling back to the
/// stored total when the product is zero or either factor is missing.
pub fn estimate_item_cost(row: &EstimateLineItem) -> Cents {
    unit_math_or_total(row.quantity, row.cost_per_unit_cents, row.total_cents)
}

/// Quote line-item cost: prefer `cost_per_unit × quantity`, fall back to
/// the stored total.
pub fn quote_item_cost(row: &QuoteLineItem) -> Cents {
    unit_math_or_total(row.quantity, row.cost_per_unit_cents, row.total_cents)
}

/// Change-order cost: the stored total is authoritative.
pub fn change_order_item_cost(row: &ChangeOrderLineItem) -> Cents {
    row.total_cents.unwrap_or(0)
}

fn unit_math_or_total(
    quantity: Option<f64>,
    cost_per_unit_cents: Option<Cents>,
    total_cents: Option<Cents>,
) -> Cents {
    if let (Some(quantity), Some(unit)) = (quantity, cost_per_unit_cents) {
        let product = baseline_from_unit_cost(quantity, unit);
        if product != 0 {
            return product;
        }
    }
    total_cents.unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use siteledger_core::CostCategory;

    use crate::model::{ChangeOrder, ChangeOrderStatus, Quote, QuoteStatus, SourceType};

    fn estimate_row(
        id: &str,
        quantity: Option<f64>,
        unit: Option<Cents>,
        total: Option<Cents>,
    ) -> EstimateLineItem {
        EstimateLineItem {
            id: id.into(),
            estimate_id: "est_1".into(),
            category: CostCategory::Materials,
            description: format!("item {id}"),
            quantity,
            cost_per_unit_cents: unit,
            total_cents: total,
        }
    }

    fn base_input() -> ProjectInput {
        ProjectInput {
            project_id: "proj_1".into(),
            ..ProjectInput::default()
        }
    }

    #[test]
    fn estimate_prefers_unit_math() {
        let row = estimate_row("eli_1", Some(10.0), Some(5000), Some(1));
        assert_eq!(estimate_item_cost(&row), 50000);
    }

    #[test]
    fn estimate_falls_back_to_total() {
        // product unavailable
        let row = estimate_row("eli_1", None, Some(5000), Some(42000));
        assert_eq!(estimate_item_cost(&row), 42000);
        // product zero
        let row = estimate_row("eli_1", Some(0.0), Some(5000), Some(42000));
        assert_eq!(estimate_item_cost(&row), 42000);
    }

    #[test]
    fn exhausted_fallbacks_yield_zero_not_error() {
        let row = estimate_row("eli_1", None, None, None);
        assert_eq!(estimate_item_cost(&row), 0);
    }

    #[test]
    fn zero_baseline_items_are_kept() {
        let mut input = base_input();
        input.estimate_line_items.push(estimate_row("eli_1", None, None, None));
        let items = normalize(&input);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].baseline_cents, 0);
        assert_eq!(items[0].allocated_cents, 0);
    }

    #[test]
    fn quote_items_carry_parent_payee() {
        let mut input = base_input();
        input.quotes.push(Quote {
            id: "q_1".into(),
            project_id: "proj_1".into(),
            status: QuoteStatus::Accepted,
            payee_name: "Acme Supply".into(),
        });
        input.quote_line_items.push(QuoteLineItem {
            id: "qli_1".into(),
            quote_id: "q_1".into(),
            estimate_line_item_id: Some("eli_1".into()),
            change_order_line_item_id: None,
            category: CostCategory::Materials,
            description: "lumber package".into(),
            quantity: None,
            cost_per_unit_cents: None,
            total_cents: Some(48000),
        });

        let items = normalize(&input);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].key.source, SourceType::Quote);
        assert_eq!(items[0].baseline_cents, 48000);
        assert_eq!(items[0].payee_name.as_deref(), Some("Acme Supply"));
    }

    #[test]
    fn quote_item_with_missing_parent_keeps_no_payee() {
        let mut input = base_input();
        input.quote_line_items.push(QuoteLineItem {
            id: "qli_1".into(),
            quote_id: "q_missing".into(),
            estimate_line_item_id: None,
            change_order_line_item_id: None,
            category: CostCategory::Equipment,
            description: "lift rental".into(),
            quantity: Some(3.0),
            cost_per_unit_cents: Some(20000),
            total_cents: None,
        });

        let items = normalize(&input);
        assert_eq!(items[0].baseline_cents, 60000);
        assert!(items[0].payee_name.is_none());
    }

    #[test]
    fn change_order_items_carry_number_and_status() {
        let mut input = base_input();
        input.change_orders.push(ChangeOrder {
            id: "co_1".into(),
            project_id: "proj_1".into(),
            number: "CO-004".into(),
            status: ChangeOrderStatus::Approved,
        });
        input.change_order_line_items.push(ChangeOrderLineItem {
            id: "coli_1".into(),
            change_order_id: "co_1".into(),
            category: CostCategory::Subcontractor,
            description: "added footing".into(),
            total_cents: Some(150000),
        });

        let items = normalize(&input);
        assert_eq!(items[0].key, LineItemKey::change_order("coli_1"));
        assert_eq!(items[0].baseline_cents, 150000);
        assert_eq!(items[0].change_order_number.as_deref(), Some("CO-004"));
        assert_eq!(items[0].change_order_status, Some(ChangeOrderStatus::Approved));
    }

    #[test]
    fn id_collisions_across_ledgers_stay_distinct() {
        let mut input = base_input();
        input.estimate_line_items.push(estimate_row("li_1", None, None, Some(100)));
        input.change_order_line_items.push(ChangeOrderLineItem {
            id: "li_1".into(),
            change_order_id: "co_1".into(),
            category: CostCategory::Materials,
            description: "same id, different ledger".into(),
            total_cents: Some(200),
        });

        let items = normalize(&input);
        assert_eq!(items.len(), 2);
        assert_ne!(items[0].key, items[1].key);
    }
}
