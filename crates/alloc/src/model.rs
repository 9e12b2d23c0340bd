use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use siteledger_core::{Cents, CostCategory};

// ---------------------------------------------------------------------------
// Input — raw ledger rows, as fetched by the host for one project
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimateLineItem {
    pub id: String,
    pub estimate_id: String,
    pub category: CostCategory,
    pub description: String,
    #[serde(default)]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub cost_per_unit_cents: Option<Cents>,
    #[serde(default)]
    pub total_cents: Option<Cents>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    pub id: String,
    pub project_id: String,
    pub status: QuoteStatus,
    pub payee_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStatus {
    Draft,
    Sent,
    Accepted,
    Declined,
}

/// A quote line item may reference the estimate or change-order line item it
/// prices. Both references are optional and independent; a quote can also
/// price scope with no budget-side counterpart at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteLineItem {
    pub id: String,
    pub quote_id: String,
    #[serde(default)]
    pub estimate_line_item_id: Option<String>,
    #[serde(default)]
    pub change_order_line_item_id: Option<String>,
    pub category: CostCategory,
    pub description: String,
    #[serde(default)]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub cost_per_unit_cents: Option<Cents>,
    #[serde(default)]
    pub total_cents: Option<Cents>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeOrder {
    pub id: String,
    pub project_id: String,
    pub number: String,
    pub status: ChangeOrderStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeOrderStatus {
    Draft,
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeOrderLineItem {
    pub id: String,
    pub change_order_id: String,
    pub category: CostCategory,
    pub description: String,
    #[serde(default)]
    pub total_cents: Option<Cents>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    pub id: String,
    pub project_id: String,
    pub amount_cents: Cents,
    pub category: CostCategory,
    pub payee_name: String,
    pub expense_date: NaiveDate,
    pub description: String,
    /// Set when the expense has been allocated to a line item.
    #[serde(default)]
    pub planned: bool,
}

/// A division of one expense's amount across projects or targets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseSplit {
    pub id: String,
    pub expense_id: String,
    pub project_id: String,
    pub split_amount_cents: Cents,
}

/// The persisted allocation decision: one expense (or one split of it)
/// pays for one target. Exactly one of the three target fields is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationLink {
    pub id: String,
    #[serde(default)]
    pub expense_id: Option<String>,
    #[serde(default)]
    pub expense_split_id: Option<String>,
    #[serde(default)]
    pub estimate_line_item_id: Option<String>,
    #[serde(default)]
    pub change_order_line_item_id: Option<String>,
    #[serde(default)]
    pub quote_id: Option<String>,
    #[serde(default)]
    pub correlation_type: CorrelationType,
    #[serde(default)]
    pub auto_correlated: bool,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationType {
    #[default]
    Manual,
    Suggested,
}

/// Everything the engine needs for one project, fetched up front.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectInput {
    pub project_id: String,
    #[serde(default)]
    pub estimate_line_items: Vec<EstimateLineItem>,
    #[serde(default)]
    pub quotes: Vec<Quote>,
    #[serde(default)]
    pub quote_line_items: Vec<QuoteLineItem>,
    #[serde(default)]
    pub change_orders: Vec<ChangeOrder>,
    #[serde(default)]
    pub change_order_line_items: Vec<ChangeOrderLineItem>,
    #[serde(default)]
    pub expenses: Vec<Expense>,
    #[serde(default)]
    pub expense_splits: Vec<ExpenseSplit>,
    #[serde(default)]
    pub links: Vec<CorrelationLink>,
}

// ---------------------------------------------------------------------------
// Normalized line items
// ---------------------------------------------------------------------------

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    Estimate,
    Quote,
    ChangeOrder,
}

impl SourceType {
    /// Suggestion precedence: quotes are the most concrete commitment,
    /// change orders next, estimates last.
    pub fn suggestion_rank(self) -> u8 {
        match self {
            Self::Quote => 0,
            Self::ChangeOrder => 1,
            Self::Estimate => 2,
        }
    }
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Estimate => write!(f, "estimate"),
            Self::Quote => write!(f, "quote"),
            Self::ChangeOrder => write!(f, "change_order"),
        }
    }
}

/// Line item ids are only unique within their source ledger, so every
/// normalized item is keyed by (source, id).
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct LineItemKey {
    pub source: SourceType,
    pub id: String,
}

impl LineItemKey {
    pub fn estimate(id: impl Into<String>) -> Self {
        Self { source: SourceType::Estimate, id: id.into() }
    }

    pub fn quote(id: impl Into<String>) -> Self {
        Self { source: SourceType::Quote, id: id.into() }
    }

    pub fn change_order(id: impl Into<String>) -> Self {
        Self { source: SourceType::ChangeOrder, id: id.into() }
    }
}

impl std::fmt::Display for LineItemKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.source, self.id)
    }
}

/// One priced scope entry, flattened from whichever ledger it came from.
/// `allocated_cents` is derived — recomputed from scratch on every
/// aggregation pass, never read back from storage.
#[derive(Debug, Clone, Serialize)]
pub struct LineItem {
    pub key: LineItemKey,
    /// Parent estimate / quote / change-order id.
    pub source_id: String,
    pub project_id: String,
    pub category: CostCategory,
    pub description: String,
    pub baseline_cents: Cents,
    pub allocated_cents: Cents,
    pub payee_name: Option<String>,
    pub change_order_number: Option<String>,
    pub change_order_status: Option<ChangeOrderStatus>,
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// The underlying transaction a resolved dollar amount came from. An
/// expense and its splits are different spend sources, but the resolver
/// guarantees at most one level is ever counted per expense.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SpendSource {
    Expense(String),
    Split(String),
}

impl SpendSource {
    pub fn id(&self) -> &str {
        match self {
            Self::Expense(id) | Self::Split(id) => id,
        }
    }
}

/// One correlation link resolved to a concrete target and dollar amount.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedAllocation {
    pub target: LineItemKey,
    pub spend: SpendSource,
    pub amount_cents: Cents,
    pub link_id: String,
}

/// Recoverable data conditions found during resolution. The pass never
/// aborts on these; the host decides whether to log or surface them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolutionWarning {
    /// The link points at something that no longer exists.
    OrphanedReference { link_id: String, detail: String },
    /// A quote fans out to multiple candidate targets; the first was taken.
    AmbiguousQuote { link_id: String, quote_id: String, candidates: usize },
    /// The expense has splits, so a parent-level link is not counted.
    SplitShadowsParent { link_id: String, expense_id: String },
}

impl std::fmt::Display for ResolutionWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OrphanedReference { link_id, detail } => {
                write!(f, "link '{link_id}' skipped: {detail}")
            }
            Self::AmbiguousQuote { link_id, quote_id, candidates } => {
                write!(
                    f,
                    "link '{link_id}': quote '{quote_id}' has {candidates} candidate targets, took the first"
                )
            }
            Self::SplitShadowsParent { link_id, expense_id } => {
                write!(
                    f,
                    "link '{link_id}': expense '{expense_id}' is split, parent amount not counted"
                )
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct ResolutionOutput {
    pub allocations: Vec<ResolvedAllocation>,
    pub warnings: Vec<ResolutionWarning>,
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationStatus {
    None,
    Partial,
    Full,
}

impl std::fmt::Display for AllocationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Partial => write!(f, "partial"),
            Self::Full => write!(f, "full"),
        }
    }
}

/// Per-category rollup within one project.
#[derive(Debug, Clone, Serialize)]
pub struct CategorySummary {
    pub category: CostCategory,
    pub estimated_cents: Cents,
    /// Accepted-quote cost where one exists, estimated cost otherwise.
    pub quoted_cents: Cents,
    pub actual_cents: Cents,
    /// `actual − baseline`, baseline = quoted when non-zero, else estimated.
    pub variance_cents: Cents,
    pub variance_percent: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ItemAllocation {
    pub key: LineItemKey,
    pub description: String,
    pub category: CostCategory,
    pub baseline_cents: Cents,
    pub allocated_cents: Cents,
    pub remaining_cents: Cents,
    pub status: AllocationStatus,
}

/// Project-wide allocation coverage over external line items.
#[derive(Debug, Clone, Serialize)]
pub struct AllocationSummary {
    pub external_items: usize,
    pub allocated: usize,
    pub pending: usize,
    pub items: Vec<ItemAllocation>,
}

// ---------------------------------------------------------------------------
// Variance + Report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct VarianceFigures {
    pub estimated_total_cents: Cents,
    pub quoted_total_cents: Cents,
    pub actual_total_cents: Cents,
    pub estimate_to_quote_cents: Cents,
    pub estimate_to_quote_percent: f64,
    pub quote_to_actual_cents: Cents,
    pub quote_to_actual_percent: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportMeta {
    pub project_id: String,
    pub engine_version: String,
    pub run_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AllocationReport {
    pub meta: ReportMeta,
    pub line_items: Vec<LineItem>,
    pub categories: Vec<CategorySummary>,
    pub allocation: AllocationSummary,
    pub variance: VarianceFigures,
    pub warnings: Vec<ResolutionWarning>,
}

// ---------------------------------------------------------------------------
// Derived datasets
// ---------------------------------------------------------------------------

/// A computed dataset layered on top of a report, shipped to dashboards
/// as schema-versioned JSON rows.
#[derive(Debug, Clone, Serialize)]
pub struct DerivedDataset {
    pub schema: String,
    pub version: u32,
    pub rows: Vec<Value>,
    pub truncated: bool,
}

impl DerivedDataset {
    pub const MAX_ROWS: usize = 5000;

    pub fn new(schema: &str) -> Self {
        Self {
            schema: schema.to_string(),
            version: 1,
            rows: Vec::new(),
            truncated: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn enforce_limit(&mut self) {
        if self.rows.len() > Self::MAX_ROWS {
            self.rows.truncate(Self::MAX_ROWS);
            self.truncated = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_item_key_display() {
        assert_eq!(LineItemKey::estimate("eli_1").to_string(), "estimate:eli_1");
        assert_eq!(
            LineItemKey::change_order("coli_2").to_string(),
            "change_order:coli_2"
        );
        assert_eq!(LineItemKey::quote("q_3").to_string(), "quote:q_3");
    }

    #[test]
    fn spend_sources_never_collide_across_kinds() {
        // An expense and a split that happen to share an id are distinct keys.
        let a = SpendSource::Expense("x_1".into());
        let b = SpendSource::Split("x_1".into());
        assert_ne!(a, b);
        assert_eq!(a.id(), b.id());
    }

    #[test]
    fn suggestion_rank_ordering() {
        assert!(SourceType::Quote.suggestion_rank() < SourceType::ChangeOrder.suggestion_rank());
        assert!(
            SourceType::ChangeOrder.suggestion_rank() < SourceType::Estimate.suggestion_rank()
        );
    }

    #[test]
    fn correlation_link_deserializes_with_sparse_fields() {
        let json = r#"{
            "id": "cl_1",
            "expense_id": "exp_1",
            "quote_id": "q_1"
        }"#;
        let link: CorrelationLink = serde_json::from_str(json).unwrap();
        assert_eq!(link.expense_id.as_deref(), Some("exp_1"));
        assert!(link.expense_split_id.is_none());
        assert!(link.estimate_line_item_id.is_none());
        assert_eq!(link.correlation_type, CorrelationType::Manual);
        assert!(!link.auto_correlated);
    }

    #[test]
    fn derived_dataset_truncates() {
        let mut ds = DerivedDataset::new("needs_attention");
        assert!(ds.is_empty());
        for i in 0..DerivedDataset::MAX_ROWS + 10 {
            ds.rows.push(serde_json::json!({ "i": i }));
        }
        ds.enforce_limit();
        assert_eq!(ds.rows.len(), DerivedDataset::MAX_ROWS);
        assert!(ds.truncated);
    }
}
