//! Pipeline orchestration: normalize → index quotes → resolve → aggregate
//! → rollup, in one pass over already-fetched collections.

use crate::aggregate::{apply_allocations, summarize_allocation, summarize_categories};
use crate::config::EngineConfig;
use crate::error::AllocError;
use crate::model::{AllocationReport, ProjectInput, ReportMeta};
use crate::normalize::normalize;
use crate::resolve::{build_quote_index, resolve};
use crate::rollup::project_variance;

/// Run the full allocation pass for one project. Everything is recomputed
/// from the source rows; the report is a pure function of its inputs plus
/// the run timestamp in the meta block.
pub fn run(config: &EngineConfig, input: &ProjectInput) -> Result<AllocationReport, AllocError> {
    config.validate()?;

    let mut items = normalize(input);
    let quote_index = build_quote_index(&input.quote_line_items);
    let resolution = resolve(
        &input.links,
        &items,
        &input.expenses,
        &input.expense_splits,
        &quote_index,
    );

    apply_allocations(&mut items, &resolution.allocations);
    let categories = summarize_categories(&items, &input.quotes, &input.quote_line_items);
    let allocation = summarize_allocation(&items, config.full_allocation_threshold_bps);
    let variance = project_variance(&categories);

    Ok(AllocationReport {
        meta: ReportMeta {
            project_id: input.project_id.clone(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        },
        line_items: items,
        categories,
        allocation,
        variance,
        warnings: resolution.warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_project_yields_empty_report() {
        let input = ProjectInput {
            project_id: "proj_1".into(),
            ..ProjectInput::default()
        };
        let report = run(&EngineConfig::default(), &input).unwrap();
        assert_eq!(report.meta.project_id, "proj_1");
        assert!(!report.meta.engine_version.is_empty());
        assert!(report.line_items.is_empty());
        assert!(report.categories.is_empty());
        assert_eq!(report.allocation.external_items, 0);
        assert_eq!(report.variance.actual_total_cents, 0);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn invalid_config_is_rejected_up_front() {
        let config = EngineConfig {
            full_allocation_threshold_bps: 0,
            ..EngineConfig::default()
        };
        let err = run(&config, &ProjectInput::default()).unwrap_err();
        assert!(err.to_string().contains("threshold"));
    }
}
