//! Analysis module - the ledger scan, the per-key pipeline and its cache.

mod analysis_key;
mod analysis_manager;
mod analysis_model;
mod analysis_pipeline;
mod ledger_scanner;
mod market_analysis;
mod reconciliation;
mod valuation;

pub use analysis_key::AnalysisKey;
pub use analysis_manager::AnalysisManager;
pub use analysis_model::Analysis;
pub use analysis_pipeline::{build_analysis, is_quantity_significant, PipelineContext};
pub use ledger_scanner::{ensure_sorted, LedgerScanner, ScanWarning, ScannedLedger};
pub use market_analysis::{MarketAnalysis, MarketTotals, SecurityAttribution};
pub use reconciliation::{
    reconcile, IntegrityMismatch, ProfitTotals, ReconciliationAxis, ReconciliationReport,
};
pub use valuation::{gain_ratio, HoldingsValuation, ValuationContext};
