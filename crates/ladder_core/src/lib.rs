//! Savings-ladder aggregation and target-allocation core.
//! Atomic per-year rungs are the single source of truth; blocks are views.

pub mod config;
pub mod db;
pub mod engine;
pub mod income;
pub mod logging;
pub mod model;
pub mod service;
pub mod store;

pub use config::{BlockAnchors, ConfigError, LadderConfig};
pub use engine::aggregate::{aggregate_rungs, build_blocks};
pub use engine::completion::{
    completion_color, completion_fraction, completion_percent, CompletionBand, CompletionView, Rgb,
};
pub use engine::fan_out::{plan_target_writes, target_from_input, FanOutError, TargetWrite};
pub use engine::resolve::{resolve_selection, ResolvedSelection};
pub use income::{bond_cashflows, income_report, Cashflow, CashflowKind, IncomeReport};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::bond::{Bond, BondValidationError, CouponFrequency, NewBond};
pub use model::rung::{effective_target, AtomicRung, Block, LadderRow};
pub use model::selection::{BlockSpan, Selection, SelectionParseError, ZoomStep};
pub use service::ladder_service::{
    FailedWrite, LadderRowView, LadderService, LadderServiceError, ServiceResult,
};
pub use store::sqlite::SqliteLadderStore;
pub use store::{LadderOverview, LadderStore, StoreError, StoreResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
