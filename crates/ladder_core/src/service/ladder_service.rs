//! Ladder use-case service.
//!
//! # Responsibility
//! - Fetch rungs and bonds from a store and run them through the engine.
//! - Issue fan-out target writes and bond creations back to the store.
//!
//! # Invariants
//! - Every read re-fetches from the store; nothing is cached between calls.
//! - A fan-out issues every planned write even after a sibling fails and
//!   never rolls back applied writes.
//! - Invalid selection ids and targets fail before any write is issued.

use crate::config::{ConfigError, LadderConfig};
use crate::engine::aggregate::aggregate_rungs;
use crate::engine::completion::CompletionView;
use crate::engine::fan_out::{plan_target_writes, target_from_input, FanOutError, TargetWrite};
use crate::engine::resolve::{resolve_selection, ResolvedSelection};
use crate::income::{income_report, IncomeReport};
use crate::model::bond::{Bond, NewBond};
use crate::model::rung::LadderRow;
use crate::model::selection::{Selection, SelectionParseError, ZoomStep};
use crate::store::{LadderStore, StoreError};
use chrono::{Duration, NaiveDate, Utc};
use log::{info, warn};
use rust_decimal::Decimal;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, LadderServiceError>;

/// One write of a fan-out that the store refused.
#[derive(Debug)]
pub struct FailedWrite {
    pub write: TargetWrite,
    pub error: StoreError,
}

/// Service error for ladder use-cases.
#[derive(Debug)]
pub enum LadderServiceError {
    /// Malformed selection id.
    Selection(SelectionParseError),
    /// Rejected target before any write was issued.
    FanOut(FanOutError),
    Store(StoreError),
    /// Some fan-out writes failed; `applied` writes were kept.
    PartialWrite {
        applied: Vec<TargetWrite>,
        failed: Vec<FailedWrite>,
    },
    InvalidIncomeWindow {
        from: NaiveDate,
        to: NaiveDate,
    },
    /// Default window end falls past the last representable date.
    IncomeHorizonOverflow {
        from: NaiveDate,
        days: u32,
    },
}

impl Display for LadderServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Selection(err) => write!(f, "{err}"),
            Self::FanOut(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::PartialWrite { applied, failed } => write!(
                f,
                "target fan-out partially applied: {} written, {} failed",
                applied.len(),
                failed.len()
            ),
            Self::InvalidIncomeWindow { from, to } => {
                write!(f, "income window end {to} is before start {from}")
            }
            Self::IncomeHorizonOverflow { from, days } => {
                write!(f, "income window of {days} days from {from} exceeds the calendar")
            }
        }
    }
}

impl Error for LadderServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Selection(err) => Some(err),
            Self::FanOut(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::PartialWrite { failed, .. } => failed
                .first()
                .map(|failure| &failure.error as &(dyn Error + 'static)),
            Self::InvalidIncomeWindow { .. } | Self::IncomeHorizonOverflow { .. } => None,
        }
    }
}

impl From<SelectionParseError> for LadderServiceError {
    fn from(value: SelectionParseError) -> Self {
        Self::Selection(value)
    }
}

impl From<FanOutError> for LadderServiceError {
    fn from(value: FanOutError) -> Self {
        Self::FanOut(value)
    }
}

impl From<StoreError> for LadderServiceError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Render-ready ladder row with its completion styling.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LadderRowView {
    /// Selection id in boundary string form.
    pub id: String,
    pub row: LadderRow,
    pub effective_target: Decimal,
    pub completion: CompletionView,
}

/// Ladder facade over a store implementation.
pub struct LadderService<S: LadderStore> {
    store: S,
    config: LadderConfig,
}

impl<S: LadderStore> LadderService<S> {
    /// Creates a service after validating `config`.
    pub fn try_new(store: S, config: LadderConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { store, config })
    }

    pub fn config(&self) -> &LadderConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Fetches atomic rungs and renders them at `zoom`.
    pub fn rows(&self, zoom: ZoomStep) -> ServiceResult<Vec<LadderRow>> {
        let rungs = self.store.list_rungs()?;
        let rows = aggregate_rungs(
            &rungs,
            zoom,
            &self.config.anchors,
            self.config.default_rung_target,
        );
        info!(
            "event=ladder_rows module=service status=ok zoom_years={} rungs={} rows={}",
            zoom.years(),
            rungs.len(),
            rows.len()
        );
        Ok(rows)
    }

    /// Rows at `zoom` with effective targets and completion applied.
    pub fn row_views(&self, zoom: ZoomStep) -> ServiceResult<Vec<LadderRowView>> {
        let default_target = self.config.default_rung_target;
        Ok(self
            .rows(zoom)?
            .into_iter()
            .map(|row| {
                let effective_target = row.effective_target(default_target);
                LadderRowView {
                    id: row.selection().to_string(),
                    completion: CompletionView::new(
                        row.current_amount(),
                        Some(effective_target),
                        default_target,
                    ),
                    effective_target,
                    row,
                }
            })
            .collect())
    }

    /// Opens the rung or block named by `selection_id`.
    ///
    /// Returns `Ok(None)` when the range holds no atomic rung.
    pub fn select(&self, selection_id: &str) -> ServiceResult<Option<ResolvedSelection>> {
        let selection: Selection = selection_id.parse()?;
        let overview = self.store.load_overview()?;
        Ok(resolve_selection(
            selection,
            &overview.rungs,
            &overview.bonds,
            self.config.default_rung_target,
        ))
    }

    /// Saves an edited target, fanning block targets out to atomic years.
    ///
    /// Returns the writes the store accepted. Callers re-fetch afterwards.
    pub fn save_target(&self, selection_id: &str, amount: f64) -> ServiceResult<Vec<TargetWrite>> {
        let selection: Selection = selection_id.parse()?;
        let target = target_from_input(amount)?;
        self.save_decimal_target(selection, target)
    }

    /// Same as [`LadderService::save_target`] for an already-parsed request.
    pub fn save_decimal_target(
        &self,
        selection: Selection,
        target: Decimal,
    ) -> ServiceResult<Vec<TargetWrite>> {
        let writes = plan_target_writes(selection, target)?;
        info!(
            "event=target_fan_out module=service status=start selection={selection} writes={}",
            writes.len()
        );

        let mut applied = Vec::with_capacity(writes.len());
        let mut failed = Vec::new();
        for write in writes {
            match self.store.update_target(&write.rung_id, write.target_amount) {
                Ok(()) => applied.push(write),
                Err(error) => {
                    warn!(
                        "event=target_fan_out module=service status=error selection={selection} rung_id={} error={error}",
                        write.rung_id
                    );
                    failed.push(FailedWrite { write, error });
                }
            }
        }

        if !failed.is_empty() {
            return Err(LadderServiceError::PartialWrite { applied, failed });
        }

        info!(
            "event=target_fan_out module=service status=ok selection={selection} writes={}",
            applied.len()
        );
        Ok(applied)
    }

    /// Validates and stores a new bond holding.
    pub fn add_bond(&self, request: &NewBond) -> ServiceResult<Bond> {
        request.validate().map_err(StoreError::from)?;
        Ok(self.store.create_bond(request)?)
    }

    /// Expected income from today through the configured horizon.
    pub fn income(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> ServiceResult<IncomeReport> {
        let from = from.unwrap_or_else(|| Utc::now().date_naive());
        let to = match to {
            Some(to) => to,
            None => {
                let days = self.config.income_horizon_days;
                from.checked_add_signed(Duration::days(i64::from(days)))
                    .ok_or(LadderServiceError::IncomeHorizonOverflow { from, days })?
            }
        };
        self.income_between(from, to)
    }

    pub fn income_between(&self, from: NaiveDate, to: NaiveDate) -> ServiceResult<IncomeReport> {
        if to < from {
            return Err(LadderServiceError::InvalidIncomeWindow { from, to });
        }
        let bonds = self.store.list_bonds()?;
        Ok(income_report(
            &bonds,
            from,
            to,
            &self.config.income_currency,
        ))
    }
}
