//! SQLite-backed ladder store.
//!
//! # Responsibility
//! - Persist bond holdings and explicit rung targets.
//! - Serve the derived atomic ladder to the service layer.
//!
//! # Invariants
//! - Money is stored as decimal text and parsed back exactly.
//! - Read paths reject invalid persisted state instead of masking it.

use super::overview::derive_rungs;
use super::{LadderStore, StoreError, StoreResult};
use crate::config::LadderConfig;
use crate::model::bond::{Bond, CouponFrequency, NewBond};
use crate::model::rung::AtomicRung;
use crate::model::selection::Selection;
use log::info;
use rusqlite::{params, Connection, OptionalExtension, Row};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::str::FromStr;

const BOND_SELECT_SQL: &str = "SELECT
    id,
    ticker,
    issuer,
    currency,
    face_value,
    coupon_rate,
    coupon_frequency,
    issue_date,
    maturity_date,
    rung_id
FROM bonds";

/// Ladder store over a migrated SQLite connection.
pub struct SqliteLadderStore<'conn> {
    conn: &'conn Connection,
    floor_year: i32,
    shoulder_years: u32,
}

impl<'conn> SqliteLadderStore<'conn> {
    pub fn new(conn: &'conn Connection, config: &LadderConfig) -> Self {
        Self {
            conn,
            floor_year: config.floor_year,
            shoulder_years: config.shoulder_years,
        }
    }

    /// Explicit targets keyed by rung id.
    pub fn list_targets(&self) -> StoreResult<HashMap<String, Decimal>> {
        let mut stmt = self
            .conn
            .prepare("SELECT rung_id, target_amount FROM rung_targets;")?;
        let mut rows = stmt.query([])?;
        let mut targets = HashMap::new();
        while let Some(row) = rows.next()? {
            let rung_id: String = row.get("rung_id")?;
            let raw: String = row.get("target_amount")?;
            let amount = parse_decimal(&raw, "rung_targets.target_amount")?;
            targets.insert(rung_id, amount);
        }
        Ok(targets)
    }

    fn bond_exists(&self, id: &str) -> StoreResult<bool> {
        let found = self
            .conn
            .query_row("SELECT 1 FROM bonds WHERE id = ?1;", [id], |row| {
                row.get::<_, i64>(0)
            })
            .optional()?;
        Ok(found.is_some())
    }
}

impl LadderStore for SqliteLadderStore<'_> {
    fn list_rungs(&self) -> StoreResult<Vec<AtomicRung>> {
        let bonds = self.list_bonds()?;
        let targets = self.list_targets()?;
        Ok(derive_rungs(
            &bonds,
            &targets,
            self.floor_year,
            self.shoulder_years,
        ))
    }

    fn list_bonds(&self) -> StoreResult<Vec<Bond>> {
        let mut stmt = self.conn.prepare(&format!(
            "{BOND_SELECT_SQL} ORDER BY maturity_date ASC, rowid ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut bonds = Vec::new();
        while let Some(row) = rows.next()? {
            bonds.push(parse_bond_row(row)?);
        }
        Ok(bonds)
    }

    fn update_target(&self, rung_id: &str, target_amount: Decimal) -> StoreResult<()> {
        let year = match rung_id.parse::<Selection>() {
            Ok(Selection::Atomic { year }) => year,
            _ => return Err(StoreError::InvalidRungId(rung_id.to_string())),
        };
        if target_amount < Decimal::ZERO {
            return Err(StoreError::NegativeTarget(target_amount));
        }

        self.conn.execute(
            "INSERT INTO rung_targets (rung_id, target_amount)
             VALUES (?1, ?2)
             ON CONFLICT(rung_id) DO UPDATE SET
                target_amount = excluded.target_amount,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![year.to_string(), target_amount.to_string()],
        )?;

        info!("event=rung_target_update module=store status=ok rung_id={year}");
        Ok(())
    }

    fn create_bond(&self, request: &NewBond) -> StoreResult<Bond> {
        request.validate()?;
        let bond = request.clone().into_bond();
        if self.bond_exists(&bond.id)? {
            return Err(StoreError::DuplicateBond(bond.id));
        }

        self.conn.execute(
            "INSERT INTO bonds (
                id,
                ticker,
                issuer,
                currency,
                face_value,
                coupon_rate,
                coupon_frequency,
                issue_date,
                maturity_date,
                rung_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10);",
            params![
                bond.id.as_str(),
                bond.ticker.as_deref(),
                bond.issuer.as_str(),
                bond.currency.as_str(),
                bond.face_value.to_string(),
                bond.coupon_rate.to_string(),
                bond.coupon_frequency.as_str(),
                bond.issue_date,
                bond.maturity_date,
                bond.rung_id.as_str(),
            ],
        )?;

        info!(
            "event=bond_create module=store status=ok rung_id={}",
            bond.rung_id
        );
        Ok(bond)
    }
}

fn parse_bond_row(row: &Row<'_>) -> StoreResult<Bond> {
    let face_text: String = row.get("face_value")?;
    let rate_text: String = row.get("coupon_rate")?;
    let frequency_text: String = row.get("coupon_frequency")?;
    let coupon_frequency = CouponFrequency::parse(&frequency_text).ok_or_else(|| {
        StoreError::InvalidData(format!(
            "invalid coupon frequency `{frequency_text}` in bonds.coupon_frequency"
        ))
    })?;

    Ok(Bond {
        id: row.get("id")?,
        ticker: row.get("ticker")?,
        issuer: row.get("issuer")?,
        currency: row.get("currency")?,
        face_value: parse_decimal(&face_text, "bonds.face_value")?,
        coupon_rate: parse_decimal(&rate_text, "bonds.coupon_rate")?,
        coupon_frequency,
        issue_date: row.get("issue_date")?,
        maturity_date: row.get("maturity_date")?,
        rung_id: row.get("rung_id")?,
    })
}

fn parse_decimal(value: &str, column: &str) -> StoreResult<Decimal> {
    Decimal::from_str(value).map_err(|_| {
        StoreError::InvalidData(format!("invalid decimal value `{value}` in {column}"))
    })
}
