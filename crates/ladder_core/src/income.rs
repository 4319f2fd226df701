//! Expected income from bond cashflows.
//!
//! # Responsibility
//! - Generate coupon and principal cashflows for plain-vanilla bonds.
//! - Summarize cashflows in a date window as distributions and a yearly series.
//!
//! # Invariants
//! - Coupons fall strictly before maturity; principal falls on maturity.
//! - Distributions and series are sorted by date ascending.

use crate::model::bond::Bond;
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

// Payment days are capped so every month has the day.
const MAX_PAYMENT_DAY: u32 = 28;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CashflowKind {
    Coupon,
    Principal,
}

/// One scheduled payment of a bond.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cashflow {
    pub id: String,
    pub bond_id: String,
    pub date: NaiveDate,
    pub amount: Decimal,
    pub currency: String,
    #[serde(rename = "type")]
    pub kind: CashflowKind,
    pub rung_id: String,
}

/// Cashflow joined with its bond for tabular display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Distribution {
    pub id: String,
    pub date: NaiveDate,
    pub amount: Decimal,
    pub currency: String,
    #[serde(rename = "type")]
    pub kind: CashflowKind,
    pub bond_id: String,
    pub ticker: Option<String>,
    pub issuer: String,
    pub maturity_date: NaiveDate,
    pub rung_id: String,
}

/// Income total for one calendar year, dated Jan 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomePoint {
    pub date: NaiveDate,
    pub value: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IncomeReport {
    pub income_series: Vec<IncomePoint>,
    pub distributions: Vec<Distribution>,
}

/// Generates the coupon schedule and principal repayment of `bond`.
pub fn bond_cashflows(bond: &Bond) -> Vec<Cashflow> {
    let frequency = bond.coupon_frequency;
    let coupon_amount =
        bond.face_value * bond.coupon_rate / Decimal::from(frequency.periods_per_year());

    let mut cashflows = Vec::new();
    let mut payment_date = add_months(bond.issue_date, frequency.months_between_payments());
    while let Some(date) = payment_date.filter(|date| *date < bond.maturity_date) {
        cashflows.push(Cashflow {
            id: format!("{}-coupon-{date}", bond.id),
            bond_id: bond.id.clone(),
            date,
            amount: coupon_amount,
            currency: bond.currency.clone(),
            kind: CashflowKind::Coupon,
            rung_id: bond.rung_id.clone(),
        });
        payment_date = add_months(date, frequency.months_between_payments());
    }

    cashflows.push(Cashflow {
        id: format!("{}-principal-{}", bond.id, bond.maturity_date),
        bond_id: bond.id.clone(),
        date: bond.maturity_date,
        amount: bond.face_value,
        currency: bond.currency.clone(),
        kind: CashflowKind::Principal,
        rung_id: bond.rung_id.clone(),
    });
    cashflows
}

/// Builds the income report for cashflows within `[from, to]` in `currency`.
pub fn income_report(
    bonds: &[Bond],
    from: NaiveDate,
    to: NaiveDate,
    currency: &str,
) -> IncomeReport {
    let bond_by_id: HashMap<&str, &Bond> =
        bonds.iter().map(|bond| (bond.id.as_str(), bond)).collect();

    let cashflows: Vec<Cashflow> = bonds
        .iter()
        .filter(|bond| bond.currency.eq_ignore_ascii_case(currency))
        .flat_map(bond_cashflows)
        .filter(|cashflow| from <= cashflow.date && cashflow.date <= to)
        .collect();

    let mut by_year: BTreeMap<i32, Decimal> = BTreeMap::new();
    for cashflow in &cashflows {
        *by_year.entry(cashflow.date.year()).or_default() += cashflow.amount;
    }
    let income_series = by_year
        .into_iter()
        .filter_map(|(year, value)| {
            NaiveDate::from_ymd_opt(year, 1, 1).map(|date| IncomePoint { date, value })
        })
        .collect();

    let mut distributions: Vec<Distribution> = cashflows
        .into_iter()
        .filter_map(|cashflow| {
            let bond = bond_by_id.get(cashflow.bond_id.as_str())?;
            Some(Distribution {
                id: cashflow.id,
                date: cashflow.date,
                amount: cashflow.amount,
                currency: cashflow.currency,
                kind: cashflow.kind,
                bond_id: cashflow.bond_id,
                ticker: bond.ticker.clone(),
                issuer: bond.issuer.clone(),
                maturity_date: bond.maturity_date,
                rung_id: cashflow.rung_id,
            })
        })
        .collect();
    distributions.sort_by(|left, right| {
        left.date
            .cmp(&right.date)
            .then_with(|| left.id.cmp(&right.id))
    });

    IncomeReport {
        income_series,
        distributions,
    }
}

fn add_months(date: NaiveDate, months: u32) -> Option<NaiveDate> {
    let month_index = date.month0() + months;
    let year = date.year() + i32::try_from(month_index / 12).ok()?;
    let month = month_index % 12 + 1;
    NaiveDate::from_ymd_opt(year, month, date.day().min(MAX_PAYMENT_DAY))
}

#[cfg(test)]
mod tests {
    use super::add_months;
    use chrono::NaiveDate;

    #[test]
    fn add_months_rolls_year_and_caps_day() {
        let date = NaiveDate::from_ymd_opt(2030, 11, 30).expect("valid date");
        assert_eq!(add_months(date, 3), NaiveDate::from_ymd_opt(2031, 2, 28));
        assert_eq!(add_months(date, 12), NaiveDate::from_ymd_opt(2031, 11, 28));
    }
}
