//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `ladder_core` linkage end to end against an in-memory store.
//! - Keep output deterministic for quick local sanity checks.
//! - Start file logging when `LADDER_LOG_DIR` names an absolute directory.

use chrono::NaiveDate;
use ladder_core::db::open_db_in_memory;
use ladder_core::{
    CouponFrequency, LadderConfig, LadderService, NewBond, SqliteLadderStore, ZoomStep,
};
use rust_decimal::Decimal;
use std::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("ladder_core version={}", ladder_core::core_version());
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("ladder_cli error={err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    if let Ok(log_dir) = std::env::var("LADDER_LOG_DIR") {
        ladder_core::init_logging(ladder_core::default_log_level(), &log_dir)?;
    }

    let conn = open_db_in_memory()?;
    let config = LadderConfig::default();
    let store = SqliteLadderStore::new(&conn, &config);
    let service = LadderService::try_new(store, config)?;

    for (issuer, year, face) in [("Sample Treasury", 2035, 15_000), ("Sample Muni", 2037, 8_000)] {
        service.add_bond(&NewBond {
            id: None,
            ticker: None,
            issuer: issuer.to_string(),
            currency: "USD".to_string(),
            face_value: Decimal::from(face),
            coupon_rate: Decimal::new(4, 2),
            coupon_frequency: CouponFrequency::SemiAnnual,
            issue_date: NaiveDate::from_ymd_opt(2025, 1, 15).ok_or("invalid issue date")?,
            maturity_date: NaiveDate::from_ymd_opt(year, 1, 15).ok_or("invalid maturity date")?,
        })?;
    }

    for view in service.row_views(ZoomStep::Three)? {
        println!(
            "rung id={} target={} current={} percent={} color={}",
            view.id,
            view.effective_target,
            view.row.current_amount(),
            view.completion.percent,
            view.completion.color.to_css()
        );
    }
    Ok(())
}
