use chrono::NaiveDate;
use ladder_core::db::open_db_in_memory;
use ladder_core::{
    AtomicRung, Bond, BlockSpan, CouponFrequency, LadderConfig, LadderRow, LadderService,
    LadderServiceError, LadderStore, NewBond, Selection, SelectionParseError, SqliteLadderStore,
    StoreError, StoreResult, ZoomStep,
};
use rust_decimal::Decimal;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet};

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn new_bond(issuer: &str, maturity_year: i32, face: i64) -> NewBond {
    NewBond {
        id: None,
        ticker: None,
        issuer: issuer.to_string(),
        currency: "USD".to_string(),
        face_value: Decimal::from(face),
        coupon_rate: Decimal::new(4, 2),
        coupon_frequency: CouponFrequency::Annual,
        issue_date: date(2025, 2, 10),
        maturity_date: date(maturity_year, 2, 10),
    }
}

/// In-memory store that refuses writes for selected rung ids.
#[derive(Default)]
struct FlakyStore {
    years: Vec<i32>,
    targets: RefCell<BTreeMap<String, Decimal>>,
    failing: HashSet<String>,
    attempts: RefCell<Vec<String>>,
}

impl FlakyStore {
    fn new(years: impl IntoIterator<Item = i32>, failing: &[&str]) -> Self {
        Self {
            years: years.into_iter().collect(),
            failing: failing.iter().map(|id| id.to_string()).collect(),
            ..Self::default()
        }
    }
}

impl LadderStore for FlakyStore {
    fn list_rungs(&self) -> StoreResult<Vec<AtomicRung>> {
        let targets = self.targets.borrow();
        Ok(self
            .years
            .iter()
            .map(|year| {
                let mut rung = AtomicRung::for_year(*year).unwrap();
                rung.target_amount = targets.get(&rung.id).copied();
                rung
            })
            .collect())
    }

    fn list_bonds(&self) -> StoreResult<Vec<Bond>> {
        Ok(Vec::new())
    }

    fn update_target(&self, rung_id: &str, target_amount: Decimal) -> StoreResult<()> {
        self.attempts.borrow_mut().push(rung_id.to_string());
        if self.failing.contains(rung_id) {
            return Err(StoreError::InvalidData(format!("write refused for {rung_id}")));
        }
        self.targets
            .borrow_mut()
            .insert(rung_id.to_string(), target_amount);
        Ok(())
    }

    fn create_bond(&self, bond: &NewBond) -> StoreResult<Bond> {
        Ok(bond.clone().into_bond())
    }
}

#[test]
fn block_edit_fans_out_and_refetch_shows_consistent_totals() {
    let conn = open_db_in_memory().unwrap();
    let config = LadderConfig::default();
    let service = LadderService::try_new(SqliteLadderStore::new(&conn, &config), config).unwrap();

    service.add_bond(&new_bond("Alpha", 2034, 1_000)).unwrap();
    service.add_bond(&new_bond("Beta", 2035, 2_000)).unwrap();
    service.add_bond(&new_bond("Gamma", 2036, 4_000)).unwrap();

    let ids: Vec<String> = service
        .row_views(ZoomStep::Three)
        .unwrap()
        .into_iter()
        .map(|view| view.id)
        .collect();
    assert_eq!(ids, vec!["3Y-2040", "3Y-2037", "3Y-2034"]);

    let before = service.select("3Y-2034").unwrap().unwrap();
    assert_eq!(before.target_amount, Decimal::from(60_000));
    assert_eq!(before.current_amount, Decimal::from(7_000));
    assert_eq!(before.bonds.len(), 3);

    let writes = service.save_target("3Y-2034", 31_000.0).unwrap();
    let amounts: Vec<Decimal> = writes.iter().map(|write| write.target_amount).collect();
    assert_eq!(
        amounts,
        vec![
            Decimal::new(1_033_334, 2),
            Decimal::new(1_033_333, 2),
            Decimal::new(1_033_333, 2)
        ]
    );

    let after = service.select("3Y-2034").unwrap().unwrap();
    assert_eq!(after.target_amount, Decimal::from(31_000));
    assert_eq!(after.current_amount, Decimal::from(7_000));

    let rows = service.rows(ZoomStep::Three).unwrap();
    let block = rows
        .iter()
        .find_map(|row| match row {
            LadderRow::Block(block) if block.year == 2034 => Some(block),
            _ => None,
        })
        .unwrap();
    assert_eq!(block.target_amount, Decimal::from(31_000));

    let atomic = service.select("2034").unwrap().unwrap();
    assert_eq!(atomic.target_amount, Decimal::new(1_033_334, 2));
}

#[test]
fn zooming_in_and_out_preserves_totals() {
    let store = FlakyStore::new(2034..=2045, &[]);
    let service = LadderService::try_new(&store, LadderConfig::default()).unwrap();
    service
        .save_decimal_target(Selection::Atomic { year: 2040 }, Decimal::from(5_000))
        .unwrap();

    let total = |zoom: ZoomStep| -> Decimal {
        service
            .row_views(zoom)
            .unwrap()
            .iter()
            .map(|view| view.effective_target)
            .sum()
    };
    let atomic_total = total(ZoomStep::One);
    assert_eq!(atomic_total, Decimal::from(11 * 20_000 + 5_000));
    assert_eq!(total(ZoomStep::Three), atomic_total);

    let zoom = ZoomStep::One.zoom_out();
    assert_eq!(zoom, ZoomStep::Three);
    assert_eq!(zoom.zoom_out().zoom_in(), ZoomStep::Three);
}

#[test]
fn partial_fan_out_keeps_sibling_writes() {
    let store = FlakyStore::new(2034..=2036, &["2035"]);
    let service = LadderService::try_new(&store, LadderConfig::default()).unwrap();

    let err = service.save_target("3Y-2034", 900.0).unwrap_err();
    match err {
        LadderServiceError::PartialWrite { applied, failed } => {
            let applied: Vec<&str> = applied.iter().map(|write| write.rung_id.as_str()).collect();
            assert_eq!(applied, vec!["2034", "2036"]);
            assert_eq!(failed.len(), 1);
            assert_eq!(failed[0].write.rung_id, "2035");
        }
        other => panic!("unexpected error: {other}"),
    }

    assert_eq!(*store.attempts.borrow(), vec!["2034", "2035", "2036"]);
    let targets = store.targets.borrow();
    assert_eq!(targets.get("2034"), Some(&Decimal::from(300)));
    assert_eq!(targets.get("2035"), None);
    assert_eq!(targets.get("2036"), Some(&Decimal::from(300)));
}

#[test]
fn malformed_or_invalid_edits_issue_no_writes() {
    let store = FlakyStore::new(2034..=2036, &[]);
    let service = LadderService::try_new(&store, LadderConfig::default()).unwrap();

    assert!(matches!(
        service.save_target("3Y-20x4", 900.0),
        Err(LadderServiceError::Selection(SelectionParseError::MalformedAggregate(_)))
    ));
    assert!(matches!(
        service.save_target("3Y-2034", f64::NAN),
        Err(LadderServiceError::FanOut(_))
    ));
    assert!(matches!(
        service.save_target("2034", -10.0),
        Err(LadderServiceError::FanOut(_))
    ));
    assert!(matches!(
        service.save_target("5Y-2147483647", 5.0),
        Err(LadderServiceError::Selection(SelectionParseError::YearOutOfRange(_)))
    ));
    assert!(matches!(
        service.select("5Y-2147483647"),
        Err(LadderServiceError::Selection(SelectionParseError::YearOutOfRange(_)))
    ));
    assert!(store.attempts.borrow().is_empty());
}

#[test]
fn block_edit_writes_years_missing_from_store() {
    let store = FlakyStore::new([2035, 2037], &[]);
    let service = LadderService::try_new(&store, LadderConfig::default()).unwrap();

    let selection = Selection::Aggregate {
        span: BlockSpan::Five,
        start_year: 2035,
    };
    let writes = service
        .save_decimal_target(selection, Decimal::from(10_000))
        .unwrap();
    assert_eq!(writes.len(), 5);
    assert_eq!(store.targets.borrow().len(), 5);
}

#[test]
fn selecting_empty_range_returns_none() {
    let store = FlakyStore::new([2034], &[]);
    let service = LadderService::try_new(&store, LadderConfig::default()).unwrap();

    assert!(service.select("5Y-2040").unwrap().is_none());
    assert!(matches!(
        service.select(""),
        Err(LadderServiceError::Selection(SelectionParseError::Empty))
    ));
}

#[test]
fn invalid_config_is_rejected_at_construction() {
    let config = LadderConfig {
        default_rung_target: Decimal::ZERO,
        ..LadderConfig::default()
    };
    assert!(LadderService::try_new(FlakyStore::default(), config).is_err());
}

#[test]
fn income_window_must_be_ordered() {
    let conn = open_db_in_memory().unwrap();
    let config = LadderConfig::default();
    let service = LadderService::try_new(SqliteLadderStore::new(&conn, &config), config).unwrap();
    service.add_bond(&new_bond("Alpha", 2027, 1_000)).unwrap();

    assert!(matches!(
        service.income_between(date(2030, 1, 1), date(2029, 1, 1)),
        Err(LadderServiceError::InvalidIncomeWindow { .. })
    ));

    let report = service
        .income(Some(date(2025, 1, 1)), Some(date(2027, 12, 31)))
        .unwrap();
    let values: Vec<Decimal> = report
        .income_series
        .iter()
        .map(|point| point.value)
        .collect();
    assert_eq!(values, vec![Decimal::from(40), Decimal::from(1_000)]);
}

#[test]
fn default_income_window_past_calendar_end_is_an_error() {
    let store = FlakyStore::new([2034], &[]);
    let service = LadderService::try_new(&store, LadderConfig::default()).unwrap();

    assert!(matches!(
        service.income(Some(NaiveDate::MAX), None),
        Err(LadderServiceError::IncomeHorizonOverflow { from, days })
            if from == NaiveDate::MAX && days == 10_950
    ));
}

#[test]
fn unbounded_horizon_or_shoulder_is_rejected_at_construction() {
    let long_horizon = LadderConfig {
        income_horizon_days: 4_000_000_000,
        ..LadderConfig::default()
    };
    assert!(LadderService::try_new(FlakyStore::default(), long_horizon).is_err());

    let wide_shoulder = LadderConfig {
        shoulder_years: u32::MAX,
        ..LadderConfig::default()
    };
    assert!(LadderService::try_new(FlakyStore::default(), wide_shoulder).is_err());
}
