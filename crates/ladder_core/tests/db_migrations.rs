use ladder_core::db::migrations::latest_version;
use ladder_core::db::{open_db, open_db_in_memory, DbError};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "bonds");
    assert_table_exists(&conn, "rung_targets");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ladder.db");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    conn_first
        .execute(
            "INSERT INTO rung_targets (rung_id, target_amount) VALUES ('2034', '10000');",
            [],
        )
        .unwrap();
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    let kept: String = conn_second
        .query_row(
            "SELECT target_amount FROM rung_targets WHERE rung_id = '2034';",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(kept, "10000");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn bonds_table_rejects_maturity_before_issue() {
    let conn = open_db_in_memory().unwrap();
    let result = conn.execute(
        "INSERT INTO bonds (
            id, ticker, issuer, currency, face_value, coupon_rate,
            coupon_frequency, issue_date, maturity_date, rung_id
        ) VALUES ('b1', NULL, 'Issuer', 'USD', '1000', '0.04',
            'ANNUAL', '2030-01-01', '2029-01-01', '2029');",
        [],
    );
    assert!(result.is_err());
}

#[test]
fn bonds_table_rejects_unknown_coupon_frequency() {
    let conn = open_db_in_memory().unwrap();
    let result = conn.execute(
        "INSERT INTO bonds (
            id, ticker, issuer, currency, face_value, coupon_rate,
            coupon_frequency, issue_date, maturity_date, rung_id
        ) VALUES ('b1', NULL, 'Issuer', 'USD', '1000', '0.04',
            'MONTHLY', '2025-01-01', '2029-01-01', '2029');",
        [],
    );
    assert!(result.is_err());
}

#[test]
fn rung_targets_keep_one_row_per_rung() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO rung_targets (rung_id, target_amount) VALUES ('2034', '10000');",
        [],
    )
    .unwrap();

    let duplicate = conn.execute(
        "INSERT INTO rung_targets (rung_id, target_amount) VALUES ('2034', '5000');",
        [],
    );
    assert!(duplicate.is_err());

    conn.execute(
        "INSERT INTO rung_targets (rung_id, target_amount) VALUES ('2034', '5000')
         ON CONFLICT(rung_id) DO UPDATE SET target_amount = excluded.target_amount;",
        [],
    )
    .unwrap();
    let (rows, amount): (i64, String) = conn
        .query_row(
            "SELECT COUNT(*), MAX(target_amount) FROM rung_targets WHERE rung_id = '2034';",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap();
    assert_eq!(rows, 1);
    assert_eq!(amount, "5000");
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
