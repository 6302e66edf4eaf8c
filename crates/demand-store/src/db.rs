//! SQLite 連線初始化與資料表定義

use rusqlite::{Connection, OpenFlags};
use std::time::Duration;

use crate::config::StoreConfig;

/// 預設 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 診斷所需的資料表
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS demand (
    id                 INTEGER PRIMARY KEY,
    product_sku        TEXT    NOT NULL,
    quantity_requested INTEGER NOT NULL,
    priority           INTEGER NOT NULL DEFAULT 0,
    status             TEXT    NOT NULL DEFAULT 'pending',
    requested_at       TEXT,
    completion_date    TEXT
);

CREATE TABLE IF NOT EXISTS product (
    id     INTEGER PRIMARY KEY,
    name   TEXT    NOT NULL,
    sku    TEXT,
    is_kit INTEGER NOT NULL DEFAULT 0,
    grade  TEXT,
    image  TEXT
);

CREATE TABLE IF NOT EXISTS production_order (
    id         INTEGER PRIMARY KEY,
    demand_id  INTEGER REFERENCES demand(id),
    product_id INTEGER NOT NULL,
    variant    TEXT,
    quantity   INTEGER NOT NULL,
    status     TEXT    NOT NULL,
    stages     TEXT    NOT NULL DEFAULT '[]'
);

CREATE TABLE IF NOT EXISTS arremate (
    id                        INTEGER PRIMARY KEY AUTOINCREMENT,
    production_order_number   INTEGER NOT NULL,
    quantity_finished         INTEGER NOT NULL DEFAULT 0,
    quantity_already_packaged INTEGER NOT NULL DEFAULT 0,
    entry_type                TEXT    NOT NULL DEFAULT 'PRODUCTION'
);

CREATE INDEX IF NOT EXISTS idx_production_order_demand ON production_order(demand_id);
CREATE INDEX IF NOT EXISTS idx_arremate_order ON arremate(production_order_number);
"#;

/// 配置連線的 PRAGMA
///
/// foreign_keys 與 busy_timeout 都需要每個連線單獨設定。
pub fn configure_connection(conn: &Connection, busy_timeout_ms: u64) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(busy_timeout_ms))?;
    Ok(())
}

/// 依配置開啟連線
pub fn open_connection(config: &StoreConfig) -> rusqlite::Result<Connection> {
    let conn = Connection::open(&config.database_path)?;
    configure_connection(&conn, config.busy_timeout_ms)?;
    if config.create_schema {
        init_schema(&conn)?;
    }
    Ok(conn)
}

/// 開啟唯讀連線，供並行查詢使用
pub fn open_read_connection(config: &StoreConfig) -> rusqlite::Result<Connection> {
    let conn = Connection::open_with_flags(
        &config.database_path,
        OpenFlags::SQLITE_OPEN_READ_ONLY
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;
    configure_connection(&conn, config.busy_timeout_ms)?;
    Ok(conn)
}

/// 建立缺少的資料表
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)
}
