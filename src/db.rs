// ==========================================
// 服装裁剪排产系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为
// - 统一建表（幂等），并记录 schema_version
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY
);

CREATE TABLE IF NOT EXISTS config_kv (
    scope_id TEXT NOT NULL,
    key TEXT NOT NULL,
    value TEXT NOT NULL,
    updated_at TEXT,
    PRIMARY KEY (scope_id, key)
);

CREATE TABLE IF NOT EXISTS fabric_material (
    name TEXT PRIMARY KEY,
    seq_no INTEGER NOT NULL,
    price_per_meter REAL NOT NULL,
    elasticity TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS fabric_material_size (
    material_name TEXT NOT NULL REFERENCES fabric_material(name) ON DELETE CASCADE,
    size_code TEXT NOT NULL,
    seq_no INTEGER NOT NULL,
    meters_per_unit REAL NOT NULL,
    profit_per_unit REAL NOT NULL,
    PRIMARY KEY (material_name, size_code)
);

CREATE TABLE IF NOT EXISTS fabric_material_use (
    material_name TEXT NOT NULL REFERENCES fabric_material(name) ON DELETE CASCADE,
    seq_no INTEGER NOT NULL,
    product_name TEXT NOT NULL,
    PRIMARY KEY (material_name, seq_no)
);

CREATE TABLE IF NOT EXISTS production_plan (
    plan_id TEXT PRIMARY KEY,
    material_name TEXT NOT NULL,
    total_meters REAL NOT NULL,
    total_profit REAL NOT NULL,
    remaining_meters REAL NOT NULL,
    request_json TEXT NOT NULL,
    result_json TEXT NOT NULL,
    created_by TEXT,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_production_plan_created_at
    ON production_plan(created_at);
"#;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要"每个连接"单独开启
/// - busy_timeout 需要"每个连接"单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 建表（幂等）并写入 schema_version
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;
    Ok(())
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}
