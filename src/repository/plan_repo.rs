// ==========================================
// 服装裁剪排产系统 - 排产记录仓储
// ==========================================
// 表: production_plan
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::db::{init_schema, open_sqlite_connection};
use crate::domain::plan::PlanRecord;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex, MutexGuard};

// ==========================================
// PlanRepository - 排产记录仓储
// ==========================================
pub struct PlanRepository {
    conn: Arc<Mutex<Connection>>,
}

impl PlanRepository {
    /// 创建新的 PlanRepository 实例（自动建表）
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 保存排产记录
    pub fn insert(&self, record: &PlanRecord) -> RepositoryResult<()> {
        let request_json = serde_json::to_string(&record.request)?;
        let result_json = serde_json::to_string(&record.result)?;

        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO production_plan (
                plan_id, material_name, total_meters, total_profit, remaining_meters,
                request_json, result_json, created_by, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                record.plan_id,
                record.result.material,
                record.result.total_meters,
                record.result.total_profit,
                record.result.remaining_meters,
                request_json,
                result_json,
                record.created_by,
                // 固定 9 位小数 + Z，字符串顺序即时间顺序
                record.created_at.to_rfc3339_opts(SecondsFormat::Nanos, true),
            ],
        )?;
        Ok(())
    }

    /// 按ID查询
    pub fn find_by_id(&self, plan_id: &str) -> RepositoryResult<Option<PlanRecord>> {
        let conn = self.get_conn()?;
        let raw = conn
            .query_row(
                r#"
                SELECT plan_id, request_json, result_json, created_by, created_at
                FROM production_plan WHERE plan_id = ?1
                "#,
                params![plan_id],
                Self::read_raw,
            )
            .optional()?;

        raw.map(Self::decode).transpose()
    }

    /// 最近的排产记录（按创建时间倒序）
    pub fn list_recent(&self, limit: usize) -> RepositoryResult<Vec<PlanRecord>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT plan_id, request_json, result_json, created_by, created_at
            FROM production_plan
            ORDER BY created_at DESC, rowid DESC
            LIMIT ?1
            "#,
        )?;
        let rows = stmt
            .query_map(params![limit as i64], Self::read_raw)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(Self::decode).collect()
    }

    /// 按面料查询
    pub fn list_by_material(&self, material: &str) -> RepositoryResult<Vec<PlanRecord>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT plan_id, request_json, result_json, created_by, created_at
            FROM production_plan
            WHERE material_name = ?1
            ORDER BY created_at DESC, rowid DESC
            "#,
        )?;
        let rows = stmt
            .query_map(params![material], Self::read_raw)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(Self::decode).collect()
    }

    pub fn delete(&self, plan_id: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "DELETE FROM production_plan WHERE plan_id = ?1",
            params![plan_id],
        )?;
        Ok(affected > 0)
    }

    fn read_raw(row: &Row<'_>) -> rusqlite::Result<RawPlanRow> {
        Ok(RawPlanRow {
            plan_id: row.get(0)?,
            request_json: row.get(1)?,
            result_json: row.get(2)?,
            created_by: row.get(3)?,
            created_at: row.get(4)?,
        })
    }

    fn decode(raw: RawPlanRow) -> RepositoryResult<PlanRecord> {
        let created_at = DateTime::parse_from_rfc3339(&raw.created_at)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| RepositoryError::FieldValueError {
                field: "created_at".to_string(),
                message: e.to_string(),
            })?;

        Ok(PlanRecord {
            plan_id: raw.plan_id,
            request: serde_json::from_str(&raw.request_json)?,
            result: serde_json::from_str(&raw.result_json)?,
            created_by: raw.created_by,
            created_at,
        })
    }
}

struct RawPlanRow {
    plan_id: String,
    request_json: String,
    result_json: String,
    created_by: Option<String>,
    created_at: String,
}
