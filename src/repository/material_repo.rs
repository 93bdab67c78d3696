// ==========================================
// 服装裁剪排产系统 - 面料档案仓储
// ==========================================
// 表: fabric_material / fabric_material_size / fabric_material_use
// 红线: Repository 不含业务逻辑；尺码与推荐用途按 seq_no 保序
// ==========================================

use crate::catalog::{CatalogResult, FabricCatalog};
use crate::db::{init_schema, open_sqlite_connection};
use crate::domain::material::{MaterialProfile, SizeSpec};
use crate::domain::types::Elasticity;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};

// ==========================================
// MaterialRepository - 面料档案仓储
// ==========================================
pub struct MaterialRepository {
    conn: Arc<Mutex<Connection>>,
}

impl MaterialRepository {
    /// 创建新的 MaterialRepository 实例（自动建表）
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

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 新增或覆盖面料档案
    ///
    /// 已存在的面料保持原 seq_no，尺码与推荐用途整体替换
    pub fn upsert(&self, profile: &MaterialProfile) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        Self::upsert_tx(&tx, profile)?;

        tx.commit()?;
        debug!(material = %profile.name, sizes = profile.sizes.len(), "面料档案已保存");
        Ok(())
    }

    /// 批量新增或覆盖面料档案（单一事务，任一失败整体回滚）
    ///
    /// # 返回
    /// 写入的面料数量
    pub fn batch_upsert(&self, profiles: &[MaterialProfile]) -> RepositoryResult<usize> {
        if profiles.is_empty() {
            return Ok(0);
        }
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        for profile in profiles {
            Self::upsert_tx(&tx, profile)?;
        }

        tx.commit()?;
        debug!(count = profiles.len(), "面料档案批量保存");
        Ok(profiles.len())
    }

    /// 在事务中写入单个面料档案
    fn upsert_tx(tx: &Transaction, profile: &MaterialProfile) -> RepositoryResult<()> {
        let existing_seq: Option<i64> = tx
            .query_row(
                "SELECT seq_no FROM fabric_material WHERE name = ?1",
                params![profile.name],
                |row| row.get(0),
            )
            .optional()?;
        let seq_no = match existing_seq {
            Some(seq) => seq,
            None => tx.query_row(
                "SELECT COALESCE(MAX(seq_no), 0) + 1 FROM fabric_material",
                [],
                |row| row.get(0),
            )?,
        };

        tx.execute(
            r#"
            INSERT INTO fabric_material (name, seq_no, price_per_meter, elasticity)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(name) DO UPDATE SET
                price_per_meter = excluded.price_per_meter,
                elasticity = excluded.elasticity
            "#,
            params![
                profile.name,
                seq_no,
                profile.price_per_meter,
                profile.elasticity.to_db_str(),
            ],
        )?;

        tx.execute(
            "DELETE FROM fabric_material_size WHERE material_name = ?1",
            params![profile.name],
        )?;
        for (idx, spec) in profile.sizes.iter().enumerate() {
            tx.execute(
                r#"
                INSERT INTO fabric_material_size (
                    material_name, size_code, seq_no, meters_per_unit, profit_per_unit
                ) VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
                params![
                    profile.name,
                    spec.size,
                    idx as i64,
                    spec.meters_per_unit,
                    spec.profit_per_unit,
                ],
            )?;
        }

        tx.execute(
            "DELETE FROM fabric_material_use WHERE material_name = ?1",
            params![profile.name],
        )?;
        for (idx, product) in profile.recommended_uses.iter().enumerate() {
            tx.execute(
                "INSERT INTO fabric_material_use (material_name, seq_no, product_name) VALUES (?1, ?2, ?3)",
                params![profile.name, idx as i64, product],
            )?;
        }
        Ok(())
    }

    /// 按名称查询
    ///
    /// # 返回
    /// - Ok(Some(MaterialProfile)): 找到面料
    /// - Ok(None): 未找到
    /// - Err: 数据库错误
    pub fn find_by_name(&self, name: &str) -> RepositoryResult<Option<MaterialProfile>> {
        let conn = self.get_conn()?;
        let header = conn
            .query_row(
                "SELECT name, price_per_meter, elasticity FROM fabric_material WHERE name = ?1",
                params![name],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, f64>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .optional()?;

        match header {
            Some((name, price, elasticity)) => {
                Ok(Some(Self::load_profile(&conn, name, price, &elasticity)?))
            }
            None => Ok(None),
        }
    }

    /// 查询全部面料（按 seq_no）
    pub fn list_all(&self) -> RepositoryResult<Vec<MaterialProfile>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT name, price_per_meter, elasticity FROM fabric_material ORDER BY seq_no, name",
        )?;
        let headers = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, f64>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        headers
            .into_iter()
            .map(|(name, price, elasticity)| Self::load_profile(&conn, name, price, &elasticity))
            .collect()
    }

    /// 删除面料（尺码/推荐用途级联删除）
    ///
    /// # 返回
    /// 是否删除了记录
    pub fn delete(&self, name: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM fabric_material WHERE name = ?1", params![name])?;
        Ok(affected > 0)
    }

    pub fn count(&self) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM fabric_material", [], |row| row.get(0))?;
        Ok(n as usize)
    }

    /// 面料表为空时写入初始数据
    ///
    /// # 返回
    /// 写入的面料数量（非空表返回 0）
    pub fn seed_if_empty(&self, materials: &[MaterialProfile]) -> RepositoryResult<usize> {
        if self.count()? > 0 {
            return Ok(0);
        }
        let count = self.batch_upsert(materials)?;
        info!(count, "已写入内置面料数据");
        Ok(count)
    }

    fn load_profile(
        conn: &Connection,
        name: String,
        price_per_meter: f64,
        elasticity: &str,
    ) -> RepositoryResult<MaterialProfile> {
        let elasticity: Elasticity =
            elasticity
                .parse()
                .map_err(|message| RepositoryError::FieldValueError {
                    field: "elasticity".to_string(),
                    message,
                })?;

        let mut stmt = conn.prepare(
            r#"
            SELECT size_code, meters_per_unit, profit_per_unit
            FROM fabric_material_size
            WHERE material_name = ?1
            ORDER BY seq_no
            "#,
        )?;
        let sizes = stmt
            .query_map(params![name], |row| {
                Ok(SizeSpec {
                    size: row.get(0)?,
                    meters_per_unit: row.get(1)?,
                    profit_per_unit: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut stmt = conn.prepare(
            "SELECT product_name FROM fabric_material_use WHERE material_name = ?1 ORDER BY seq_no",
        )?;
        let recommended_uses = stmt
            .query_map(params![name], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(MaterialProfile {
            name,
            sizes,
            price_per_meter,
            elasticity,
            recommended_uses,
        })
    }
}

impl FabricCatalog for MaterialRepository {
    fn get_material(&self, name: &str) -> CatalogResult<Option<MaterialProfile>> {
        Ok(self.find_by_name(name)?)
    }

    fn list_materials(&self) -> CatalogResult<Vec<MaterialProfile>> {
        Ok(self.list_all()?)
    }
}
