// ==========================================
// 服装裁剪排产系统 - 排产 API
// ==========================================
// 职责: 面料查询、面料推荐、成衣排产、排产记录
// 流程: 面料目录解析 → 分配编排 → (可选) 记录落库
// ==========================================

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::catalog::{self, FabricCatalog};
use crate::config::AllocationConfig;
use crate::domain::allocation::{AllocationRequest, AllocationResult};
use crate::domain::material::MaterialProfile;
use crate::domain::plan::PlanRecord;
use crate::engine::AllocationOrchestrator;
use crate::repository::PlanRepository;

/// 排产记录默认返回条数
pub const DEFAULT_HISTORY_LIMIT: usize = 20;

// ==========================================
// PlanningApi - 排产 API
// ==========================================

/// 排产API
///
/// 职责：
/// 1. 面料档案查询与按产品推荐
/// 2. 执行成衣排产（面料不存在时返回 MaterialNotFound）
/// 3. 排产记录保存与查询（需注入 PlanRepository）
pub struct PlanningApi {
    catalog: Arc<dyn FabricCatalog>,
    plan_repo: Option<Arc<PlanRepository>>,
    orchestrator: AllocationOrchestrator,
}

impl PlanningApi {
    /// 创建新的PlanningApi实例（不含记录仓储）
    pub fn new(catalog: Arc<dyn FabricCatalog>, config: AllocationConfig) -> Self {
        Self {
            catalog,
            plan_repo: None,
            orchestrator: AllocationOrchestrator::new(config),
        }
    }

    /// 注入排产记录仓储
    pub fn with_plan_repository(mut self, plan_repo: Arc<PlanRepository>) -> Self {
        self.plan_repo = Some(plan_repo);
        self
    }

    pub fn config(&self) -> &AllocationConfig {
        self.orchestrator.config()
    }

    // ==========================================
    // 面料查询
    // ==========================================

    pub fn list_materials(&self) -> ApiResult<Vec<MaterialProfile>> {
        Ok(self.catalog.list_materials()?)
    }

    /// 查询面料档案
    ///
    /// # 返回
    /// - Err(ApiError::MaterialNotFound): 目录中无此面料
    pub fn get_material(&self, name: &str) -> ApiResult<MaterialProfile> {
        self.catalog
            .get_material(name)?
            .ok_or_else(|| ApiError::MaterialNotFound(name.to_string()))
    }

    /// 按产品推荐面料（无匹配时返回全部面料）
    pub fn recommend_materials(&self, product: &str) -> ApiResult<Vec<String>> {
        let product = product.trim();
        if product.is_empty() {
            return Err(ApiError::InvalidInput("产品名称不能为空".to_string()));
        }
        Ok(catalog::recommend(self.catalog.as_ref(), product)?)
    }

    // ==========================================
    // 排产
    // ==========================================

    /// 执行排产（不落库）
    #[instrument(skip(self, request), fields(material = %request.material))]
    pub fn plan(&self, request: &AllocationRequest) -> ApiResult<AllocationResult> {
        let profile = self.get_material(&request.material)?;
        self.orchestrator
            .allocate(&profile, request)
            .map_err(|err| {
                warn!(error = %err, "排产失败");
                ApiError::from(err)
            })
    }

    /// 执行排产并保存记录
    ///
    /// # 返回
    /// - Ok(PlanRecord): 已保存的排产记录
    /// - Err(ApiError::InternalError): 未注入记录仓储
    pub fn plan_and_save(
        &self,
        request: &AllocationRequest,
        created_by: Option<&str>,
    ) -> ApiResult<PlanRecord> {
        let repo = self.require_plan_repo()?;
        let result = self.plan(request)?;

        let record = PlanRecord::new(request.clone(), result, created_by);
        repo.insert(&record)?;

        info!(plan_id = %record.plan_id, material = %record.request.material, "排产记录已保存");
        Ok(record)
    }

    // ==========================================
    // 排产记录
    // ==========================================

    pub fn list_plans(&self, limit: usize) -> ApiResult<Vec<PlanRecord>> {
        let limit = if limit == 0 { DEFAULT_HISTORY_LIMIT } else { limit };
        Ok(self.require_plan_repo()?.list_recent(limit)?)
    }

    pub fn list_plans_by_material(&self, material: &str) -> ApiResult<Vec<PlanRecord>> {
        Ok(self.require_plan_repo()?.list_by_material(material)?)
    }

    pub fn get_plan(&self, plan_id: &str) -> ApiResult<PlanRecord> {
        self.require_plan_repo()?
            .find_by_id(plan_id)?
            .ok_or_else(|| ApiError::NotFound(format!("PlanRecord(id={})不存在", plan_id)))
    }

    fn require_plan_repo(&self) -> ApiResult<&PlanRepository> {
        self.plan_repo
            .as_deref()
            .ok_or_else(|| ApiError::InternalError("排产记录仓储未初始化".to_string()))
    }
}
