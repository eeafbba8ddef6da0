// ==========================================
// 瓦楞纸箱生产运营看板 - 作业数据源
// ==========================================
// 职责: 定义看板所需的数据读取接口（作业计划 / 已完成作业 / 停机作业 / 机台 / 步骤明细）
// 实现:
// - InMemoryJobDataProvider: 内存数据集（测试、嵌入式调用）
// - FileJobDataProvider: 数据导出 JSON 文件（首次读取后缓存）
// 红线: 数据源不做状态判定，只搬运数据
// ==========================================

use crate::domain::job::{CompletedJob, DashboardDataset, HeldJob, JobPlan, MachineRecord};
use crate::domain::step::{StepCategory, StepDetails};
use crate::domain::types::DateFilter;
use crate::repository::error::{DataSourceError, DataSourceResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tokio::sync::OnceCell;
use tracing::{debug, instrument};

// ==========================================
// JobDataProvider Trait
// ==========================================
// filter 参数对应后端的 `?filter=` 查询参数；
// 内置实现不做服务端过滤，日期过滤统一在引擎层完成
#[async_trait]
pub trait JobDataProvider: Send + Sync {
    /// 作业计划（含步骤）
    async fn fetch_job_plans(&self, filter: DateFilter) -> DataSourceResult<Vec<JobPlan>>;

    /// 已完成作业
    async fn fetch_completed_jobs(&self, filter: DateFilter) -> DataSourceResult<Vec<CompletedJob>>;

    /// 停机作业（专用接口）
    async fn fetch_held_jobs(&self) -> DataSourceResult<Vec<HeldJob>>;

    /// 机台台账
    async fn fetch_machines(&self) -> DataSourceResult<Vec<MachineRecord>>;

    /// 单个步骤的实测明细
    ///
    /// 没有明细时返回 Ok(None) 或 Err(NotFound)，调用方两者同等处理。
    async fn fetch_step_detail(
        &self,
        category: StepCategory,
        step_id: i64,
    ) -> DataSourceResult<Option<StepDetails>>;
}

// ==========================================
// InMemoryJobDataProvider
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct InMemoryJobDataProvider {
    dataset: DashboardDataset,
    step_details: HashMap<i64, StepDetails>,
}

impl InMemoryJobDataProvider {
    pub fn new(dataset: DashboardDataset) -> Self {
        Self {
            dataset,
            step_details: HashMap::new(),
        }
    }

    /// 登记一个步骤明细（按步骤 id）
    pub fn with_step_detail(mut self, step_id: i64, details: StepDetails) -> Self {
        self.step_details.insert(step_id, details);
        self
    }

    pub fn dataset(&self) -> &DashboardDataset {
        &self.dataset
    }
}

#[async_trait]
impl JobDataProvider for InMemoryJobDataProvider {
    async fn fetch_job_plans(&self, _filter: DateFilter) -> DataSourceResult<Vec<JobPlan>> {
        Ok(self.dataset.job_plans.clone())
    }

    async fn fetch_completed_jobs(&self, _filter: DateFilter) -> DataSourceResult<Vec<CompletedJob>> {
        Ok(self.dataset.completed_jobs.clone())
    }

    async fn fetch_held_jobs(&self) -> DataSourceResult<Vec<HeldJob>> {
        Ok(self.dataset.held_jobs.clone())
    }

    async fn fetch_machines(&self) -> DataSourceResult<Vec<MachineRecord>> {
        Ok(self.dataset.machines.clone())
    }

    async fn fetch_step_detail(
        &self,
        _category: StepCategory,
        step_id: i64,
    ) -> DataSourceResult<Option<StepDetails>> {
        Ok(self.step_details.get(&step_id).cloned())
    }
}

// ==========================================
// FileJobDataProvider
// ==========================================

/// 数据导出文件格式
///
/// ```json
/// {
///   "jobPlans": [...], "completedJobs": [...], "heldJobs": [...], "machines": [...],
///   "stepDetails": { "101": { "data": { "status": "accept" } } }
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetExport {
    #[serde(flatten)]
    pub dataset: DashboardDataset,
    /// 步骤 id → 明细
    #[serde(default)]
    pub step_details: BTreeMap<String, StepDetails>,
}

pub struct FileJobDataProvider {
    path: PathBuf,
    cache: OnceCell<DatasetExport>,
}

impl FileJobDataProvider {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            cache: OnceCell::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 读取并解析导出文件（只读一次）
    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn export(&self) -> DataSourceResult<&DatasetExport> {
        self.cache
            .get_or_try_init(|| async {
                let raw = tokio::fs::read_to_string(&self.path).await?;
                let export: DatasetExport = serde_json::from_str(&raw)?;
                debug!(
                    job_plans = export.dataset.job_plans.len(),
                    completed_jobs = export.dataset.completed_jobs.len(),
                    held_jobs = export.dataset.held_jobs.len(),
                    machines = export.dataset.machines.len(),
                    step_details = export.step_details.len(),
                    "数据导出文件加载完成"
                );
                Ok::<_, DataSourceError>(export)
            })
            .await
    }
}

#[async_trait]
impl JobDataProvider for FileJobDataProvider {
    async fn fetch_job_plans(&self, _filter: DateFilter) -> DataSourceResult<Vec<JobPlan>> {
        Ok(self.export().await?.dataset.job_plans.clone())
    }

    async fn fetch_completed_jobs(&self, _filter: DateFilter) -> DataSourceResult<Vec<CompletedJob>> {
        Ok(self.export().await?.dataset.completed_jobs.clone())
    }

    async fn fetch_held_jobs(&self) -> DataSourceResult<Vec<HeldJob>> {
        Ok(self.export().await?.dataset.held_jobs.clone())
    }

    async fn fetch_machines(&self) -> DataSourceResult<Vec<MachineRecord>> {
        Ok(self.export().await?.dataset.machines.clone())
    }

    async fn fetch_step_detail(
        &self,
        category: StepCategory,
        step_id: i64,
    ) -> DataSourceResult<Option<StepDetails>> {
        let export = self.export().await?;
        match export.step_details.get(&step_id.to_string()) {
            Some(details) => Ok(Some(details.clone())),
            None => Err(DataSourceError::NotFound {
                entity: category.to_string(),
                id: step_id.to_string(),
            }),
        }
    }
}
