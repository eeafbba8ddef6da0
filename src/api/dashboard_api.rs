// ==========================================
// 瓦楞纸箱生产运营看板 - 看板 API
// ==========================================
// 职责: 拉取数据 → 补全步骤明细 → 构建快照；日期过滤切换；工序下钻；作业计划表格
// 架构: API 层 → 数据源 (JobDataProvider) + 引擎层 (DashboardAggregateBuilder)
// 红线:
// - 每次刷新四个数据接口并发各拉一次，机台台账只拉一次
// - 步骤明细只为缺少 stepDetails 的 start/stop 步骤拉取，并发受配置限制
// - 任一数据接口失败则整次刷新失败，不产出半成品快照
// ==========================================

use std::sync::Arc;

use chrono::Utc;
use futures::stream::{self, StreamExt, TryStreamExt};
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};

use crate::api::error::{ApiError, ApiResult};
use crate::config::dashboard_config_trait::{DashboardConfigReader, DashboardSettings};
use crate::domain::job::{DashboardDataset, JobPlan};
use crate::domain::snapshot::{AggregateSnapshot, JobPlanRow, StepDrillDown};
use crate::domain::step::{StepCategory, StepDetails};
use crate::domain::types::{CustomRange, DateFilter, ResolvedStatus};
use crate::engine::aggregate_builder::{DashboardAggregateBuilder, JobPlanTableBuilder};
use crate::engine::date_range::{filter_dataset, LocalCalendar};
use crate::repository::job_data_provider::JobDataProvider;

/// 最近一次刷新的结果
struct DashboardState {
    settings: DashboardSettings,
    calendar: LocalCalendar,
    dataset: DashboardDataset,
    /// 未过滤快照（heldJobs / majorHoldJobs 的来源）
    unfiltered: AggregateSnapshot,
    /// 当前过滤器下的快照
    current: AggregateSnapshot,
    custom: Option<CustomRange>,
}

impl DashboardState {
    fn builder(&self) -> DashboardAggregateBuilder {
        DashboardAggregateBuilder::new(self.settings.empty_job_policy, self.calendar)
    }
}

// ==========================================
// DashboardApi - 看板 API
// ==========================================
pub struct DashboardApi {
    provider: Arc<dyn JobDataProvider>,
    config: Arc<dyn DashboardConfigReader>,
    /// 固定日历（测试 / 回放用）；None 时按配置的偏移取当前时间
    fixed_calendar: Option<LocalCalendar>,
    state: RwLock<Option<DashboardState>>,
}

impl DashboardApi {
    /// 创建新的DashboardApi实例
    ///
    /// # 参数
    /// - provider: 作业数据源
    /// - config: 看板配置读取器
    pub fn new(provider: Arc<dyn JobDataProvider>, config: Arc<dyn DashboardConfigReader>) -> Self {
        Self {
            provider,
            config,
            fixed_calendar: None,
            state: RwLock::new(None),
        }
    }

    /// 固定"今天"和时区偏移
    pub fn with_calendar(mut self, calendar: LocalCalendar) -> Self {
        self.fixed_calendar = Some(calendar);
        self
    }

    // ==========================================
    // 数据加载
    // ==========================================

    /// 读取看板配置
    pub async fn load_settings(&self) -> ApiResult<DashboardSettings> {
        self.config
            .load_settings()
            .await
            .map_err(|e| ApiError::ConfigError(e.to_string()))
    }

    /// 拉取一次聚合所需的全部数据
    ///
    /// 四个数据接口并发拉取（始终不带服务端过滤，日期过滤在引擎层完成，
    /// 以保证停机类计数取自完整数据），随后补全步骤明细。
    ///
    /// # 参数
    /// - detail_concurrency: 步骤明细并发上限
    #[instrument(skip(self))]
    pub async fn load_dataset(&self, detail_concurrency: usize) -> ApiResult<DashboardDataset> {
        let (mut job_plans, completed_jobs, held_jobs, machines) = tokio::try_join!(
            self.provider.fetch_job_plans(DateFilter::All),
            self.provider.fetch_completed_jobs(DateFilter::All),
            self.provider.fetch_held_jobs(),
            self.provider.fetch_machines(),
        )?;

        let attached = self
            .enrich_step_details(&mut job_plans, detail_concurrency)
            .await?;

        info!(
            job_plans = job_plans.len(),
            completed_jobs = completed_jobs.len(),
            held_jobs = held_jobs.len(),
            machines = machines.len(),
            step_details_attached = attached,
            "看板数据拉取完成"
        );

        Ok(DashboardDataset {
            job_plans,
            completed_jobs,
            held_jobs,
            machines,
        })
    }

    /// 为缺少 stepDetails 的 start/stop 步骤补全明细
    ///
    /// 明细不存在（None 或 NotFound）时步骤保持原样。
    ///
    /// # 返回
    /// - 实际挂上明细的步骤数
    async fn enrich_step_details(
        &self,
        job_plans: &mut [JobPlan],
        concurrency: usize,
    ) -> ApiResult<usize> {
        let lookups: Vec<(usize, usize, StepCategory, i64)> = job_plans
            .iter()
            .enumerate()
            .flat_map(|(plan_idx, plan)| {
                plan.steps
                    .iter()
                    .enumerate()
                    .filter(|(_, step)| step.needs_detail_lookup())
                    .filter_map(move |(step_idx, step)| {
                        Some((plan_idx, step_idx, step.category()?, step.id?))
                    })
            })
            .collect();

        if lookups.is_empty() {
            return Ok(0);
        }
        debug!(lookups = lookups.len(), concurrency, "开始拉取步骤明细");

        let provider = &self.provider;
        let results: Vec<(usize, usize, Option<StepDetails>)> = stream::iter(lookups)
            .map(|(plan_idx, step_idx, category, step_id)| async move {
                match provider.fetch_step_detail(category, step_id).await {
                    Ok(details) => Ok((plan_idx, step_idx, details)),
                    Err(e) if e.is_not_found() => Ok((plan_idx, step_idx, None)),
                    Err(e) => Err(e),
                }
            })
            .buffer_unordered(concurrency.max(1))
            .try_collect()
            .await?;

        let mut attached = 0;
        for (plan_idx, step_idx, details) in results {
            if let Some(details) = details {
                job_plans[plan_idx].steps[step_idx].step_details = Some(details);
                attached += 1;
            }
        }
        Ok(attached)
    }

    fn calendar_for(&self, settings: &DashboardSettings) -> LocalCalendar {
        if let Some(calendar) = self.fixed_calendar {
            return calendar;
        }
        match settings.utc_offset_minutes {
            Some(minutes) => LocalCalendar::with_offset_minutes(minutes, Utc::now()),
            None => LocalCalendar::system_now(),
        }
    }

    // ==========================================
    // 快照
    // ==========================================

    /// 重新拉取数据并构建快照
    ///
    /// 首次刷新使用配置的默认日期过滤器；之后沿用用户当前选择的过滤器。
    ///
    /// # 返回
    /// - Ok(AggregateSnapshot): 当前过滤器下的快照
    /// - Err(ApiError): 配置读取失败 / 任一数据接口失败
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> ApiResult<AggregateSnapshot> {
        let settings = self.load_settings().await?;
        let calendar = self.calendar_for(&settings);
        let dataset = self.load_dataset(settings.detail_fetch_concurrency).await?;

        let builder = DashboardAggregateBuilder::new(settings.empty_job_policy, calendar);
        let unfiltered = builder.build(&dataset);

        let previous = self
            .state
            .read()
            .await
            .as_ref()
            .map(|s| (s.current.date_filter, s.custom.clone()));
        let (filter, custom) = previous.unwrap_or((settings.default_date_filter, None));

        let current = if filter == DateFilter::All {
            unfiltered.clone()
        } else {
            builder.rebuild_for_filter(&dataset, &unfiltered, filter, custom.as_ref())
        };

        *self.state.write().await = Some(DashboardState {
            settings,
            calendar,
            dataset,
            unfiltered,
            current: current.clone(),
            custom,
        });

        Ok(current)
    }

    /// 切换日期过滤器
    ///
    /// 不重新拉取数据：基于最近一次刷新的数据集重算，
    /// heldJobs / majorHoldJobs 从未过滤快照带入。尚未刷新过时先刷新一次。
    ///
    /// # 参数
    /// - filter: 日期过滤器
    /// - custom: 自定义范围（仅 Custom 使用；缺失或无法解析时按不过滤处理）
    #[instrument(skip(self, custom))]
    pub async fn apply_date_filter(
        &self,
        filter: DateFilter,
        custom: Option<CustomRange>,
    ) -> ApiResult<AggregateSnapshot> {
        self.ensure_loaded().await?;

        let mut guard = self.state.write().await;
        let state = guard.as_mut().ok_or_else(not_loaded)?;

        let snapshot = if filter == DateFilter::All {
            state.unfiltered.clone()
        } else {
            state
                .builder()
                .rebuild_for_filter(&state.dataset, &state.unfiltered, filter, custom.as_ref())
        };

        state.current = snapshot.clone();
        state.custom = custom;
        Ok(snapshot)
    }

    /// 最近一次构建的快照（未刷新过时为 None）
    pub async fn current_snapshot(&self) -> Option<AggregateSnapshot> {
        self.state.read().await.as_ref().map(|s| s.current.clone())
    }

    // ==========================================
    // 下钻 / 表格
    // ==========================================

    /// 工序下钻：某工序在某状态下的作业列表
    ///
    /// # 参数
    /// - step_key: 工序名（标准名或别名均可，未知步骤用原始名）
    /// - status: 归一状态（hold 与 planned 共用计划中列表）
    ///
    /// # 返回
    /// - Err(NotFound): 当前过滤范围内没有该工序
    pub async fn get_step_jobs(
        &self,
        step_key: &str,
        status: ResolvedStatus,
    ) -> ApiResult<StepDrillDown> {
        let trimmed = step_key.trim();
        if trimmed.is_empty() {
            return Err(ApiError::InvalidInput("工序名不能为空".to_string()));
        }
        let key = StepCategory::from_step_name(trimmed)
            .map(|c| c.canonical_name().to_string())
            .unwrap_or_else(|| trimmed.to_string());

        self.ensure_loaded().await?;
        let guard = self.state.read().await;
        let state = guard.as_ref().ok_or_else(not_loaded)?;

        let bucket = state
            .current
            .step_completion_stats
            .get(&key)
            .ok_or_else(|| ApiError::NotFound(format!("工序{}在当前过滤范围内没有作业", key)))?;

        let jobs = bucket.jobs_for(status).to_vec();
        let job_plans = jobs
            .iter()
            .filter_map(|job| state.dataset.find_job_plan(&job.nrc_job_no))
            .cloned()
            .collect();

        Ok(StepDrillDown {
            step_key: key,
            status,
            jobs,
            job_plans,
        })
    }

    /// 作业计划表格（当前过滤范围内的活跃作业，按配置的判定口径）
    pub async fn list_job_plan_rows(&self) -> ApiResult<Vec<JobPlanRow>> {
        self.ensure_loaded().await?;
        let guard = self.state.read().await;
        let state = guard.as_ref().ok_or_else(not_loaded)?;

        let filtered = filter_dataset(&state.dataset, state.current.range.as_ref(), &state.calendar);
        let table = JobPlanTableBuilder::new(
            state.settings.job_table_precision,
            state.settings.empty_job_policy,
        );
        Ok(table.build_rows(filtered.active_job_plans()))
    }

    async fn ensure_loaded(&self) -> ApiResult<()> {
        let loaded = self.state.read().await.is_some();
        if !loaded {
            self.refresh().await?;
        }
        Ok(())
    }
}

fn not_loaded() -> ApiError {
    ApiError::InternalError("看板数据尚未加载".to_string())
}
