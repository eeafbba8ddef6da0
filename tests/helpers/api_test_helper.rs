// ==========================================
// API集成测试辅助工具
// ==========================================
// 职责: 提供 DashboardApi 集成测试的数据源替身与测试环境
// ==========================================

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{FixedOffset, NaiveDate};

use corrugated_ops::api::DashboardApi;
use corrugated_ops::domain::job::{CompletedJob, DashboardDataset, HeldJob, JobPlan, MachineRecord};
use corrugated_ops::domain::step::{StepCategory, StepDetails};
use corrugated_ops::domain::types::DateFilter;
use corrugated_ops::engine::LocalCalendar;
use corrugated_ops::repository::{
    DataSourceError, DataSourceResult, InMemoryJobDataProvider, JobDataProvider,
};

use super::mock_config::MockConfig;

// ==========================================
// CountingProvider - 记录调用次数的数据源
// ==========================================

#[derive(Default)]
pub struct CountingProvider {
    inner: InMemoryJobDataProvider,
    pub job_plan_calls: AtomicUsize,
    pub completed_calls: AtomicUsize,
    pub held_calls: AtomicUsize,
    pub machine_calls: AtomicUsize,
    pub detail_calls: AtomicUsize,
    /// 为 true 时机台接口返回网络错误
    pub fail_machines: bool,
    /// 为 true 时明细接口一律返回 NotFound
    pub details_not_found: bool,
}

impl CountingProvider {
    pub fn new(inner: InMemoryJobDataProvider) -> Self {
        Self {
            inner,
            ..Self::default()
        }
    }

    pub fn from_dataset(dataset: DashboardDataset) -> Self {
        Self::new(InMemoryJobDataProvider::new(dataset))
    }

    pub fn machine_calls(&self) -> usize {
        self.machine_calls.load(Ordering::SeqCst)
    }

    pub fn detail_calls(&self) -> usize {
        self.detail_calls.load(Ordering::SeqCst)
    }

    pub fn job_plan_calls(&self) -> usize {
        self.job_plan_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl JobDataProvider for CountingProvider {
    async fn fetch_job_plans(&self, filter: DateFilter) -> DataSourceResult<Vec<JobPlan>> {
        self.job_plan_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.fetch_job_plans(filter).await
    }

    async fn fetch_completed_jobs(&self, filter: DateFilter) -> DataSourceResult<Vec<CompletedJob>> {
        self.completed_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.fetch_completed_jobs(filter).await
    }

    async fn fetch_held_jobs(&self) -> DataSourceResult<Vec<HeldJob>> {
        self.held_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.fetch_held_jobs().await
    }

    async fn fetch_machines(&self) -> DataSourceResult<Vec<MachineRecord>> {
        self.machine_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_machines {
            return Err(DataSourceError::Network("machines endpoint unreachable".to_string()));
        }
        self.inner.fetch_machines().await
    }

    async fn fetch_step_detail(
        &self,
        category: StepCategory,
        step_id: i64,
    ) -> DataSourceResult<Option<StepDetails>> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        if self.details_not_found {
            return Err(DataSourceError::NotFound {
                entity: category.to_string(),
                id: step_id.to_string(),
            });
        }
        self.inner.fetch_step_detail(category, step_id).await
    }
}

// ==========================================
// API测试环境
// ==========================================

/// UTC 日历，"今天"固定
pub fn fixed_calendar(year: i32, month: u32, day: u32) -> LocalCalendar {
    LocalCalendar::new(
        FixedOffset::east_opt(0).expect("UTC 偏移"),
        NaiveDate::from_ymd_opt(year, month, day).expect("合法日期"),
    )
}

pub struct ApiTestEnv {
    pub api: DashboardApi,
    pub provider: Arc<CountingProvider>,
}

impl ApiTestEnv {
    pub fn new(dataset: DashboardDataset, config: MockConfig, calendar: LocalCalendar) -> Self {
        Self::with_provider(CountingProvider::from_dataset(dataset), config, calendar)
    }

    pub fn with_provider(
        provider: CountingProvider,
        config: MockConfig,
        calendar: LocalCalendar,
    ) -> Self {
        let provider = Arc::new(provider);
        let api = DashboardApi::new(provider.clone(), Arc::new(config)).with_calendar(calendar);
        Self { api, provider }
    }
}
