// ==========================================
// 瓦楞纸箱生产运营看板 - 看板配置读取 Trait
// ==========================================
// 职责: 定义看板所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::domain::types::{DateFilter, EmptyJobPolicy, ResolverPrecision};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::error::Error;

/// 明细拉取默认并发数
pub const DEFAULT_DETAIL_FETCH_CONCURRENCY: usize = 8;

// ==========================================
// DashboardSettings - 一次刷新使用的配置集合
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSettings {
    pub default_date_filter: DateFilter,
    pub empty_job_policy: EmptyJobPolicy,
    pub job_table_precision: ResolverPrecision,
    /// None 表示使用系统本地时区
    pub utc_offset_minutes: Option<i32>,
    pub detail_fetch_concurrency: usize,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            default_date_filter: DateFilter::All,
            empty_job_policy: EmptyJobPolicy::Completed,
            job_table_precision: ResolverPrecision::Strict,
            utc_offset_minutes: None,
            detail_fetch_concurrency: DEFAULT_DETAIL_FETCH_CONCURRENCY,
        }
    }
}

// ==========================================
// DashboardConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait DashboardConfigReader: Send + Sync {
    /// 看板打开时的默认日期过滤器
    ///
    /// # 默认值
    /// - all
    async fn get_default_date_filter(&self) -> Result<DateFilter, Box<dyn Error>>;

    /// 没有任何步骤的作业如何分类
    ///
    /// # 默认值
    /// - COMPLETED
    async fn get_empty_job_policy(&self) -> Result<EmptyJobPolicy, Box<dyn Error>>;

    /// 作业计划表格使用的判定口径
    ///
    /// # 默认值
    /// - STRICT
    async fn get_job_table_precision(&self) -> Result<ResolverPrecision, Box<dyn Error>>;

    /// 本地日历的 UTC 偏移（分钟）
    ///
    /// # 返回
    /// - None: 未配置，使用系统本地时区
    async fn get_utc_offset_minutes(&self) -> Result<Option<i32>, Box<dyn Error>>;

    /// 步骤明细拉取并发上限
    ///
    /// # 默认值
    /// - 8
    async fn get_detail_fetch_concurrency(&self) -> Result<usize, Box<dyn Error>>;

    /// 一次读取全部看板配置
    async fn load_settings(&self) -> Result<DashboardSettings, Box<dyn Error>> {
        // 逐项绑定后再组装，避免 Box<dyn Error> 临时值跨 await 存活
        let default_date_filter = self.get_default_date_filter().await?;
        let empty_job_policy = self.get_empty_job_policy().await?;
        let job_table_precision = self.get_job_table_precision().await?;
        let utc_offset_minutes = self.get_utc_offset_minutes().await?;
        let detail_fetch_concurrency = self.get_detail_fetch_concurrency().await?;

        Ok(DashboardSettings {
            default_date_filter,
            empty_job_policy,
            job_table_precision,
            utc_offset_minutes,
            detail_fetch_concurrency,
        })
    }
}
