// ==========================================
// Mock 配置实现 - 用于集成测试
// ==========================================

use async_trait::async_trait;
use corrugated_ops::config::{DashboardConfigReader, DashboardSettings};
use corrugated_ops::domain::types::{DateFilter, EmptyJobPolicy, ResolverPrecision};
use std::error::Error;

/// Mock 配置结构
#[derive(Debug, Clone, Default)]
pub struct MockConfig {
    pub settings: DashboardSettings,
    /// 为 true 时所有读取都失败
    pub fail: bool,
}

impl MockConfig {
    /// 默认过滤器为指定值的配置
    pub fn with_default_filter(filter: DateFilter) -> Self {
        let mut config = Self::default();
        config.settings.default_date_filter = filter;
        config
    }

    /// 指定明细并发
    pub fn with_concurrency(concurrency: usize) -> Self {
        let mut config = Self::default();
        config.settings.detail_fetch_concurrency = concurrency;
        config
    }

    /// 读取总是失败的配置
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    fn check(&self) -> Result<(), Box<dyn Error>> {
        if self.fail {
            return Err("配置库不可用".into());
        }
        Ok(())
    }
}

#[async_trait]
impl DashboardConfigReader for MockConfig {
    async fn get_default_date_filter(&self) -> Result<DateFilter, Box<dyn Error>> {
        self.check()?;
        Ok(self.settings.default_date_filter)
    }

    async fn get_empty_job_policy(&self) -> Result<EmptyJobPolicy, Box<dyn Error>> {
        self.check()?;
        Ok(self.settings.empty_job_policy)
    }

    async fn get_job_table_precision(&self) -> Result<ResolverPrecision, Box<dyn Error>> {
        self.check()?;
        Ok(self.settings.job_table_precision)
    }

    async fn get_utc_offset_minutes(&self) -> Result<Option<i32>, Box<dyn Error>> {
        self.check()?;
        Ok(self.settings.utc_offset_minutes)
    }

    async fn get_detail_fetch_concurrency(&self) -> Result<usize, Box<dyn Error>> {
        self.check()?;
        Ok(self.settings.detail_fetch_concurrency)
    }
}
