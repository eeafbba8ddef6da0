// ==========================================
// 瓦楞纸箱生产运营看板 - 引擎层
// ==========================================
// 职责: 状态归一、作业分类、工序统计、时间序列、机台利用率、快照构建
// 红线: 引擎均为纯计算，不做 I/O；日期"今天"由 LocalCalendar 注入
// ==========================================

pub mod aggregate_builder;
pub mod date_range;
pub mod job_classifier;
pub mod machine_utilization;
pub mod status_resolver;
pub mod step_statistics;
pub mod time_series;

// 重导出核心引擎
pub use aggregate_builder::{AlwaysCurrentCounts, DashboardAggregateBuilder, JobPlanTableBuilder};
pub use date_range::{filter_dataset, range_for, LocalCalendar};
pub use job_classifier::{JobClassification, JobClassifier};
pub use machine_utilization::summarize_machines;
pub use status_resolver::{
    resolve_step_status, resolve_step_status_strict, step_has_major_hold, ResolutionRule,
    StatusResolution, StatusResolver,
};
pub use step_statistics::{merge_alias_buckets, StepStatistics, StepStatisticsAggregator};
pub use time_series::TimeSeriesBinner;
