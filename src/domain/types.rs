// ==========================================
// 瓦楞纸箱生产运营看板 - 领域类型定义
// ==========================================
// 职责: 步骤原始状态、明细状态、归一状态、作业分类、日期过滤等枚举
// 红线: 所有从后端读入的状态字段都不允许反序列化失败（未知值落入 Unknown/Other）
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 步骤原始状态 (Primitive Step Status)
// ==========================================
// 由工作流引擎写入的 step.status
// 历史上出现过 in_progress，这里一并兼容
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    #[default]
    Planned,
    Start,
    Stop,
    Accept,
    MajorHold,
    InProgress,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepStatus::Planned => write!(f, "planned"),
            StepStatus::Start => write!(f, "start"),
            StepStatus::Stop => write!(f, "stop"),
            StepStatus::Accept => write!(f, "accept"),
            StepStatus::MajorHold => write!(f, "major_hold"),
            StepStatus::InProgress => write!(f, "in_progress"),
            StepStatus::Unknown => write!(f, "unknown"),
        }
    }
}

// ==========================================
// 明细状态 (Detail Status)
// ==========================================
// 出现在 stepDetails.status / stepDetails.data.status / 各工序子对象 / allStepDetails 台账
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetailStatus {
    Accept,
    InProgress,
    Hold,
    MajorHold,
    #[serde(other)]
    Other,
}

impl fmt::Display for DetailStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetailStatus::Accept => write!(f, "accept"),
            DetailStatus::InProgress => write!(f, "in_progress"),
            DetailStatus::Hold => write!(f, "hold"),
            DetailStatus::MajorHold => write!(f, "major_hold"),
            DetailStatus::Other => write!(f, "other"),
        }
    }
}

// ==========================================
// 归一状态 (Resolved Step Status)
// ==========================================
// 每个步骤最终只落到这四个状态之一
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolvedStatus {
    Completed,
    InProgress,
    Hold,
    Planned,
}

impl fmt::Display for ResolvedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolvedStatus::Completed => write!(f, "completed"),
            ResolvedStatus::InProgress => write!(f, "in_progress"),
            ResolvedStatus::Hold => write!(f, "hold"),
            ResolvedStatus::Planned => write!(f, "planned"),
        }
    }
}

// ==========================================
// 作业分类 (Job Category)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobCategory {
    Completed,
    Held,
    InProgress,
    Planned,
}

impl fmt::Display for JobCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobCategory::Completed => write!(f, "completed"),
            JobCategory::Held => write!(f, "held"),
            JobCategory::InProgress => write!(f, "in_progress"),
            JobCategory::Planned => write!(f, "planned"),
        }
    }
}

// ==========================================
// 作业需求等级 (Job Demand)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobDemand {
    Low,
    Medium,
    High,
    #[serde(other)]
    Unknown,
}

// ==========================================
// 状态判定精度 (Resolver Precision)
// ==========================================
// Lenient: 看板统计使用
// Strict: 作业计划表格使用（endDate 判完成，已有明细时不再信任原始 start/stop）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResolverPrecision {
    #[default]
    Lenient,
    Strict,
}

impl ResolverPrecision {
    /// 从配置字符串解析（未知值返回 None）
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "LENIENT" => Some(ResolverPrecision::Lenient),
            "STRICT" => Some(ResolverPrecision::Strict),
            _ => None,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            ResolverPrecision::Lenient => "LENIENT",
            ResolverPrecision::Strict => "STRICT",
        }
    }
}

// ==========================================
// 空作业策略 (Empty Job Policy)
// ==========================================
// 没有任何步骤的作业如何分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmptyJobPolicy {
    /// 空真：所有（零个）步骤都已完成
    #[default]
    Completed,
    Planned,
}

impl EmptyJobPolicy {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "COMPLETED" => Some(EmptyJobPolicy::Completed),
            "PLANNED" => Some(EmptyJobPolicy::Planned),
            _ => None,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            EmptyJobPolicy::Completed => "COMPLETED",
            EmptyJobPolicy::Planned => "PLANNED",
        }
    }
}

// ==========================================
// 日期过滤器 (Date Filter)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateFilter {
    /// 不过滤
    #[default]
    All,
    Today,
    Week,
    Month,
    Quarter,
    Year,
    Custom,
}

impl DateFilter {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "all" | "" => Some(DateFilter::All),
            "today" => Some(DateFilter::Today),
            "week" => Some(DateFilter::Week),
            "month" => Some(DateFilter::Month),
            "quarter" => Some(DateFilter::Quarter),
            "year" => Some(DateFilter::Year),
            "custom" => Some(DateFilter::Custom),
            _ => None,
        }
    }
}

impl fmt::Display for DateFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateFilter::All => write!(f, "all"),
            DateFilter::Today => write!(f, "today"),
            DateFilter::Week => write!(f, "week"),
            DateFilter::Month => write!(f, "month"),
            DateFilter::Quarter => write!(f, "quarter"),
            DateFilter::Year => write!(f, "year"),
            DateFilter::Custom => write!(f, "custom"),
        }
    }
}

/// 自定义日期范围（前端传入的原始字符串）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomRange {
    pub start: Option<String>,
    pub end: Option<String>,
}

impl CustomRange {
    pub fn new(start: &str, end: &str) -> Self {
        Self {
            start: Some(start.to_string()),
            end: Some(end.to_string()),
        }
    }
}

/// 已解析的日历日期窗口（闭区间，按本地日历）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}
