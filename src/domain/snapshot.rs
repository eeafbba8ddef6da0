// ==========================================
// 瓦楞纸箱生产运营看板 - 聚合快照
// ==========================================
// 职责: 引擎输出结构，所有看板视图都从同一份快照渲染
// ==========================================

use crate::domain::job::JobPlan;
use crate::domain::step::StepCategory;
use crate::domain::types::{DateFilter, DateRange, JobCategory, JobDemand, ResolvedStatus};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 作业回溯引用（用于从统计数字下钻到具体作业）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRef {
    pub job_plan_id: Option<i64>,
    pub nrc_job_no: String,
}

impl JobRef {
    pub fn from_plan(plan: &JobPlan) -> Self {
        Self {
            job_plan_id: plan.job_plan_id,
            nrc_job_no: plan.nrc_job_no.clone(),
        }
    }
}

// ==========================================
// StepBucket - 单个工序的计数桶
// ==========================================
// completed + in_progress + planned == 含该工序的作业数
// hold 计入 planned（不推进、未完成），on_hold 单独记录其中的停机数量
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepBucket {
    pub completed: u32,
    pub in_progress: u32,
    pub planned: u32,
    pub on_hold: u32,
    pub completed_jobs: Vec<JobRef>,
    pub in_progress_jobs: Vec<JobRef>,
    pub planned_jobs: Vec<JobRef>,
}

impl StepBucket {
    /// 记录一个作业在该工序上的归一状态
    pub fn record(&mut self, status: ResolvedStatus, job: JobRef) {
        match status {
            ResolvedStatus::Completed => {
                self.completed += 1;
                self.completed_jobs.push(job);
            }
            ResolvedStatus::InProgress => {
                self.in_progress += 1;
                self.in_progress_jobs.push(job);
            }
            ResolvedStatus::Hold => {
                self.planned += 1;
                self.on_hold += 1;
                self.planned_jobs.push(job);
            }
            ResolvedStatus::Planned => {
                self.planned += 1;
                self.planned_jobs.push(job);
            }
        }
    }

    /// 合并另一个桶（计数相加，回溯列表拼接）
    pub fn absorb(&mut self, other: StepBucket) {
        self.completed += other.completed;
        self.in_progress += other.in_progress;
        self.planned += other.planned;
        self.on_hold += other.on_hold;
        self.completed_jobs.extend(other.completed_jobs);
        self.in_progress_jobs.extend(other.in_progress_jobs);
        self.planned_jobs.extend(other.planned_jobs);
    }

    pub fn total(&self) -> u32 {
        self.completed + self.in_progress + self.planned
    }

    /// 按归一状态取回溯列表（hold 对应 planned 列表）
    pub fn jobs_for(&self, status: ResolvedStatus) -> &[JobRef] {
        match status {
            ResolvedStatus::Completed => &self.completed_jobs,
            ResolvedStatus::InProgress => &self.in_progress_jobs,
            ResolvedStatus::Hold | ResolvedStatus::Planned => &self.planned_jobs,
        }
    }
}

/// 按日统计点
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeriesPoint {
    /// YYYY-MM-DD（本地日历）
    pub date: String,
    pub jobs_started: u32,
    pub jobs_completed: u32,
    pub total_steps: u32,
    pub completed_steps: u32,
}

impl TimeSeriesPoint {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date: date.format("%Y-%m-%d").to_string(),
            jobs_started: 0,
            jobs_completed: 0,
            total_steps: 0,
            completed_steps: 0,
        }
    }
}

/// 单一机型的使用情况
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineTypeUsage {
    pub total: u32,
    pub busy: u32,
}

/// 机台利用率
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineUtilization {
    pub total_machines: u32,
    pub active_machines: u32,
    pub available_machines: u32,
    pub maintenance_machines: u32,
    pub inactive_machines: u32,
    /// 0..=100
    pub utilization_rate: u32,
    pub by_type: BTreeMap<String, MachineTypeUsage>,
}

// ==========================================
// AggregateSnapshot - 看板聚合快照
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateSnapshot {
    pub as_of: NaiveDate,
    pub date_filter: DateFilter,
    pub range: Option<DateRange>,

    /// 活跃作业计划数 + 已完成作业数
    pub total_jobs: u32,
    pub completed_jobs: u32,
    pub in_progress_jobs: u32,
    pub planned_jobs: u32,
    /// 步骤全部完成但尚未进入已完成列表的作业计划
    pub pending_closeout_jobs: u32,
    /// 步骤级判定为停机的作业计划（区别于 held_jobs 的停机接口口径）
    pub on_hold_plans: u32,

    /// 始终取当前值，不受日期过滤影响
    pub held_jobs: u32,
    pub major_hold_jobs: u32,

    pub total_steps: u32,
    pub completed_steps: u32,
    /// 0..=100
    pub efficiency: u32,
    pub active_users: u32,

    pub step_completion_stats: BTreeMap<String, StepBucket>,
    pub time_series_data: Vec<TimeSeriesPoint>,
    pub machine_utilization: MachineUtilization,
}

// ==========================================
// 作业计划表格行（严格口径）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepStatusCell {
    pub step_name: String,
    pub category: Option<StepCategory>,
    pub status: ResolvedStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPlanRow {
    pub job_plan_id: Option<i64>,
    pub nrc_job_no: String,
    pub job_demand: Option<JobDemand>,
    pub category: JobCategory,
    pub completed_steps: u32,
    pub total_steps: u32,
    /// 0..=100
    pub progress: u32,
    pub steps: Vec<StepStatusCell>,
}

/// 下钻结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepDrillDown {
    pub step_key: String,
    pub status: ResolvedStatus,
    pub jobs: Vec<JobRef>,
    /// 仍在作业计划列表中的对应作业（已完成作业不在此列）
    pub job_plans: Vec<JobPlan>,
}

/// 百分比（四舍五入，分母为 0 时返回 0）
pub fn percentage(part: u32, whole: u32) -> u32 {
    if whole == 0 {
        return 0;
    }
    ((part as f64 / whole as f64) * 100.0).round() as u32
}
