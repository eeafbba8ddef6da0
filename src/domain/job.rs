// ==========================================
// 瓦楞纸箱生产运营看板 - 作业实体
// ==========================================
// 职责: 作业计划 / 已完成作业 / 停机作业 / 机台 等外部数据形状
// 说明: 字段名与后端 JSON 保持 camelCase 一致
// ==========================================

use crate::domain::step::{lenient_string, Step, StepCategory};
use crate::domain::types::{DetailStatus, JobDemand};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet, HashSet};

// ==========================================
// JobPlan - 作业计划
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPlan {
    #[serde(default)]
    pub job_plan_id: Option<i64>,
    /// 业务主键
    pub nrc_job_no: String,
    #[serde(default)]
    pub job_demand: Option<JobDemand>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

// ==========================================
// CompletedJob - 已完成作业
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedJob {
    #[serde(default)]
    pub id: Option<i64>,
    pub nrc_job_no: String,
    #[serde(default)]
    pub job_plan_id: Option<i64>,
    #[serde(default)]
    pub completed_at: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    /// 完工台账：工序字段名 → 记录列表
    #[serde(default)]
    pub all_step_details: BTreeMap<String, Vec<LedgerEntry>>,
    #[serde(default)]
    pub job_details: Option<Value>,
    #[serde(default)]
    pub purchase_order_details: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    #[serde(default)]
    pub status: Option<DetailStatus>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl CompletedJob {
    /// 台账中至少有一条 accept 记录的工序（按生产顺序，去重）
    ///
    /// 未能识别的台账字段直接忽略。
    pub fn accepted_categories(&self) -> Vec<StepCategory> {
        let accepted: BTreeSet<StepCategory> = self
            .all_step_details
            .iter()
            .filter(|(_, entries)| {
                entries
                    .iter()
                    .any(|e| e.status == Some(DetailStatus::Accept))
            })
            .filter_map(|(key, _)| StepCategory::from_record_key(key))
            .collect();

        accepted.into_iter().collect()
    }
}

// ==========================================
// HeldJob - 停机作业（专用接口，不从步骤推算）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeldJob {
    #[serde(default)]
    pub job_planning_id: Option<i64>,
    #[serde(default)]
    pub nrc_job_no: Option<String>,
    #[serde(default)]
    pub held_machines: Vec<HeldMachine>,
    #[serde(default)]
    pub total_held_machines: Option<u32>,
}

impl HeldJob {
    /// 去重键：优先 jobPlanningId，其次 nrcJobNo
    pub fn dedup_key(&self) -> Option<String> {
        self.job_planning_id
            .map(|id| format!("plan:{}", id))
            .or_else(|| self.nrc_job_no.as_ref().map(|no| format!("job:{}", no)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeldMachine {
    #[serde(default, deserialize_with = "lenient_string")]
    pub machine_id: Option<String>,
    #[serde(default)]
    pub machine_code: Option<String>,
    #[serde(default)]
    pub step_name: Option<String>,
    #[serde(default)]
    pub hold_remark: Option<String>,
    #[serde(default)]
    pub held_at: Option<String>,
}

// ==========================================
// MachineRecord - 机台台账
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MachineStatus {
    Available,
    Busy,
    Maintenance,
    Inactive,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default)]
    pub machine_code: Option<String>,
    #[serde(default)]
    pub machine_type: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub status: MachineStatus,
    #[serde(default)]
    pub is_active: Option<bool>,
}

// ==========================================
// DashboardDataset - 一次聚合所需的全部原始数据
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardDataset {
    #[serde(default)]
    pub job_plans: Vec<JobPlan>,
    #[serde(default)]
    pub completed_jobs: Vec<CompletedJob>,
    #[serde(default)]
    pub held_jobs: Vec<HeldJob>,
    #[serde(default)]
    pub machines: Vec<MachineRecord>,
}

impl DashboardDataset {
    /// 尚未出现在已完成列表中的作业计划
    ///
    /// 出现在已完成列表中的作业计划被视为已被取代，不再参与进行中/计划中统计。
    pub fn active_job_plans(&self) -> Vec<&JobPlan> {
        let completed: HashSet<&str> = self
            .completed_jobs
            .iter()
            .map(|j| j.nrc_job_no.as_str())
            .collect();

        self.job_plans
            .iter()
            .filter(|plan| !completed.contains(plan.nrc_job_no.as_str()))
            .collect()
    }

    /// 按 nrcJobNo 查找作业计划
    pub fn find_job_plan(&self, nrc_job_no: &str) -> Option<&JobPlan> {
        self.job_plans.iter().find(|p| p.nrc_job_no == nrc_job_no)
    }
}
