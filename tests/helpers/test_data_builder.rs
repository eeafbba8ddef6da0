// ==========================================
// 测试数据构建器 - 用于集成测试
// ==========================================

use corrugated_ops::domain::job::{
    CompletedJob, HeldJob, HeldMachine, JobPlan, LedgerEntry, MachineRecord, MachineStatus,
};
use corrugated_ops::domain::step::{Step, StepDetailData, StepDetails};
use corrugated_ops::domain::types::{DetailStatus, JobDemand, StepStatus};
use std::collections::BTreeMap;

// ==========================================
// Step 构建器
// ==========================================

pub struct StepBuilder {
    step: Step,
}

impl StepBuilder {
    pub fn new(step_name: &str, status: StepStatus) -> Self {
        Self {
            step: Step::new(step_name, status),
        }
    }

    pub fn id(mut self, id: i64) -> Self {
        self.step.id = Some(id);
        self
    }

    pub fn user(mut self, user: &str) -> Self {
        self.step.user = Some(user.to_string());
        self
    }

    pub fn updated_at(mut self, ts: &str) -> Self {
        self.step.updated_at = Some(ts.to_string());
        self
    }

    pub fn end_date(mut self, ts: &str) -> Self {
        self.step.end_date = Some(ts.to_string());
        self
    }

    /// stepDetails.data.status
    pub fn data_status(mut self, status: DetailStatus) -> Self {
        let details = self.step.step_details.get_or_insert_with(StepDetails::default);
        details
            .data
            .get_or_insert_with(StepDetailData::default)
            .status = Some(status);
        self
    }

    /// stepDetails.status
    pub fn top_status(mut self, status: DetailStatus) -> Self {
        self.step
            .step_details
            .get_or_insert_with(StepDetails::default)
            .status = Some(status);
        self
    }

    pub fn build(self) -> Step {
        self.step
    }
}

// ==========================================
// JobPlan 构建器
// ==========================================

pub struct JobPlanBuilder {
    plan: JobPlan,
}

impl JobPlanBuilder {
    pub fn new(job_plan_id: i64, nrc_job_no: &str) -> Self {
        Self {
            plan: JobPlan {
                job_plan_id: Some(job_plan_id),
                nrc_job_no: nrc_job_no.to_string(),
                job_demand: None,
                created_at: None,
                updated_at: None,
                steps: Vec::new(),
            },
        }
    }

    pub fn demand(mut self, demand: JobDemand) -> Self {
        self.plan.job_demand = Some(demand);
        self
    }

    pub fn created_at(mut self, ts: &str) -> Self {
        self.plan.created_at = Some(ts.to_string());
        self
    }

    pub fn step(mut self, step: Step) -> Self {
        self.plan.steps.push(step);
        self
    }

    /// 只有名称和原始状态的步骤
    pub fn simple_step(self, step_name: &str, status: StepStatus) -> Self {
        self.step(Step::new(step_name, status))
    }

    pub fn build(self) -> JobPlan {
        self.plan
    }
}

// ==========================================
// CompletedJob 构建器
// ==========================================

pub struct CompletedJobBuilder {
    job: CompletedJob,
}

impl CompletedJobBuilder {
    pub fn new(nrc_job_no: &str) -> Self {
        Self {
            job: CompletedJob {
                id: None,
                nrc_job_no: nrc_job_no.to_string(),
                job_plan_id: None,
                completed_at: None,
                created_at: None,
                all_step_details: BTreeMap::new(),
                job_details: None,
                purchase_order_details: None,
            },
        }
    }

    pub fn completed_at(mut self, ts: &str) -> Self {
        self.job.completed_at = Some(ts.to_string());
        self
    }

    pub fn created_at(mut self, ts: &str) -> Self {
        self.job.created_at = Some(ts.to_string());
        self
    }

    /// 台账中登记一条 accept 记录（record_key 如 corrugation / flutelam）
    pub fn accepted(mut self, record_key: &str) -> Self {
        self.job
            .all_step_details
            .entry(record_key.to_string())
            .or_default()
            .push(LedgerEntry {
                status: Some(DetailStatus::Accept),
                ..LedgerEntry::default()
            });
        self
    }

    pub fn build(self) -> CompletedJob {
        self.job
    }
}

// ==========================================
// 停机作业 / 机台
// ==========================================

pub fn held_job(job_planning_id: i64, nrc_job_no: &str, machine_codes: &[&str]) -> HeldJob {
    HeldJob {
        job_planning_id: Some(job_planning_id),
        nrc_job_no: Some(nrc_job_no.to_string()),
        held_machines: machine_codes
            .iter()
            .map(|code| HeldMachine {
                machine_id: None,
                machine_code: Some(code.to_string()),
                step_name: None,
                hold_remark: None,
                held_at: None,
            })
            .collect(),
        total_held_machines: Some(machine_codes.len() as u32),
    }
}

pub fn machine(code: &str, machine_type: &str, status: MachineStatus) -> MachineRecord {
    MachineRecord {
        id: Some(code.to_string()),
        machine_code: Some(code.to_string()),
        machine_type: Some(machine_type.to_string()),
        unit: None,
        status,
        is_active: Some(true),
    }
}
