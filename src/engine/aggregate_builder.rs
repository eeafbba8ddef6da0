// ==========================================
// 瓦楞纸箱生产运营看板 - 聚合快照构建
// ==========================================
// 职责: 串联 状态归一 → 作业分类 → 工序统计 / 时间序列 → 机台利用率，产出一份快照
// 红线:
// - totalJobs = 活跃作业计划数 + 已完成作业数
// - efficiency = round(completedSteps / totalSteps * 100)，totalSteps 为 0 时为 0
// - heldJobs / majorHoldJobs 始终取当前值，日期过滤时从未过滤快照原样带入
// ==========================================

use crate::domain::job::{DashboardDataset, HeldJob, JobPlan};
use crate::domain::snapshot::{
    percentage, AggregateSnapshot, JobPlanRow, StepStatusCell,
};
use crate::domain::types::{
    CustomRange, DateFilter, DateRange, EmptyJobPolicy, JobCategory, ResolverPrecision,
};
use crate::engine::date_range::{filter_dataset, range_for, LocalCalendar};
use crate::engine::job_classifier::JobClassifier;
use crate::engine::machine_utilization::summarize_machines;
use crate::engine::status_resolver::step_has_major_hold;
use crate::engine::step_statistics::StepStatisticsAggregator;
use crate::engine::time_series::TimeSeriesBinner;
use std::collections::HashSet;
use tracing::{info, instrument};

// ==========================================
// AlwaysCurrentCounts - 不受日期过滤影响的计数
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AlwaysCurrentCounts {
    pub held_jobs: u32,
    pub major_hold_jobs: u32,
}

impl AlwaysCurrentCounts {
    /// 从未过滤数据计算
    ///
    /// - held_jobs: 停机接口中的作业数（按 jobPlanningId / nrcJobNo 去重）
    /// - major_hold_jobs: 活跃作业计划中含重大停机步骤的作业数
    pub fn compute<'a, I>(active_job_plans: I, held_jobs: &[HeldJob]) -> Self
    where
        I: IntoIterator<Item = &'a JobPlan>,
    {
        let major_hold_jobs = active_job_plans
            .into_iter()
            .filter(|job| job.steps.iter().any(step_has_major_hold))
            .count() as u32;

        let mut seen: HashSet<String> = HashSet::new();
        let mut held = 0u32;
        for job in held_jobs {
            match job.dedup_key() {
                Some(key) => {
                    if seen.insert(key) {
                        held += 1;
                    }
                }
                None => held += 1,
            }
        }

        Self {
            held_jobs: held,
            major_hold_jobs,
        }
    }

    /// 从已有快照带出
    pub fn from_snapshot(snapshot: &AggregateSnapshot) -> Self {
        Self {
            held_jobs: snapshot.held_jobs,
            major_hold_jobs: snapshot.major_hold_jobs,
        }
    }
}

// ==========================================
// DashboardAggregateBuilder
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct DashboardAggregateBuilder {
    classifier: JobClassifier,
    calendar: LocalCalendar,
}

impl DashboardAggregateBuilder {
    /// 看板统计固定使用宽松口径
    pub fn new(empty_job_policy: EmptyJobPolicy, calendar: LocalCalendar) -> Self {
        Self {
            classifier: JobClassifier::new(ResolverPrecision::Lenient, empty_job_policy),
            calendar,
        }
    }

    pub fn calendar(&self) -> &LocalCalendar {
        &self.calendar
    }

    /// 未过滤快照
    #[instrument(skip_all, fields(
        job_plans = dataset.job_plans.len(),
        completed_jobs = dataset.completed_jobs.len()
    ))]
    pub fn build(&self, dataset: &DashboardDataset) -> AggregateSnapshot {
        let always_current = AlwaysCurrentCounts::compute(dataset.active_job_plans(), &dataset.held_jobs);
        self.assemble(dataset, always_current, DateFilter::All, None)
    }

    /// 用户切换日期过滤后重新派生
    ///
    /// 作业分类 / 工序统计 / 时间序列基于过滤后的数据重算，
    /// heldJobs / majorHoldJobs 从未过滤快照原样带入。
    #[instrument(skip_all, fields(filter = %filter))]
    pub fn rebuild_for_filter(
        &self,
        dataset: &DashboardDataset,
        unfiltered: &AggregateSnapshot,
        filter: DateFilter,
        custom: Option<&CustomRange>,
    ) -> AggregateSnapshot {
        let range = range_for(filter, custom, &self.calendar);
        let filtered = filter_dataset(dataset, range.as_ref(), &self.calendar);
        self.assemble(
            &filtered,
            AlwaysCurrentCounts::from_snapshot(unfiltered),
            filter,
            range,
        )
    }

    /// 一次完成：先算未过滤快照，再按过滤器派生
    pub fn build_filtered(
        &self,
        dataset: &DashboardDataset,
        filter: DateFilter,
        custom: Option<&CustomRange>,
    ) -> AggregateSnapshot {
        let unfiltered = self.build(dataset);
        if filter == DateFilter::All {
            return unfiltered;
        }
        self.rebuild_for_filter(dataset, &unfiltered, filter, custom)
    }

    fn assemble(
        &self,
        dataset: &DashboardDataset,
        always_current: AlwaysCurrentCounts,
        filter: DateFilter,
        range: Option<DateRange>,
    ) -> AggregateSnapshot {
        let active = dataset.active_job_plans();

        // === 作业分类 ===
        let mut in_progress_jobs = 0u32;
        let mut planned_jobs = 0u32;
        let mut pending_closeout_jobs = 0u32;
        let mut on_hold_plans = 0u32;
        let mut total_steps = 0u32;
        let mut completed_steps = 0u32;

        for job in &active {
            let classification = self.classifier.classify(job);
            total_steps += classification.total_step_count;
            completed_steps += classification.completed_step_count;
            match classification.category {
                JobCategory::InProgress => in_progress_jobs += 1,
                JobCategory::Planned => planned_jobs += 1,
                JobCategory::Held => on_hold_plans += 1,
                JobCategory::Completed => pending_closeout_jobs += 1,
            }
        }

        // 已完成作业按台账计步
        for job in &dataset.completed_jobs {
            let accepted = job.accepted_categories().len() as u32;
            total_steps += accepted;
            completed_steps += accepted;
        }

        // === 工序统计 / 时间序列 / 机台 ===
        let statistics = StepStatisticsAggregator::new(*self.classifier.resolver())
            .aggregate(active.iter().copied(), &dataset.completed_jobs);
        let time_series_data = TimeSeriesBinner::new(self.classifier).bin(
            active.iter().copied(),
            &dataset.completed_jobs,
            &self.calendar,
        );
        let machine_utilization = summarize_machines(&dataset.machines);

        let completed_jobs = dataset.completed_jobs.len() as u32;
        let snapshot = AggregateSnapshot {
            as_of: self.calendar.today(),
            date_filter: filter,
            range,
            total_jobs: active.len() as u32 + completed_jobs,
            completed_jobs,
            in_progress_jobs,
            planned_jobs,
            pending_closeout_jobs,
            on_hold_plans,
            held_jobs: always_current.held_jobs,
            major_hold_jobs: always_current.major_hold_jobs,
            total_steps,
            completed_steps,
            efficiency: percentage(completed_steps, total_steps),
            active_users: statistics.active_users.len() as u32,
            step_completion_stats: statistics.buckets,
            time_series_data,
            machine_utilization,
        };

        info!(
            filter = %filter,
            total_jobs = snapshot.total_jobs,
            completed_jobs = snapshot.completed_jobs,
            in_progress_jobs = snapshot.in_progress_jobs,
            efficiency = snapshot.efficiency,
            "看板快照构建完成"
        );

        snapshot
    }
}

// ==========================================
// 作业计划表格（严格口径）
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct JobPlanTableBuilder {
    classifier: JobClassifier,
}

impl JobPlanTableBuilder {
    pub fn new(precision: ResolverPrecision, empty_job_policy: EmptyJobPolicy) -> Self {
        Self {
            classifier: JobClassifier::new(precision, empty_job_policy),
        }
    }

    pub fn build_rows<'a, I>(&self, jobs: I) -> Vec<JobPlanRow>
    where
        I: IntoIterator<Item = &'a JobPlan>,
    {
        jobs.into_iter().map(|job| self.build_row(job)).collect()
    }

    pub fn build_row(&self, job: &JobPlan) -> JobPlanRow {
        let classification = self.classifier.classify(job);
        let resolver = self.classifier.resolver();

        let steps = job
            .steps
            .iter()
            .map(|step| StepStatusCell {
                step_name: step.step_name.clone(),
                category: step.category(),
                status: resolver.resolve(step),
            })
            .collect();

        JobPlanRow {
            job_plan_id: job.job_plan_id,
            nrc_job_no: job.nrc_job_no.clone(),
            job_demand: job.job_demand,
            category: classification.category,
            completed_steps: classification.completed_step_count,
            total_steps: classification.total_step_count,
            progress: percentage(
                classification.completed_step_count,
                classification.total_step_count,
            ),
            steps,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::job::{CompletedJob, MachineRecord, MachineStatus};
    use crate::domain::step::{Step, StepDetailData, StepDetails};
    use crate::domain::types::{DetailStatus, StepStatus};
    use chrono::{FixedOffset, NaiveDate};
    use serde_json::json;

    fn calendar() -> LocalCalendar {
        LocalCalendar::new(
            FixedOffset::east_opt(0).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
        )
    }

    fn builder() -> DashboardAggregateBuilder {
        DashboardAggregateBuilder::new(EmptyJobPolicy::Completed, calendar())
    }

    fn step(name: &str, status: StepStatus, updated_at: &str) -> Step {
        let mut s = Step::new(name, status);
        s.updated_at = Some(updated_at.to_string());
        s
    }

    fn plan(id: i64, no: &str, created_at: &str, steps: Vec<Step>) -> JobPlan {
        JobPlan {
            job_plan_id: Some(id),
            nrc_job_no: no.to_string(),
            job_demand: None,
            created_at: Some(created_at.to_string()),
            updated_at: None,
            steps,
        }
    }

    fn dataset() -> DashboardDataset {
        let mut major = step("Punching", StepStatus::Start, "2024-01-05T08:00:00Z");
        major.step_details = Some(StepDetails {
            status: None,
            data: Some(StepDetailData {
                status: Some(DetailStatus::MajorHold),
                major_hold_remark: Some("die broken".to_string()),
                ..StepDetailData::default()
            }),
        });

        DashboardDataset {
            job_plans: vec![
                plan(
                    1,
                    "NRC-1",
                    "2024-03-02T09:00:00Z",
                    vec![
                        step("PaperStore", StepStatus::Stop, "2024-03-02T10:00:00Z"),
                        step("Corrugation", StepStatus::Start, "2024-03-03T10:00:00Z"),
                    ],
                ),
                plan(2, "NRC-2", "2024-01-05T09:00:00Z", vec![major]),
                plan(
                    3,
                    "NRC-3",
                    "2024-03-10T09:00:00Z",
                    vec![step("Corrugation", StepStatus::Stop, "2024-03-10T10:00:00Z")],
                ),
            ],
            completed_jobs: vec![serde_json::from_value::<CompletedJob>(json!({
                "nrcJobNo": "NRC-3",
                "completedAt": "2024-03-11T10:00:00Z",
                "allStepDetails": { "corrugation": [{ "status": "accept" }] }
            }))
            .unwrap()],
            held_jobs: serde_json::from_value(json!([
                { "jobPlanningId": 2, "nrcJobNo": "NRC-2", "heldMachines": [{ "machineCode": "PUN-1" }], "totalHeldMachines": 1 },
                { "jobPlanningId": 2, "nrcJobNo": "NRC-2", "heldMachines": [{ "machineCode": "PUN-2" }], "totalHeldMachines": 1 }
            ]))
            .unwrap(),
            machines: vec![MachineRecord {
                id: Some("1".to_string()),
                machine_code: Some("COR-1".to_string()),
                machine_type: Some("Corrugator".to_string()),
                unit: None,
                status: MachineStatus::Busy,
                is_active: Some(true),
            }],
        }
    }

    #[test]
    fn test_unfiltered_snapshot() {
        let snapshot = builder().build(&dataset());

        // NRC-3 已在完工列表中，被取代
        assert_eq!(snapshot.total_jobs, 3);
        assert_eq!(snapshot.completed_jobs, 1);
        assert_eq!(snapshot.in_progress_jobs, 2);
        assert_eq!(snapshot.planned_jobs, 0);
        assert_eq!(snapshot.held_jobs, 1);
        assert_eq!(snapshot.major_hold_jobs, 1);

        // 活跃计划 3 步（完成 1）+ 台账 1 步（完成 1）
        assert_eq!(snapshot.total_steps, 4);
        assert_eq!(snapshot.completed_steps, 2);
        assert_eq!(snapshot.efficiency, 50);
        assert_eq!(snapshot.machine_utilization.utilization_rate, 100);
        assert_eq!(snapshot.step_completion_stats["Corrugation"].completed, 1);
        assert_eq!(snapshot.step_completion_stats["Corrugation"].in_progress, 1);
    }

    #[test]
    fn test_filtered_snapshot_keeps_always_current_counts() {
        let data = dataset();
        let b = builder();
        let unfiltered = b.build(&data);
        let filtered = b.rebuild_for_filter(&data, &unfiltered, DateFilter::Month, None);

        // NRC-2 的活动全在一月，三月窗口内被滤掉，但重大停机计数保持不变
        assert_eq!(filtered.total_jobs, 2);
        assert_eq!(filtered.in_progress_jobs, 1);
        assert_eq!(filtered.major_hold_jobs, unfiltered.major_hold_jobs);
        assert_eq!(filtered.held_jobs, unfiltered.held_jobs);
        assert_eq!(filtered.date_filter, DateFilter::Month);
        assert!(filtered.range.is_some());
    }

    #[test]
    fn test_filtered_snapshot_keeps_superseded_plan_out() {
        // 三月里有过活动，但四月才完工：三月窗口内既不算完工，也不能回到进行中
        let data = DashboardDataset {
            job_plans: vec![plan(
                1,
                "NRC-1",
                "2024-03-02T09:00:00Z",
                vec![step("Corrugation", StepStatus::Start, "2024-03-05T10:00:00Z")],
            )],
            completed_jobs: vec![serde_json::from_value::<CompletedJob>(json!({
                "nrcJobNo": "NRC-1",
                "completedAt": "2024-04-02T10:00:00Z"
            }))
            .unwrap()],
            ..DashboardDataset::default()
        };
        let b = builder();
        let unfiltered = b.build(&data);
        assert_eq!(unfiltered.total_jobs, 1);
        assert_eq!(unfiltered.completed_jobs, 1);
        assert_eq!(unfiltered.in_progress_jobs, 0);

        let march = b.rebuild_for_filter(&data, &unfiltered, DateFilter::Month, None);
        assert_eq!(march.total_jobs, 0);
        assert_eq!(march.completed_jobs, 0);
        assert_eq!(march.in_progress_jobs, 0);
        assert_eq!(march.planned_jobs, 0);
        assert!(march.step_completion_stats.is_empty());
    }

    #[test]
    fn test_build_filtered_all_equals_build() {
        let data = dataset();
        assert_eq!(
            builder().build_filtered(&data, DateFilter::All, None),
            builder().build(&data)
        );
    }

    #[test]
    fn test_empty_dataset_all_zero() {
        let snapshot = builder().build(&DashboardDataset::default());
        assert_eq!(snapshot.total_jobs, 0);
        assert_eq!(snapshot.total_steps, 0);
        assert_eq!(snapshot.efficiency, 0);
        assert!(snapshot.step_completion_stats.is_empty());
        assert!(snapshot.time_series_data.is_empty());
    }

    #[test]
    fn test_held_jobs_without_keys_counted_individually() {
        let held: Vec<HeldJob> = serde_json::from_value(json!([
            { "heldMachines": [] },
            { "heldMachines": [] },
            { "nrcJobNo": "X", "heldMachines": [] }
        ]))
        .unwrap();
        let counts = AlwaysCurrentCounts::compute(Vec::<&JobPlan>::new(), &held);
        assert_eq!(counts.held_jobs, 3);
        assert_eq!(counts.major_hold_jobs, 0);
    }

    #[test]
    fn test_job_plan_rows_strict() {
        let mut s = Step::new("Corrugation", StepStatus::Stop);
        s.end_date = Some("2024-03-01T00:00:00Z".to_string());
        s.step_details = Some(StepDetails {
            status: Some(DetailStatus::InProgress),
            data: None,
        });
        let job = plan(9, "NRC-9", "2024-03-01T00:00:00Z", vec![s, Step::new("Punching", StepStatus::Planned)]);

        let row = JobPlanTableBuilder::new(ResolverPrecision::Strict, EmptyJobPolicy::Completed)
            .build_row(&job);
        assert_eq!(row.completed_steps, 1);
        assert_eq!(row.total_steps, 2);
        assert_eq!(row.progress, 50);
        assert_eq!(row.category, JobCategory::Planned);
        assert_eq!(row.steps[0].status, crate::domain::types::ResolvedStatus::Completed);
    }
}
