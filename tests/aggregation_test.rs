// ==========================================
// 聚合引擎 集成测试
// ==========================================
// 测试范围:
// 1. 作业分类: completed + in_progress + planned 混合 → in_progress
// 2. 工序统计: 各桶 completed + in_progress + planned == 含该工序的作业数
// 3. 时间序列: 同一天的创建 / 完工事件落在同一个桶
// 4. 快照: efficiency 范围、空输入
// ==========================================

mod helpers;

use corrugated_ops::domain::job::{DashboardDataset, JobPlan, MachineStatus};
use corrugated_ops::domain::step::StepCategory;
use corrugated_ops::domain::types::{DetailStatus, EmptyJobPolicy, JobCategory, StepStatus};
use corrugated_ops::engine::{
    DashboardAggregateBuilder, JobClassifier, StepStatisticsAggregator, TimeSeriesBinner,
};
use helpers::api_test_helper::fixed_calendar;
use helpers::test_data_builder::{
    machine, CompletedJobBuilder, JobPlanBuilder, StepBuilder,
};

// ==========================================
// 作业分类
// ==========================================

#[test]
fn test_classify_mixed_job_is_in_progress() {
    let job = JobPlanBuilder::new(1, "NRC-D")
        .simple_step("PaperStore", StepStatus::Stop)
        .simple_step("Corrugation", StepStatus::Start)
        .simple_step("Punching", StepStatus::Planned)
        .build();

    let classification = JobClassifier::default().classify(&job);
    assert_eq!(classification.category, JobCategory::InProgress);
    assert_eq!(classification.completed_step_count, 1);
    assert_eq!(classification.total_step_count, 3);
}

// ==========================================
// 工序统计 - 计数守恒
// ==========================================

/// 构造一批覆盖各种状态 / 别名 / 重复步骤的作业
fn varied_jobs() -> Vec<JobPlan> {
    let primitives = [
        StepStatus::Planned,
        StepStatus::Start,
        StepStatus::Stop,
        StepStatus::Accept,
        StepStatus::MajorHold,
    ];
    let names = [
        "PaperStore",
        "Printing",
        "PrintingDetails",
        "Corrugation",
        "Flute Lamination",
        "Punching",
        "Flap Pasting",
        "Quality Control",
        "Dispatch",
        "Varnishing",
    ];

    (0..40)
        .map(|i| {
            let mut builder = JobPlanBuilder::new(i as i64, &format!("NRC-{:03}", i));
            for (offset, name) in names.iter().enumerate() {
                // 每个作业只带一部分工序
                if (i + offset) % 3 == 0 {
                    continue;
                }
                let primitive = primitives[(i * 7 + offset) % primitives.len()];
                let mut step = StepBuilder::new(name, primitive);
                if (i + offset) % 5 == 0 {
                    step = step.data_status(DetailStatus::Hold);
                } else if (i + offset) % 4 == 0 {
                    step = step.data_status(DetailStatus::Accept);
                }
                builder = builder.step(step.build());
            }
            builder.build()
        })
        .collect()
}

#[test]
fn test_bucket_sum_matches_jobs_containing_step() {
    let jobs = varied_jobs();
    let stats = StepStatisticsAggregator::default().aggregate(&jobs, &[]);

    for (key, bucket) in &stats.buckets {
        let containing = jobs
            .iter()
            .filter(|job| {
                job.steps.iter().any(|s| match StepCategory::from_step_name(&s.step_name) {
                    Some(category) => category.canonical_name() == key,
                    None => s.step_name.trim() == key,
                })
            })
            .count() as u32;

        assert_eq!(
            bucket.completed + bucket.in_progress + bucket.planned,
            containing,
            "工序 {} 的计数应等于含该工序的作业数",
            key
        );
        assert!(bucket.on_hold <= bucket.planned, "停机数是计划中的子集");
        assert_eq!(bucket.completed_jobs.len() as u32, bucket.completed);
        assert_eq!(bucket.in_progress_jobs.len() as u32, bucket.in_progress);
        assert_eq!(bucket.planned_jobs.len() as u32, bucket.planned);
    }

    // 别名均已并入标准名
    for alias in ["Printing", "Flute Lamination", "Flap Pasting", "Quality Control", "Dispatch"] {
        assert!(!stats.buckets.contains_key(alias), "别名桶 {} 应已合并", alias);
    }
    assert!(stats.buckets.contains_key("Varnishing"), "未知步骤保留临时桶");
}

// ==========================================
// 时间序列
// ==========================================

#[test]
fn test_same_day_creations_and_completion_share_bucket() {
    let jobs = vec![
        JobPlanBuilder::new(1, "NRC-E1")
            .created_at("2024-01-01T08:00:00Z")
            .simple_step("Corrugation", StepStatus::Start)
            .build(),
        JobPlanBuilder::new(2, "NRC-E2")
            .created_at("2024-01-01T09:30:00Z")
            .simple_step("Corrugation", StepStatus::Planned)
            .build(),
    ];
    let completed = vec![CompletedJobBuilder::new("NRC-E0")
        .completed_at("2024-01-01T10:00:00Z")
        .build()];

    let series = TimeSeriesBinner::default().bin(&jobs, &completed, &fixed_calendar(2024, 1, 31));

    assert_eq!(series.len(), 1, "同一天只应有一个桶");
    assert_eq!(series[0].date, "2024-01-01");
    assert_eq!(series[0].jobs_started, 1);
    assert_eq!(series[0].jobs_completed, 1);
    assert_eq!(series[0].total_steps, 2);
}

// ==========================================
// 快照
// ==========================================

#[test]
fn test_snapshot_efficiency_within_bounds() {
    let jobs = varied_jobs();
    let dataset = DashboardDataset {
        job_plans: jobs,
        completed_jobs: vec![
            CompletedJobBuilder::new("NRC-000")
                .completed_at("2024-01-02T10:00:00Z")
                .accepted("corrugation")
                .accepted("punching")
                .build(),
        ],
        held_jobs: Vec::new(),
        machines: vec![
            machine("COR-1", "Corrugator", MachineStatus::Busy),
            machine("PUN-1", "Punching", MachineStatus::Available),
        ],
    };

    let builder = DashboardAggregateBuilder::new(EmptyJobPolicy::Completed, fixed_calendar(2024, 1, 31));
    let snapshot = builder.build(&dataset);

    assert!(snapshot.efficiency <= 100);
    assert!(snapshot.completed_steps <= snapshot.total_steps);
    assert_eq!(snapshot.total_jobs, 40, "NRC-000 已完工，被已完成作业取代");
    assert_eq!(snapshot.completed_jobs, 1);
    assert_eq!(
        snapshot.in_progress_jobs
            + snapshot.planned_jobs
            + snapshot.on_hold_plans
            + snapshot.pending_closeout_jobs,
        39
    );
    assert_eq!(snapshot.machine_utilization.utilization_rate, 50);
}

#[test]
fn test_snapshot_empty_input_all_zero() {
    let builder = DashboardAggregateBuilder::new(EmptyJobPolicy::Completed, fixed_calendar(2024, 1, 31));
    let snapshot = builder.build(&DashboardDataset::default());

    assert_eq!(snapshot.total_jobs, 0);
    assert_eq!(snapshot.completed_jobs, 0);
    assert_eq!(snapshot.in_progress_jobs, 0);
    assert_eq!(snapshot.planned_jobs, 0);
    assert_eq!(snapshot.held_jobs, 0);
    assert_eq!(snapshot.major_hold_jobs, 0);
    assert_eq!(snapshot.total_steps, 0);
    assert_eq!(snapshot.efficiency, 0);
    assert_eq!(snapshot.active_users, 0);
    assert!(snapshot.step_completion_stats.is_empty());
    assert!(snapshot.time_series_data.is_empty());
    assert_eq!(snapshot.machine_utilization.total_machines, 0);
}
