// ==========================================
// 瓦楞纸箱生产运营看板 - 工序完成统计
// ==========================================
// 职责: 作业集合 → 各工序 completed / in_progress / planned 计数 + 作业回溯列表
// 流程:
// 1. 每个标准工序取作业上第一个匹配步骤（标准名或别名），按原始步骤名记桶
// 2. 不属于任何标准工序的步骤，按原始名建临时桶
// 3. 别名合并：别名桶并入标准名桶
// 不变量: 每个桶 completed + in_progress + planned == 含该工序的作业数
// ==========================================

use crate::domain::job::{CompletedJob, JobPlan};
use crate::domain::snapshot::{JobRef, StepBucket};
use crate::domain::step::{Step, StepCategory};
use crate::domain::types::ResolvedStatus;
use crate::engine::status_resolver::StatusResolver;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::{debug, instrument};

/// 统计结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepStatistics {
    /// 合并后的桶：标准工序名 / 临时步骤名 → 桶
    pub buckets: BTreeMap<String, StepBucket>,
    /// 作业计划上出现过的操作工
    pub active_users: BTreeSet<String>,
}

// ==========================================
// StepStatisticsAggregator
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct StepStatisticsAggregator {
    resolver: StatusResolver,
}

impl StepStatisticsAggregator {
    pub fn new(resolver: StatusResolver) -> Self {
        Self { resolver }
    }

    /// 聚合作业计划与已完成作业
    ///
    /// 已完成作业按完工台账计入：台账中有 accept 记录的工序记为 completed。
    #[instrument(skip_all, fields(completed_jobs = completed.len()))]
    pub fn aggregate<'a, I>(&self, jobs: I, completed: &[CompletedJob]) -> StepStatistics
    where
        I: IntoIterator<Item = &'a JobPlan>,
    {
        let mut raw: BTreeMap<String, StepBucket> = BTreeMap::new();
        let mut active_users: BTreeSet<String> = BTreeSet::new();

        for job in jobs {
            self.collect_job(job, &mut raw, &mut active_users);
        }

        for job in completed {
            let job_ref = JobRef {
                job_plan_id: job.job_plan_id,
                nrc_job_no: job.nrc_job_no.clone(),
            };
            for category in job.accepted_categories() {
                raw.entry(category.canonical_name().to_string())
                    .or_default()
                    .record(ResolvedStatus::Completed, job_ref.clone());
            }
        }

        let buckets = merge_alias_buckets(raw);
        debug!(buckets = buckets.len(), users = active_users.len(), "工序统计完成");

        StepStatistics {
            buckets,
            active_users,
        }
    }

    /// 单个作业计入原始桶（按字面步骤名）
    fn collect_job(
        &self,
        job: &JobPlan,
        raw: &mut BTreeMap<String, StepBucket>,
        active_users: &mut BTreeSet<String>,
    ) {
        let job_ref = JobRef::from_plan(job);

        // === 步骤 1: 标准工序（含别名），每个工序只取第一个匹配步骤 ===
        for category in StepCategory::ALL {
            let Some(step) = job.steps.iter().find(|s| s.category() == Some(category)) else {
                continue;
            };
            let status = self.resolver.resolve(step);
            raw.entry(step.step_name.trim().to_string())
                .or_default()
                .record(status, job_ref.clone());
            record_user(step, active_users);
        }

        // === 步骤 2: 未知步骤兜底桶（同名只计一次）===
        let mut seen_unknown: HashSet<&str> = HashSet::new();
        for step in job.steps.iter().filter(|s| s.category().is_none()) {
            let name = step.step_name.trim();
            if !seen_unknown.insert(name) {
                continue;
            }
            let status = self.resolver.resolve(step);
            raw.entry(name.to_string())
                .or_default()
                .record(status, job_ref.clone());
            record_user(step, active_users);
        }
    }
}

/// 只记录实际计入桶的步骤的操作工
fn record_user(step: &Step, active_users: &mut BTreeSet<String>) {
    if let Some(user) = step.user.as_ref() {
        active_users.insert(user.clone());
    }
}

/// 别名合并
///
/// Printing → PrintingDetails、Flute Lamination → FluteLaminateBoardConversion 等；
/// 不属于任何别名组的桶原样保留。
pub fn merge_alias_buckets(raw: BTreeMap<String, StepBucket>) -> BTreeMap<String, StepBucket> {
    let mut merged: BTreeMap<String, StepBucket> = BTreeMap::new();

    for (key, bucket) in raw {
        let master = StepCategory::from_step_name(&key)
            .map(|c| c.canonical_name().to_string())
            .unwrap_or(key);
        merged.entry(master).or_default().absorb(bucket);
    }

    merged
}
