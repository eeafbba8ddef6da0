// ==========================================
// 瓦楞纸箱生产运营看板 - 按日时间序列
// ==========================================
// 职责: 作业创建事件 / 作业完工事件 → 按本地日历日分桶
// - 作业计划按 createdAt 分桶: totalSteps / completedSteps 累加，进行中的作业 jobsStarted + 1
// - 已完成作业按 completedAt 分桶: jobsCompleted + 1（缺 completedAt 跳过并告警）
// 输出按日期升序
// ==========================================

use crate::domain::job::{CompletedJob, JobPlan};
use crate::domain::snapshot::TimeSeriesPoint;
use crate::domain::types::JobCategory;
use crate::engine::date_range::LocalCalendar;
use crate::engine::job_classifier::JobClassifier;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::{debug, instrument, warn};

#[derive(Debug, Clone, Copy, Default)]
pub struct TimeSeriesBinner {
    classifier: JobClassifier,
}

impl TimeSeriesBinner {
    pub fn new(classifier: JobClassifier) -> Self {
        Self { classifier }
    }

    #[instrument(skip_all, fields(completed_jobs = completed.len()))]
    pub fn bin<'a, I>(
        &self,
        jobs: I,
        completed: &[CompletedJob],
        calendar: &LocalCalendar,
    ) -> Vec<TimeSeriesPoint>
    where
        I: IntoIterator<Item = &'a JobPlan>,
    {
        let mut buckets: BTreeMap<NaiveDate, TimeSeriesPoint> = BTreeMap::new();

        for job in jobs {
            let Some(date) = job.created_at.as_deref().and_then(|raw| calendar.local_date(raw))
            else {
                debug!(nrc_job_no = %job.nrc_job_no, "作业缺少可解析的 createdAt，不计入时间序列");
                continue;
            };

            let classification = self.classifier.classify(job);
            let point = buckets
                .entry(date)
                .or_insert_with(|| TimeSeriesPoint::empty(date));
            point.total_steps += classification.total_step_count;
            point.completed_steps += classification.completed_step_count;
            if classification.category == JobCategory::InProgress {
                point.jobs_started += 1;
            }
        }

        for job in completed {
            let Some(raw) = job.completed_at.as_deref() else {
                warn!(nrc_job_no = %job.nrc_job_no, "已完成作业缺少 completedAt，跳过时间序列统计");
                continue;
            };
            let Some(date) = calendar.local_date(raw) else {
                warn!(nrc_job_no = %job.nrc_job_no, raw_value = raw, "completedAt 无法解析，跳过时间序列统计");
                continue;
            };

            buckets
                .entry(date)
                .or_insert_with(|| TimeSeriesPoint::empty(date))
                .jobs_completed += 1;
        }

        // BTreeMap 按日期键有序，values 即升序序列
        buckets.into_values().collect()
    }
}
