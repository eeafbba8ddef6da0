// ==========================================
// 瓦楞纸箱生产运营看板 - 作业分类引擎
// ==========================================
// 职责: 作业计划 → completed / held / in_progress / planned + 步骤完成计数
// 规则: 停机 > 进行中 > 计划中 > 完成；只有全部步骤完成才算完成
// ==========================================

use crate::domain::job::JobPlan;
use crate::domain::step::Step;
use crate::domain::types::{EmptyJobPolicy, JobCategory, ResolvedStatus, ResolverPrecision};
use crate::engine::status_resolver::StatusResolver;
use serde::{Deserialize, Serialize};

/// 分类结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobClassification {
    pub category: JobCategory,
    pub completed_step_count: u32,
    pub total_step_count: u32,
}

// ==========================================
// JobClassifier
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct JobClassifier {
    resolver: StatusResolver,
    empty_job_policy: EmptyJobPolicy,
}

impl JobClassifier {
    pub fn new(precision: ResolverPrecision, empty_job_policy: EmptyJobPolicy) -> Self {
        Self {
            resolver: StatusResolver::new(precision),
            empty_job_policy,
        }
    }

    pub fn resolver(&self) -> &StatusResolver {
        &self.resolver
    }

    pub fn classify(&self, job: &JobPlan) -> JobClassification {
        self.classify_steps(&job.steps)
    }

    pub fn classify_steps(&self, steps: &[Step]) -> JobClassification {
        if steps.is_empty() {
            let category = match self.empty_job_policy {
                EmptyJobPolicy::Completed => JobCategory::Completed,
                EmptyJobPolicy::Planned => JobCategory::Planned,
            };
            return JobClassification {
                category,
                completed_step_count: 0,
                total_step_count: 0,
            };
        }

        let mut completed = true;
        let mut in_progress = false;
        let mut on_hold = false;
        let mut completed_step_count = 0u32;

        for step in steps {
            match self.resolver.resolve(step) {
                ResolvedStatus::Hold => {
                    on_hold = true;
                    completed = false;
                }
                ResolvedStatus::InProgress => {
                    in_progress = true;
                    completed = false;
                }
                ResolvedStatus::Planned => {
                    completed = false;
                }
                ResolvedStatus::Completed => {
                    completed_step_count += 1;
                }
            }
        }

        let category = if on_hold {
            JobCategory::Held
        } else if in_progress {
            JobCategory::InProgress
        } else if !completed {
            JobCategory::Planned
        } else {
            JobCategory::Completed
        };

        JobClassification {
            category,
            completed_step_count,
            total_step_count: steps.len() as u32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::StepStatus;

    fn job(statuses: &[StepStatus]) -> JobPlan {
        JobPlan {
            job_plan_id: Some(1),
            nrc_job_no: "NRC-1".to_string(),
            job_demand: None,
            created_at: None,
            updated_at: None,
            steps: statuses
                .iter()
                .enumerate()
                .map(|(i, s)| Step::new(&format!("Step{}", i), *s))
                .collect(),
        }
    }

    #[test]
    fn test_mixed_job_is_in_progress() {
        let classifier = JobClassifier::default();
        let result = classifier.classify(&job(&[
            StepStatus::Stop,
            StepStatus::Start,
            StepStatus::Planned,
        ]));
        assert_eq!(result.category, JobCategory::InProgress);
        assert_eq!(result.completed_step_count, 1);
        assert_eq!(result.total_step_count, 3);
    }

    #[test]
    fn test_hold_wins() {
        let mut j = job(&[StepStatus::Start, StepStatus::Stop]);
        j.steps[1].step_details = Some(crate::domain::step::StepDetails {
            status: Some(crate::domain::types::DetailStatus::Hold),
            data: None,
        });
        assert_eq!(JobClassifier::default().classify(&j).category, JobCategory::Held);
    }

    #[test]
    fn test_all_completed() {
        let result = JobClassifier::default().classify(&job(&[StepStatus::Stop, StepStatus::Accept]));
        assert_eq!(result.category, JobCategory::Completed);
        assert_eq!(result.completed_step_count, 2);
    }

    #[test]
    fn test_partially_done_without_running_step_is_planned() {
        let result = JobClassifier::default().classify(&job(&[StepStatus::Stop, StepStatus::Planned]));
        assert_eq!(result.category, JobCategory::Planned);
    }

    #[test]
    fn test_empty_job_policy() {
        let empty = job(&[]);
        assert_eq!(JobClassifier::default().classify(&empty).category, JobCategory::Completed);

        let planned = JobClassifier::new(ResolverPrecision::Lenient, EmptyJobPolicy::Planned);
        assert_eq!(planned.classify(&empty).category, JobCategory::Planned);
    }

    #[test]
    fn test_strict_classifier_uses_strict_resolver() {
        let mut j = job(&[StepStatus::Start]);
        j.steps[0].step_details = Some(Default::default());

        assert_eq!(JobClassifier::default().classify(&j).category, JobCategory::InProgress);
        let strict = JobClassifier::new(ResolverPrecision::Strict, EmptyJobPolicy::Completed);
        assert_eq!(strict.classify(&j).category, JobCategory::Planned);
    }
}
