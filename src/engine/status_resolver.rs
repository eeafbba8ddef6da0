// ==========================================
// 瓦楞纸箱生产运营看板 - 步骤状态归一引擎
// ==========================================
// 职责: 把多代状态字段（原始 status / stepDetails / 工序子对象）归一为
//       completed / in_progress / hold / planned 之一
// 红线: 纯函数，不抛错；hold 优先于一切；每次判定都能给出命中规则
// ==========================================
//
// 判定顺序（命中即返回）:
// 1) stepDetails.data.status 或 stepDetails.status == hold → hold
// 2) PaperStore 且 paperStore.status 有值: accept→completed, in_progress→in_progress, hold→hold
// 2') [严格口径] 有 endDate 且原始 status ∈ {accept, stop} → completed
// 3) stepDetails.data.status: accept 仅在原始 stop 时→completed，原始 start 时降级为 in_progress;
//    in_progress→in_progress; hold→hold
// 4) 同 3，读取 stepDetails.status
// 5) 原始 status: accept→completed, in_progress→in_progress
// 6) 原始 status: stop→completed, start→in_progress [严格口径: 有 stepDetails 时跳过]
// 7) planned
// ==========================================

use crate::domain::step::{Step, StepCategory};
use crate::domain::types::{DetailStatus, ResolvedStatus, ResolverPrecision, StepStatus};
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 命中规则（可解释性）
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResolutionRule {
    HoldOverride,
    PaperStoreRecord,
    EndDateClosed,
    DetailData,
    DetailTop,
    /// 明细已 accept 但工作流尚未 stop，按 in_progress 计
    AcceptedNotStopped,
    PrimitiveDirect,
    PrimitiveLegacy,
    Default,
}

impl fmt::Display for ResolutionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ResolutionRule::HoldOverride => "HOLD_OVERRIDE",
            ResolutionRule::PaperStoreRecord => "PAPER_STORE_RECORD",
            ResolutionRule::EndDateClosed => "END_DATE_CLOSED",
            ResolutionRule::DetailData => "DETAIL_DATA",
            ResolutionRule::DetailTop => "DETAIL_TOP",
            ResolutionRule::AcceptedNotStopped => "ACCEPTED_NOT_STOPPED",
            ResolutionRule::PrimitiveDirect => "PRIMITIVE_DIRECT",
            ResolutionRule::PrimitiveLegacy => "PRIMITIVE_LEGACY",
            ResolutionRule::Default => "DEFAULT",
        };
        f.write_str(s)
    }
}

/// 判定结果：状态 + 命中规则
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResolution {
    pub status: ResolvedStatus,
    pub rule: ResolutionRule,
}

impl StatusResolution {
    fn new(status: ResolvedStatus, rule: ResolutionRule) -> Self {
        Self { status, rule }
    }
}

// ==========================================
// StatusResolver
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusResolver {
    precision: ResolverPrecision,
}

impl StatusResolver {
    pub fn new(precision: ResolverPrecision) -> Self {
        Self { precision }
    }

    pub fn lenient() -> Self {
        Self::new(ResolverPrecision::Lenient)
    }

    pub fn strict() -> Self {
        Self::new(ResolverPrecision::Strict)
    }

    pub fn precision(&self) -> ResolverPrecision {
        self.precision
    }

    pub fn resolve(&self, step: &Step) -> ResolvedStatus {
        self.resolve_with_reason(step).status
    }

    pub fn resolve_with_reason(&self, step: &Step) -> StatusResolution {
        resolve_with_reason(step, self.precision)
    }
}

/// 宽松口径（看板统计默认使用）
pub fn resolve_step_status(step: &Step) -> ResolvedStatus {
    resolve_with_reason(step, ResolverPrecision::Lenient).status
}

/// 严格口径（作业计划表格使用）
pub fn resolve_step_status_strict(step: &Step) -> ResolvedStatus {
    resolve_with_reason(step, ResolverPrecision::Strict).status
}

/// 完整判定链
pub fn resolve_with_reason(step: &Step, precision: ResolverPrecision) -> StatusResolution {
    let details = step.step_details.as_ref();
    let data_status = details.and_then(|d| d.data_status());
    let top_status = details.and_then(|d| d.status);

    // === 规则 1: hold 绝对优先 ===
    if data_status == Some(DetailStatus::Hold) || top_status == Some(DetailStatus::Hold) {
        return StatusResolution::new(ResolvedStatus::Hold, ResolutionRule::HoldOverride);
    }

    // === 规则 2: 纸库子对象 ===
    // 按工序类别匹配，"Paper Store" 等别名同样读取 paperStore 子对象，
    // 比只认字面 "PaperStore" 的口径更宽
    if step.category() == Some(StepCategory::PaperStore) {
        let paper_status = step
            .type_detail(StepCategory::PaperStore)
            .and_then(|d| d.status);
        let resolved = match paper_status {
            Some(DetailStatus::Accept) => Some(ResolvedStatus::Completed),
            Some(DetailStatus::InProgress) => Some(ResolvedStatus::InProgress),
            Some(DetailStatus::Hold) => Some(ResolvedStatus::Hold),
            _ => None,
        };
        if let Some(status) = resolved {
            return StatusResolution::new(status, ResolutionRule::PaperStoreRecord);
        }
    }

    // === 规则 2': 严格口径下 endDate 视为已关闭 ===
    if precision == ResolverPrecision::Strict
        && has_value(step.end_date.as_deref())
        && matches!(step.status, StepStatus::Accept | StepStatus::Stop)
    {
        return StatusResolution::new(ResolvedStatus::Completed, ResolutionRule::EndDateClosed);
    }

    // === 规则 3/4: 明细状态（先 data 层，再顶层）===
    if let Some(resolution) = detail_rule(data_status, step.status, ResolutionRule::DetailData) {
        return resolution;
    }
    if let Some(resolution) = detail_rule(top_status, step.status, ResolutionRule::DetailTop) {
        return resolution;
    }

    // === 规则 5: 原始状态直读 ===
    match step.status {
        StepStatus::Accept => {
            return StatusResolution::new(ResolvedStatus::Completed, ResolutionRule::PrimitiveDirect)
        }
        StepStatus::InProgress => {
            return StatusResolution::new(
                ResolvedStatus::InProgress,
                ResolutionRule::PrimitiveDirect,
            )
        }
        _ => {}
    }

    // === 规则 6: 旧版 start/stop ===
    let legacy_allowed = match precision {
        ResolverPrecision::Lenient => true,
        ResolverPrecision::Strict => details.is_none(),
    };
    if legacy_allowed {
        match step.status {
            StepStatus::Stop => {
                return StatusResolution::new(
                    ResolvedStatus::Completed,
                    ResolutionRule::PrimitiveLegacy,
                )
            }
            StepStatus::Start => {
                return StatusResolution::new(
                    ResolvedStatus::InProgress,
                    ResolutionRule::PrimitiveLegacy,
                )
            }
            _ => {}
        }
    }

    // === 规则 7: 默认 ===
    StatusResolution::new(ResolvedStatus::Planned, ResolutionRule::Default)
}

/// 明细层状态判定（规则 3/4 共用）
///
/// accept 只有在原始 stop 时才算完成；原始 start 时降级为 in_progress；
/// 其余原始状态下不做判定，交给后续规则。
fn detail_rule(
    detail: Option<DetailStatus>,
    primitive: StepStatus,
    rule: ResolutionRule,
) -> Option<StatusResolution> {
    match detail? {
        DetailStatus::Accept => match primitive {
            StepStatus::Stop => Some(StatusResolution::new(ResolvedStatus::Completed, rule)),
            StepStatus::Start => Some(StatusResolution::new(
                ResolvedStatus::InProgress,
                ResolutionRule::AcceptedNotStopped,
            )),
            _ => None,
        },
        DetailStatus::InProgress => Some(StatusResolution::new(ResolvedStatus::InProgress, rule)),
        DetailStatus::Hold => Some(StatusResolution::new(ResolvedStatus::Hold, rule)),
        DetailStatus::MajorHold | DetailStatus::Other => None,
    }
}

/// 步骤是否处于重大停机（major hold）
///
/// 任一来源标记即算：原始 status、stepDetails 两层、工序子对象。
pub fn step_has_major_hold(step: &Step) -> bool {
    if step.status == StepStatus::MajorHold {
        return true;
    }

    if let Some(details) = step.step_details.as_ref() {
        if details.status == Some(DetailStatus::MajorHold)
            || details.data_status() == Some(DetailStatus::MajorHold)
        {
            return true;
        }
    }

    step.type_details
        .iter()
        .any(|d| d.status == Some(DetailStatus::MajorHold))
}

fn has_value(raw: Option<&str>) -> bool {
    raw.map(|s| !s.trim().is_empty()).unwrap_or(false)
}
