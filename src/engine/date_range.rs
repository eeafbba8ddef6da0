// ==========================================
// 瓦楞纸箱生产运营看板 - 日期范围过滤
// ==========================================
// 职责:
// 1. 命名过滤器 / 自定义范围 → 本地日历闭区间
// 2. 时间戳归属判定（起点归一到 00:00:00.000，终点归一到 23:59:59.999）
// 3. 作业计划按"活动时间"过滤：任一步骤 updatedAt 命中即保留，否则回退 createdAt
// 红线: 日期解析失败视为不在范围内，只告警不报错
// ==========================================

use crate::domain::job::{CompletedJob, DashboardDataset, JobPlan};
use crate::domain::types::{CustomRange, DateFilter, DateRange};
use chrono::{
    DateTime, Datelike, Duration, FixedOffset, Local, NaiveDate, NaiveDateTime, TimeZone, Utc,
};
use tracing::{debug, warn};

// ==========================================
// LocalCalendar - 本地日历上下文
// ==========================================
// "今天"和时区偏移统一由调用方注入，引擎内部不读系统时钟
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalCalendar {
    offset: FixedOffset,
    today: NaiveDate,
}

impl LocalCalendar {
    pub fn new(offset: FixedOffset, today: NaiveDate) -> Self {
        Self { offset, today }
    }

    /// 以系统本地时区构建
    pub fn system_now() -> Self {
        let now = Local::now();
        Self {
            offset: *now.offset(),
            today: now.date_naive(),
        }
    }

    /// 以指定偏移（分钟）构建，"今天"按该偏移下的当前时间计算
    ///
    /// 偏移超出 ±24h 时回退到系统本地时区。
    pub fn with_offset_minutes(offset_minutes: i32, now: DateTime<Utc>) -> Self {
        match FixedOffset::east_opt(offset_minutes * 60) {
            Some(offset) => Self {
                offset,
                today: now.with_timezone(&offset).date_naive(),
            },
            None => {
                warn!(offset_minutes, "非法的时区偏移，回退到系统本地时区");
                Self::system_now()
            }
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// 解析时间戳
    ///
    /// 支持:
    /// - RFC3339（带 Z 或偏移）
    /// - 不带偏移的日期时间（按本地时区解释）
    /// - 纯日期（本地 00:00）
    pub fn parse_timestamp(&self, raw: &str) -> Option<DateTime<FixedOffset>> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&self.offset));
        }

        const NAIVE_FORMATS: [&str; 3] =
            ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"];
        for fmt in NAIVE_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
                return self.offset.from_local_datetime(&naive).single();
            }
        }

        let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
        self.offset
            .from_local_datetime(&date.and_hms_opt(0, 0, 0)?)
            .single()
    }

    /// 时间戳对应的本地日历日期
    pub fn local_date(&self, raw: &str) -> Option<NaiveDate> {
        self.parse_timestamp(raw).map(|dt| dt.date_naive())
    }
}

// ==========================================
// 范围计算
// ==========================================

/// 计算过滤窗口
///
/// 返回 None 表示不过滤（All，或自定义范围缺失/非法）。
pub fn range_for(
    filter: DateFilter,
    custom: Option<&CustomRange>,
    calendar: &LocalCalendar,
) -> Option<DateRange> {
    let today = calendar.today();

    match filter {
        DateFilter::All => None,
        DateFilter::Today => Some(DateRange {
            start: today,
            end: today,
        }),
        DateFilter::Week => {
            let start = week_start(today);
            Some(DateRange {
                start,
                end: start + Duration::days(6),
            })
        }
        DateFilter::Month => {
            let start = first_of_month(today.year(), today.month())?;
            let end = last_of_month(today.year(), today.month())?;
            Some(DateRange { start, end })
        }
        DateFilter::Quarter => {
            let quarter = today.month0() / 3;
            let first_month = quarter * 3 + 1;
            let start = first_of_month(today.year(), first_month)?;
            let end = last_of_month(today.year(), first_month + 2)?;
            Some(DateRange { start, end })
        }
        DateFilter::Year => Some(DateRange {
            start: NaiveDate::from_ymd_opt(today.year(), 1, 1)?,
            end: NaiveDate::from_ymd_opt(today.year(), 12, 31)?,
        }),
        DateFilter::Custom => {
            let custom = match custom {
                Some(c) => c,
                None => {
                    warn!("自定义日期过滤缺少范围参数，按不过滤处理");
                    return None;
                }
            };
            let start = custom.start.as_deref().and_then(parse_calendar_date);
            let end = custom.end.as_deref().and_then(parse_calendar_date);
            match (start, end) {
                (Some(start), Some(end)) => Some(DateRange { start, end }),
                _ => {
                    warn!(
                        start = ?custom.start,
                        end = ?custom.end,
                        "自定义日期范围无法解析，按不过滤处理"
                    );
                    None
                }
            }
        }
    }
}

/// 本周一（周日算作上一周的最后一天）
pub fn week_start(today: NaiveDate) -> NaiveDate {
    let day_of_week = today.weekday().num_days_from_sunday() as i64;
    if day_of_week == 0 {
        today - Duration::days(6)
    } else {
        today - Duration::days(day_of_week - 1)
    }
}

fn first_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
}

fn last_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    first_of_month(next_year, next_month).and_then(|d| d.pred_opt())
}

/// 把自定义范围字符串解析为本地日历日期（不经 UTC 换算）
///
/// 接受 YYYY-MM-DD，也接受带时间的字符串（只取日期部分）。
pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let date_part = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

// ==========================================
// 归属判定
// ==========================================

impl DateRange {
    /// 归一后的闭区间边界（本地时间）
    pub fn bounds(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let start = self.start.and_hms_milli_opt(0, 0, 0, 0)?;
        let end = self.end.and_hms_milli_opt(23, 59, 59, 999)?;
        Some((start, end))
    }

    pub fn contains_local(&self, local: NaiveDateTime) -> bool {
        match self.bounds() {
            Some((start, end)) => start <= local && local <= end,
            None => false,
        }
    }
}

/// 时间戳字符串是否落在范围内
pub fn in_range(raw: &str, range: &DateRange, calendar: &LocalCalendar) -> bool {
    match calendar.parse_timestamp(raw) {
        Some(dt) => range.contains_local(dt.naive_local()),
        None => {
            warn!(raw_value = raw, "日期解析失败，视为不在范围内");
            false
        }
    }
}

fn opt_in_range(raw: Option<&str>, range: &DateRange, calendar: &LocalCalendar) -> bool {
    raw.map(|r| in_range(r, range, calendar)).unwrap_or(false)
}

/// 作业计划是否落在范围内（活动口径）
///
/// 任一步骤 updatedAt 在范围内即保留；否则回退检查作业 createdAt。
/// 因此很久以前创建的作业，只要某一步骤在窗口内被更新过，也会出现在该窗口中。
pub fn job_plan_in_range(job: &JobPlan, range: &DateRange, calendar: &LocalCalendar) -> bool {
    let touched = job
        .steps
        .iter()
        .any(|s| opt_in_range(s.updated_at.as_deref(), range, calendar));
    if touched {
        return true;
    }
    opt_in_range(job.created_at.as_deref(), range, calendar)
}

/// 已完成作业是否落在范围内（completedAt，缺失时回退 createdAt）
pub fn completed_job_in_range(
    job: &CompletedJob,
    range: &DateRange,
    calendar: &LocalCalendar,
) -> bool {
    match job.completed_at.as_deref() {
        Some(raw) => in_range(raw, range, calendar),
        None => opt_in_range(job.created_at.as_deref(), range, calendar),
    }
}

/// 过滤数据集（停机作业与机台台账原样保留）
///
/// 已被完成列表取代的作业计划先按未过滤的完成列表剔除，再按日期过滤，
/// 完成时间落在窗口外的作业不会因此重新变成活动作业。
pub fn filter_dataset(
    dataset: &DashboardDataset,
    range: Option<&DateRange>,
    calendar: &LocalCalendar,
) -> DashboardDataset {
    let Some(range) = range else {
        return dataset.clone();
    };

    let job_plans: Vec<JobPlan> = dataset
        .active_job_plans()
        .into_iter()
        .filter(|j| job_plan_in_range(j, range, calendar))
        .cloned()
        .collect();
    let completed_jobs: Vec<CompletedJob> = dataset
        .completed_jobs
        .iter()
        .filter(|j| completed_job_in_range(j, range, calendar))
        .cloned()
        .collect();

    debug!(
        start = %range.start,
        end = %range.end,
        job_plans = job_plans.len(),
        completed_jobs = completed_jobs.len(),
        "数据集按日期过滤完成"
    );

    DashboardDataset {
        job_plans,
        completed_jobs,
        held_jobs: dataset.held_jobs.clone(),
        machines: dataset.machines.clone(),
    }
}
