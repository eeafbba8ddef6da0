// ==========================================
// 瓦楞纸箱生产运营看板 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、聚合输出结构
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod job;
pub mod snapshot;
pub mod step;
pub mod types;

// 重导出核心类型
pub use job::{
    CompletedJob, DashboardDataset, HeldJob, HeldMachine, JobPlan, LedgerEntry, MachineRecord,
    MachineStatus,
};
pub use snapshot::{
    AggregateSnapshot, JobPlanRow, JobRef, MachineTypeUsage, MachineUtilization, StepBucket,
    StepDrillDown, StepStatusCell, TimeSeriesPoint,
};
pub use step::{Step, StepCategory, StepDetailData, StepDetails, StepTypeDetail};
pub use types::{
    CustomRange, DateFilter, DateRange, DetailStatus, EmptyJobPolicy, JobCategory, JobDemand,
    ResolvedStatus, ResolverPrecision, StepStatus,
};
