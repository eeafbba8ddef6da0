// ==========================================
// 瓦楞纸箱生产运营看板 - 核心库
// ==========================================
// 职责: 多代步骤状态归一 + 作业/工序/时间/机台维度的聚合快照
// 技术栈: Rust + Tokio + SQLite（配置存储）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据源层 - 数据读取
pub mod repository;

// 引擎层 - 状态判定与聚合
pub mod engine;

// 配置层 - 看板配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    DateFilter, DetailStatus, EmptyJobPolicy, JobCategory, ResolvedStatus, ResolverPrecision,
    StepStatus,
};

// 领域实体
pub use domain::{
    AggregateSnapshot, CompletedJob, DashboardDataset, HeldJob, JobPlan, MachineRecord, Step,
    StepCategory,
};

// 引擎
pub use engine::{
    DashboardAggregateBuilder, JobClassifier, LocalCalendar, StatusResolver,
    StepStatisticsAggregator, TimeSeriesBinner,
};

// API
pub use api::{ApiError, ApiResult, DashboardApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "瓦楞纸箱生产运营看板";
