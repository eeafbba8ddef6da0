// ==========================================
// 瓦楞纸箱生产运营看板 - API 层
// ==========================================
// 职责: 提供看板业务接口,供命令行 / 嵌入方调用
// ==========================================

pub mod error;
pub mod dashboard_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use dashboard_api::DashboardApi;
