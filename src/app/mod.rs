// ==========================================
// 瓦楞纸箱生产运营看板 - 应用层
// ==========================================
// 职责: 组装配置库、数据源与看板 API
// ==========================================

pub mod state;

// 重导出
pub use state::{get_default_db_path, AppState};
