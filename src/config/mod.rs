// ==========================================
// 瓦楞纸箱生产运营看板 - 配置层
// ==========================================
// 职责: 看板配置管理
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod dashboard_config_trait;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager};
pub use dashboard_config_trait::{DashboardConfigReader, DashboardSettings};
