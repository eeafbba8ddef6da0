// ==========================================
// 瓦楞纸箱生产运营看板 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use std::sync::Arc;

use crate::api::DashboardApi;
use crate::config::config_manager::ConfigManager;
use crate::repository::JobDataProvider;

/// 应用状态
///
/// 包含看板 API 和共享的配置管理器
pub struct AppState {
    /// 配置库路径
    pub db_path: String,

    /// 配置管理器（看板 API 通过 DashboardConfigReader 读取）
    pub config_manager: Arc<ConfigManager>,

    /// 看板API
    pub dashboard_api: Arc<DashboardApi>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - db_path: 配置库文件路径（不存在时自动创建并建表）
    /// - provider: 作业数据源
    ///
    /// # 返回
    /// - Ok(AppState): 应用状态实例
    /// - Err(String): 初始化错误
    pub fn new(db_path: String, provider: Arc<dyn JobDataProvider>) -> Result<Self, String> {
        tracing::info!("初始化AppState，配置库路径: {}", db_path);

        let config_manager = Arc::new(
            ConfigManager::new(&db_path).map_err(|e| format!("无法打开配置库: {}", e))?,
        );

        let dashboard_api = Arc::new(DashboardApi::new(provider, config_manager.clone()));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            config_manager,
            dashboard_api,
        })
    }
}

/// 配置库路径环境变量
pub const DB_PATH_ENV: &str = "CORRUGATED_OPS_DB_PATH";

const DB_FILE_NAME: &str = "corrugated_ops.db";

#[cfg(debug_assertions)]
const DATA_DIR_NAME: &str = "corrugated-ops-dev";
#[cfg(not(debug_assertions))]
const DATA_DIR_NAME: &str = "corrugated-ops";

/// 默认配置库路径
///
/// 顺序: `CORRUGATED_OPS_DB_PATH` → 用户数据目录 → 当前目录
pub fn get_default_db_path() -> String {
    if let Some(path) = std::env::var(DB_PATH_ENV)
        .ok()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
    {
        return path;
    }

    let path = match dirs::data_dir() {
        Some(data_dir) => {
            let dir = data_dir.join(DATA_DIR_NAME);
            if let Err(e) = std::fs::create_dir_all(&dir) {
                tracing::warn!(dir = %dir.display(), error = %e, "无法创建数据目录");
            }
            dir.join(DB_FILE_NAME)
        }
        None => std::path::PathBuf::from(".").join(DB_FILE_NAME),
    };

    path.to_string_lossy().into_owned()
}
