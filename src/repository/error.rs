// ==========================================
// 瓦楞纸箱生产运营看板 - 数据源错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 数据源（后端接口 / 数据导出文件）错误类型
#[derive(Error, Debug)]
pub enum DataSourceError {
    // ===== 传输错误 =====
    #[error("数据源请求失败: {0}")]
    Network(String),

    #[error("数据源认证失败: {0}")]
    Unauthorized(String),

    // ===== 数据错误 =====
    #[error("记录未找到: {entity} with id={id}")]
    NotFound { entity: String, id: String },

    #[error("数据解析失败: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("文件读取失败: {0}")]
    Io(#[from] std::io::Error),

    // ===== 通用错误 =====
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DataSourceError {
    /// 明细查询的 404 视为"没有明细"，不算失败
    pub fn is_not_found(&self) -> bool {
        matches!(self, DataSourceError::NotFound { .. })
    }
}

/// Result 类型别名
pub type DataSourceResult<T> = Result<T, DataSourceError>;
