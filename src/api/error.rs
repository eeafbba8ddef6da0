// ==========================================
// 瓦楞纸箱生产运营看板 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，转换数据源错误为用户友好的错误消息
// ==========================================

use crate::repository::error::DataSourceError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 输入错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据源错误: {0}")]
    DataSourceError(String),

    #[error("认证失败: {0}")]
    Unauthorized(String),

    #[error("配置读取失败: {0}")]
    ConfigError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// 从 DataSourceError 转换
// ==========================================
impl From<DataSourceError> for ApiError {
    fn from(err: DataSourceError) -> Self {
        match err {
            DataSourceError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            DataSourceError::Unauthorized(msg) => ApiError::Unauthorized(msg),
            DataSourceError::Network(msg) => ApiError::DataSourceError(msg),
            DataSourceError::Decode(e) => {
                ApiError::DataSourceError(format!("数据格式错误: {}", e))
            }
            DataSourceError::Io(e) => ApiError::DataSourceError(format!("读取失败: {}", e)),
            DataSourceError::Other(e) => ApiError::Other(e),
        }
    }
}

/// API Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
