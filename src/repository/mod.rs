// ==========================================
// 瓦楞纸箱生产运营看板 - 数据源层
// ==========================================
// 红线: 数据源不含业务逻辑
// ==========================================
// 职责: 提供数据读取接口,屏蔽后端接口 / 导出文件细节
// ==========================================

pub mod error;
pub mod job_data_provider;

// 重导出核心数据源
pub use error::{DataSourceError, DataSourceResult};
pub use job_data_provider::{
    DatasetExport, FileJobDataProvider, InMemoryJobDataProvider, JobDataProvider,
};
