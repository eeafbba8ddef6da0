// ==========================================
// 瓦楞纸箱生产运营看板 - 日志初始化
// ==========================================
// tracing-subscriber 输出到 stderr，stdout 只留给快照 JSON
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// 日志格式切换变量
pub const LOG_FORMAT_ENV: &str = "CORRUGATED_OPS_LOG_FORMAT";

/// 日志输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// 人读的单行文本（默认）
    Text,
    /// 每条一行 JSON，供车间日志采集
    Json,
}

impl LogFormat {
    /// 从环境变量读取；未设置或不识别时为 Text
    pub fn from_env() -> Self {
        match std::env::var(LOG_FORMAT_ENV) {
            Ok(v) if v.trim().eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Text,
        }
    }
}

/// 初始化日志系统
///
/// - `RUST_LOG` 控制过滤（默认 info），如 `RUST_LOG=corrugated_ops::engine=debug`
/// - `CORRUGATED_OPS_LOG_FORMAT=json` 切到 JSON 行
///
/// ```no_run
/// corrugated_ops::logging::init();
/// ```
pub fn init() {
    init_with(LogFormat::from_env());
}

/// 以指定格式初始化（重复调用时静默忽略）
pub fn init_with(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true)
        .with_writer(std::io::stderr);

    let result = match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.try_init(),
    };
    if result.is_err() {
        tracing::debug!("日志订阅器已存在，跳过初始化");
    }
}

/// 测试用：debug 级别，输出交给测试框架捕获
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
