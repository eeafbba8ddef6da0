// ==========================================
// 瓦楞纸箱生产运营看板 - 命令行入口
// ==========================================
// 用法: corrugated-ops [dataset.json] [filter] [db_path]
// - dataset.json: 数据导出文件（默认 ./dataset.json）
// - filter: all / today / week / month / quarter / year / custom:YYYY-MM-DD..YYYY-MM-DD
//           （缺省时使用配置库中的默认过滤器）
// - db_path: 配置库路径（缺省时见 get_default_db_path）
// 输出: 快照 JSON（stdout），日志写 stderr
// ==========================================

use std::sync::Arc;

use anyhow::{anyhow, Context};
use corrugated_ops::app::{get_default_db_path, AppState};
use corrugated_ops::domain::types::{CustomRange, DateFilter};
use corrugated_ops::logging;
use corrugated_ops::repository::FileJobDataProvider;

const DEFAULT_DATASET_PATH: &str = "./dataset.json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("{}", corrugated_ops::APP_NAME);
    tracing::info!("系统版本: {}", corrugated_ops::VERSION);
    tracing::info!("==================================================");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let dataset_path = args
        .first()
        .cloned()
        .unwrap_or_else(|| DEFAULT_DATASET_PATH.to_string());
    let filter_arg = args.get(1).cloned();
    let db_path = args.get(2).cloned().unwrap_or_else(get_default_db_path);

    tracing::info!(dataset = %dataset_path, db_path = %db_path, "加载数据源");

    let provider = Arc::new(FileJobDataProvider::new(&dataset_path));
    let app_state = AppState::new(db_path, provider).map_err(|e| anyhow!(e))?;

    let mut snapshot = app_state
        .dashboard_api
        .refresh()
        .await
        .context("看板刷新失败")?;

    if let Some(raw) = filter_arg {
        let (filter, custom) = parse_filter_arg(&raw)?;
        snapshot = app_state
            .dashboard_api
            .apply_date_filter(filter, custom)
            .await
            .context("日期过滤失败")?;
    }

    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

/// 解析过滤器参数（custom:START..END）
fn parse_filter_arg(raw: &str) -> anyhow::Result<(DateFilter, Option<CustomRange>)> {
    if let Some(range) = raw.strip_prefix("custom:") {
        let (start, end) = range
            .split_once("..")
            .ok_or_else(|| anyhow!("自定义范围格式应为 custom:YYYY-MM-DD..YYYY-MM-DD"))?;
        return Ok((DateFilter::Custom, Some(CustomRange::new(start, end))));
    }

    let filter = DateFilter::parse(raw).ok_or_else(|| anyhow!("无法识别的日期过滤器: {}", raw))?;
    Ok((filter, None))
}
