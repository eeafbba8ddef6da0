// ==========================================
// 瓦楞纸箱生产运营看板 - 配置管理器
// ==========================================
// 职责: 看板配置的读取、覆写、导出与恢复
// 存储: config_kv 表 (scope_id + key → value)
// ==========================================

use crate::config::dashboard_config_trait::{
    DashboardConfigReader, DEFAULT_DETAIL_FETCH_CONCURRENCY,
};
use crate::db::{ensure_config_schema, open_sqlite_connection};
use crate::domain::types::{DateFilter, EmptyJobPolicy, ResolverPrecision};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::error::Error;
use std::sync::{Arc, Mutex, MutexGuard};

const GLOBAL_SCOPE: &str = "global";
const META_KEY_PREFIX: &str = "__meta_";

const UPSERT_SQL: &str = "INSERT INTO config_kv (scope_id, key, value) VALUES (?1, ?2, ?3)
     ON CONFLICT(scope_id, key) DO UPDATE SET value = ?3, updated_at = datetime('now')";

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 打开配置库（必要时建表）
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;
        ensure_config_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 复用已有连接
    ///
    /// 传入连接会重新应用统一 PRAGMA 并补建配置表（均幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        let manager = Self { conn };
        {
            let guard = manager.lock()?;
            crate::db::configure_sqlite_connection(&guard)?;
            ensure_config_schema(&guard)?;
        }
        Ok(manager)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, Box<dyn Error>> {
        self.conn
            .lock()
            .map_err(|e| format!("配置库锁获取失败: {}", e).into())
    }

    /// 读取 global scope 的配置值
    pub fn get_global_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.lock()?;
        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = ?1 AND key = ?2",
                params![GLOBAL_SCOPE, key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 写入 global scope 的配置值（存在则覆盖）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.lock()?;
        conn.execute(UPSERT_SQL, params![GLOBAL_SCOPE, key, value])?;
        tracing::info!(config_key = key, value = value, "配置已更新");
        Ok(())
    }

    /// 导出 global 配置快照（按键排序的 JSON 对象）
    ///
    /// 用于在多台看板终端之间同步配置。
    pub fn get_config_snapshot(&self) -> Result<String, Box<dyn Error>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = ?1")?;
        let entries = stmt
            .query_map(params![GLOBAL_SCOPE], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<Result<BTreeMap<String, String>, _>>()?;

        Ok(serde_json::to_string(&entries)?)
    }

    /// 从快照恢复配置，返回写入的条目数
    ///
    /// 覆盖同名 global 配置；`__meta_` 前缀的键只作说明，不回写。
    pub fn restore_config_from_snapshot(&self, snapshot_json: &str) -> Result<usize, Box<dyn Error>> {
        let entries: BTreeMap<String, String> = serde_json::from_str(snapshot_json)?;

        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let mut restored = 0;
        for (key, value) in entries.iter().filter(|(k, _)| !k.starts_with(META_KEY_PREFIX)) {
            restored += tx.execute(UPSERT_SQL, params![GLOBAL_SCOPE, key, value])?;
        }
        tx.commit()?;

        tracing::info!(restored, "配置快照已恢复");
        Ok(restored)
    }

    /// 读取并解析一个配置项；缺失取默认值，无法解析时告警并取默认值
    fn read_parsed<T, F>(&self, key: &str, default: T, parse: F) -> Result<T, Box<dyn Error>>
    where
        F: FnOnce(&str) -> Option<T>,
    {
        let Some(raw) = self.get_global_config_value(key)? else {
            return Ok(default);
        };
        match parse(raw.trim()) {
            Some(value) => Ok(value),
            None => {
                tracing::warn!(config_key = key, raw_value = %raw, "配置值非法，使用默认值");
                Ok(default)
            }
        }
    }
}

// ==========================================
// DashboardConfigReader 实现
// ==========================================
// 取值非法时回退默认值，不中断刷新
#[async_trait]
impl DashboardConfigReader for ConfigManager {
    async fn get_default_date_filter(&self) -> Result<DateFilter, Box<dyn Error>> {
        self.read_parsed(config_keys::DEFAULT_DATE_FILTER, DateFilter::All, DateFilter::parse)
    }

    async fn get_empty_job_policy(&self) -> Result<EmptyJobPolicy, Box<dyn Error>> {
        self.read_parsed(
            config_keys::EMPTY_JOB_POLICY,
            EmptyJobPolicy::Completed,
            EmptyJobPolicy::parse,
        )
    }

    async fn get_job_table_precision(&self) -> Result<ResolverPrecision, Box<dyn Error>> {
        self.read_parsed(
            config_keys::JOB_TABLE_PRECISION,
            ResolverPrecision::Strict,
            ResolverPrecision::parse,
        )
    }

    async fn get_utc_offset_minutes(&self) -> Result<Option<i32>, Box<dyn Error>> {
        // 未配置时跟随系统本地时区
        self.read_parsed(config_keys::UTC_OFFSET_MINUTES, None, |raw| {
            raw.parse::<i32>()
                .ok()
                .filter(|m| (-24 * 60..=24 * 60).contains(m))
                .map(Some)
        })
    }

    async fn get_detail_fetch_concurrency(&self) -> Result<usize, Box<dyn Error>> {
        self.read_parsed(
            config_keys::DETAIL_FETCH_CONCURRENCY,
            DEFAULT_DETAIL_FETCH_CONCURRENCY,
            |raw| raw.parse::<usize>().ok().filter(|n| *n > 0),
        )
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 日期过滤
    pub const DEFAULT_DATE_FILTER: &str = "default_date_filter";
    pub const UTC_OFFSET_MINUTES: &str = "utc_offset_minutes";

    // 状态判定
    pub const EMPTY_JOB_POLICY: &str = "empty_job_policy";
    pub const JOB_TABLE_PRECISION: &str = "job_table_precision";

    // 数据拉取
    pub const DETAIL_FETCH_CONCURRENCY: &str = "detail_fetch_concurrency";
}
