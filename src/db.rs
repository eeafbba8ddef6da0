// ==========================================
// 瓦楞纸箱生产运营看板 - SQLite 连接初始化
// ==========================================
// 所有配置库连接都经由 open_sqlite_connection 打开
// ==========================================

use rusqlite::Connection;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 每个连接都要单独应用的 PRAGMA
///
/// - foreign_keys: config_kv 依赖 config_scope 级联删除
/// - busy_timeout: 多个终端同时写配置时等待而不是立即报 busy
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.pragma_update(None, "foreign_keys", true)?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))
}

/// 打开配置库连接并应用统一 PRAGMA
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    Connection::open(db_path).and_then(|conn| {
        configure_sqlite_connection(&conn)?;
        Ok(conn)
    })
}

/// 建立配置表（幂等）
///
/// config_scope 目前只有 global 一行，保留作用域列便于以后按产线区分配置。
pub fn ensure_config_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS config_scope (
            scope_id TEXT PRIMARY KEY,
            scope_type TEXT NOT NULL,
            scope_key TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(scope_type, scope_key)
        );

        INSERT OR IGNORE INTO config_scope (scope_id, scope_type, scope_key)
        VALUES ('global', 'GLOBAL', 'global');

        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL REFERENCES config_scope(scope_id) ON DELETE CASCADE,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (scope_id, key)
        );
        "#,
    )
}
