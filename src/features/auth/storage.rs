use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use sqlx::{ConnectOptions, Row, SqlitePool, sqlite::SqliteConnectOptions};
use uuid::Uuid;

use crate::error::AppError;

use super::models::{Session, User};

/// 用户与会话存储（SQLite）。
///
/// 用户名唯一性由 `UNIQUE` 索引保证，注册并发冲突时由数据库裁决，
/// 应用层不加锁。
#[derive(Clone)]
pub struct UserStorage {
    pub pool: SqlitePool,
}

impl UserStorage {
    pub async fn connect_sqlite(path: &str, wal: bool) -> Result<Self, AppError> {
        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .map_err(|e| AppError::Internal(format!("create data dir: {e}")))?;
        }
        let opt = SqliteConnectOptions::new()
            .filename(Path::new(path))
            .create_if_missing(true)
            .log_statements(tracing::log::LevelFilter::Off);
        let pool = SqlitePool::connect_with(opt)
            .await
            .map_err(|e| AppError::Internal(format!("sqlite connect: {e}")))?;
        if wal {
            sqlx::query("PRAGMA journal_mode=WAL;")
                .execute(&pool)
                .await
                .ok();
        }
        sqlx::query("PRAGMA synchronous=NORMAL;")
            .execute(&pool)
            .await
            .ok();
        sqlx::query("PRAGMA foreign_keys=ON;")
            .execute(&pool)
            .await
            .ok();
        Ok(Self { pool })
    }

    pub async fn init_schema(&self) -> Result<(), AppError> {
        let ddl = r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS sessions (
            id TEXT PRIMARY KEY,
            user_id INTEGER NOT NULL REFERENCES users(id),
            created_at TEXT NOT NULL,
            expires_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_sessions_user ON sessions(user_id);
        CREATE INDEX IF NOT EXISTS idx_sessions_expires_at ON sessions(expires_at);
        "#;
        sqlx::query(ddl)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Internal(format!("init schema: {e}")))?;
        Ok(())
    }

    /// 创建用户；用户名已存在时返回 400 校验错误
    pub async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<User, AppError> {
        let now = Utc::now().to_rfc3339();
        let res = sqlx::query(
            "INSERT INTO users(username, password_hash, created_at) VALUES(?, ?, ?)",
        )
        .bind(username)
        .bind(password_hash)
        .bind(&now)
        .execute(&self.pool)
        .await;

        match res {
            Ok(done) => Ok(User {
                id: done.last_insert_rowid(),
                username: username.to_string(),
                password_hash: password_hash.to_string(),
                created_at: now,
            }),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => Err(
                AppError::Validation("Username already exists".to_string()),
            ),
            Err(e) => Err(AppError::Internal(format!("insert user: {e}"))),
        }
    }

    pub async fn find_user(&self, username: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, created_at FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Internal(format!("find user: {e}")))?;
        Ok(user)
    }

    pub async fn user_count(&self) -> Result<i64, AppError> {
        let row = sqlx::query("SELECT COUNT(1) AS c FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Internal(format!("count users: {e}")))?;
        Ok(row.try_get("c").unwrap_or(0))
    }

    /// 创建会话并返回（会话 ID 为随机 UUID）
    pub async fn create_session(
        &self,
        user_id: i64,
        ttl_secs: u64,
    ) -> Result<Session, AppError> {
        let now = Utc::now();
        let session = Session {
            id: Uuid::new_v4().to_string(),
            user_id,
            created_at: now.to_rfc3339(),
            expires_at: (now + Duration::seconds(ttl_secs as i64)).to_rfc3339(),
        };
        sqlx::query(
            "INSERT INTO sessions(id, user_id, created_at, expires_at) VALUES(?, ?, ?, ?)",
        )
        .bind(&session.id)
        .bind(session.user_id)
        .bind(&session.created_at)
        .bind(&session.expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Internal(format!("insert session: {e}")))?;
        Ok(session)
    }

    /// 按会话 ID 取未过期会话对应的用户
    pub async fn session_user(
        &self,
        session_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT u.id, u.username, u.password_hash, u.created_at
             FROM sessions s JOIN users u ON u.id = s.user_id
             WHERE s.id = ? AND s.expires_at > ?",
        )
        .bind(session_id)
        .bind(now.to_rfc3339())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Internal(format!("query session: {e}")))?;
        Ok(user)
    }

    /// 删除未过期的会话；返回是否确有删除。
    /// 已过期但尚未清理的行不算有效会话，删除它不应被视为一次登出。
    pub async fn delete_session(
        &self,
        session_id: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        let deleted = sqlx::query("DELETE FROM sessions WHERE id = ? AND expires_at > ?")
            .bind(session_id)
            .bind(now.to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Internal(format!("delete session: {e}")))?
            .rows_affected();
        Ok(deleted > 0)
    }

    /// 清理过期会话（启动时调用一次）
    pub async fn cleanup_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let deleted = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
            .bind(now.to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Internal(format!("cleanup sessions: {e}")))?
            .rows_affected();
        Ok(deleted)
    }
}
