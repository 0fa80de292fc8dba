//! Interaction 存储引擎

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use vt_core::{Interaction, Result, VeritasError};

/// Interaction 存储契约
///
/// 实现方负责同一 ID 冲突写入的串行化；编排层不再额外加锁。
#[async_trait]
pub trait InteractionStore: Send + Sync {
    /// 创建记录；ID 冲突 → `DuplicateKey`
    async fn create(&self, entry: &Interaction) -> Result<()>;

    /// 按 ID 点查；不存在 → `NotFound`
    async fn get(&self, id: &str) -> Result<Interaction>;

    /// 只更新反馈字段；先确认存在再修改，不存在 → `NotFound`
    async fn update_feedback(&self, id: &str, is_correct: bool, feedback: &str) -> Result<()>;

    /// 所有 `is_correct = false` 的记录，按创建时间倒序；无结果返回空 Vec
    async fn list_unresolved(&self) -> Result<Vec<Interaction>>;
}

/// SQLite 存储配置
#[derive(Debug, Clone)]
pub struct SqliteStoreConfig {
    /// 连接串，如 `sqlite://veritas.db` 或 `sqlite::memory:`
    pub url: String,
    /// 连接池上限
    pub max_connections: u32,
}

impl Default for SqliteStoreConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://veritas.db".to_string(),
            max_connections: 8,
        }
    }
}

impl SqliteStoreConfig {
    fn is_in_memory(&self) -> bool {
        self.url.contains(":memory:") || self.url.contains("mode=memory")
    }
}

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS interactions (
        id TEXT PRIMARY KEY,
        prompt TEXT NOT NULL,
        responder_answer TEXT NOT NULL,
        reviewer_notes TEXT NOT NULL,
        is_correct BOOLEAN NOT NULL DEFAULT 0,
        feedback TEXT NOT NULL DEFAULT '',
        created_at INTEGER NOT NULL
    )
"#;

const CREATE_UNRESOLVED_INDEX: &str = r#"
    CREATE INDEX IF NOT EXISTS idx_interactions_unresolved
    ON interactions (is_correct, created_at DESC)
"#;

const SELECT_COLUMNS: &str =
    "SELECT id, prompt, responder_answer, reviewer_notes, is_correct, feedback, created_at FROM interactions";

/// 数据库行
#[derive(Debug, sqlx::FromRow)]
struct InteractionRow {
    id: String,
    prompt: String,
    responder_answer: String,
    reviewer_notes: String,
    is_correct: bool,
    feedback: String,
    created_at: i64,
}

impl InteractionRow {
    fn into_entity(self) -> Result<Interaction> {
        let created_at = DateTime::<Utc>::from_timestamp_micros(self.created_at).ok_or_else(|| {
            VeritasError::Persistence(format!(
                "interaction {} has out-of-range created_at {}",
                self.id, self.created_at
            ))
        })?;
        Ok(Interaction {
            id: self.id,
            prompt: self.prompt,
            responder_answer: self.responder_answer,
            reviewer_notes: self.reviewer_notes,
            is_correct: self.is_correct,
            feedback: self.feedback,
            created_at,
        })
    }
}

const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;

/// 等待其它连接释放锁的上限
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// 扩展错误码的低 8 位是主错误码
fn is_lock_contention(code: Option<&str>) -> bool {
    code.and_then(|c| c.parse::<i32>().ok())
        .is_some_and(|c| matches!(c & 0xff, SQLITE_BUSY | SQLITE_LOCKED))
}

/// 将 sqlx 错误翻译为存储层错误
fn map_sqlx_error(context: &str, err: sqlx::Error) -> VeritasError {
    match err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            VeritasError::DuplicateKey(format!("{context}: {db}"))
        }
        sqlx::Error::Database(db) if is_lock_contention(db.code().as_deref()) => {
            VeritasError::StoreUnavailable(format!("{context}: {db}"))
        }
        sqlx::Error::Io(e) => VeritasError::StoreUnavailable(format!("{context}: {e}")),
        sqlx::Error::PoolTimedOut => {
            VeritasError::StoreUnavailable(format!("{context}: connection pool timed out"))
        }
        sqlx::Error::PoolClosed => {
            VeritasError::StoreUnavailable(format!("{context}: connection pool closed"))
        }
        other => VeritasError::Persistence(format!("{context}: {other}")),
    }
}

/// 基于 SQLite 的 Interaction 存储
///
/// 所有写入都经过只有一条连接的 `writer` 池，彼此串行；读取走 `reader` 池。
/// 内存库两者是同一个池。
#[derive(Debug, Clone)]
pub struct SqliteInteractionStore {
    reader: SqlitePool,
    writer: SqlitePool,
}

impl SqliteInteractionStore {
    /// 连接数据库并确保表结构存在
    pub async fn connect(config: &SqliteStoreConfig) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(&config.url)
            .map_err(|e| VeritasError::Config(format!("invalid database url {}: {e}", config.url)))?
            .create_if_missing(true)
            .busy_timeout(BUSY_TIMEOUT);

        let store = if config.is_in_memory() {
            // 内存库每个连接是独立数据库，只能保留一条常驻连接
            let pool = SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await
                .map_err(|e| map_sqlx_error("connect", e))?;
            Self {
                reader: pool.clone(),
                writer: pool,
            }
        } else {
            // 先建写连接，由它创建数据库文件并切换到 WAL
            let writer = SqlitePoolOptions::new()
                .max_connections(1)
                .connect_with(options.clone())
                .await
                .map_err(|e| map_sqlx_error("connect writer", e))?;
            let reader = SqlitePoolOptions::new()
                .max_connections(config.max_connections.max(1))
                .connect_with(options)
                .await
                .map_err(|e| map_sqlx_error("connect reader", e))?;
            Self { reader, writer }
        };

        store.migrate().await?;
        tracing::info!(url = %config.url, "interaction store ready");
        Ok(store)
    }

    /// 内存数据库 (测试用)
    pub async fn in_memory() -> Result<Self> {
        Self::connect(&SqliteStoreConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        })
        .await
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::query(CREATE_TABLE)
            .execute(&self.writer)
            .await
            .map_err(|e| map_sqlx_error("create table", e))?;
        sqlx::query(CREATE_UNRESOLVED_INDEX)
            .execute(&self.writer)
            .await
            .map_err(|e| map_sqlx_error("create index", e))?;
        Ok(())
    }

    /// 关闭连接池
    pub async fn close(&self) {
        self.reader.close().await;
        self.writer.close().await;
    }
}

#[async_trait]
impl InteractionStore for SqliteInteractionStore {
    async fn create(&self, entry: &Interaction) -> Result<()> {
        entry.validate()?;

        sqlx::query(
            r#"
            INSERT INTO interactions (id, prompt, responder_answer, reviewer_notes, is_correct, feedback, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&entry.id)
        .bind(&entry.prompt)
        .bind(&entry.responder_answer)
        .bind(&entry.reviewer_notes)
        .bind(entry.is_correct)
        .bind(&entry.feedback)
        .bind(entry.created_at.timestamp_micros())
        .execute(&self.writer)
        .await
        .map_err(|e| map_sqlx_error(&format!("insert interaction {}", entry.id), e))?;

        tracing::debug!(id = %entry.id, "interaction stored");
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Interaction> {
        let row = sqlx::query_as::<_, InteractionRow>(&format!("{SELECT_COLUMNS} WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.reader)
            .await
            .map_err(|e| map_sqlx_error(&format!("fetch interaction {id}"), e))?;

        row.ok_or_else(|| VeritasError::NotFound(id.to_string()))?
            .into_entity()
    }

    async fn update_feedback(&self, id: &str, is_correct: bool, feedback: &str) -> Result<()> {
        // 检查与更新在唯一的写连接上完成，事务不会与其它写入竞争升级写锁
        let mut tx = self
            .writer
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin feedback update", e))?;

        let exists = sqlx::query("SELECT 1 FROM interactions WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error(&format!("check interaction {id}"), e))?;

        if exists.is_none() {
            // 未修改任何数据，直接回滚
            tx.rollback()
                .await
                .map_err(|e| map_sqlx_error("rollback feedback update", e))?;
            return Err(VeritasError::NotFound(id.to_string()));
        }

        sqlx::query("UPDATE interactions SET is_correct = ?, feedback = ? WHERE id = ?")
            .bind(is_correct)
            .bind(feedback)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error(&format!("update interaction {id}"), e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit feedback update", e))?;

        tracing::debug!(%id, is_correct, "interaction feedback updated");
        Ok(())
    }

    async fn list_unresolved(&self) -> Result<Vec<Interaction>> {
        let rows = sqlx::query_as::<_, InteractionRow>(&format!(
            "{SELECT_COLUMNS} WHERE is_correct = 0 ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.reader)
        .await
        .map_err(|e| map_sqlx_error("list unresolved interactions", e))?;

        rows.into_iter().map(InteractionRow::into_entity).collect()
    }
}
