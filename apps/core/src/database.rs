//! Persistence gateway.
//!
//! Every operation opens a fresh connection, runs its statements and closes
//! the connection again. The [`Dialect`] is fixed when a connection is
//! acquired and decides the placeholder style, the DDL flavour and how rows
//! are decoded.

use crate::error::AppError;
use crate::models::{
    ActionLog, ChatRecord, JournalEntry, ResourceLink, UserRecord, DEFAULT_RESOURCES,
};
use chrono::Utc;
use sqlx::any::AnyRow;
use sqlx::{Any, AnyConnection, Connection, Row};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

pub const HISTORY_LIMIT: i64 = 50;
pub const JOURNAL_LIMIT: i64 = 10;
pub const RESOURCE_LIMIT: i64 = 5;

pub const USE_MYSQL_ENV: &str = "USE_MYSQL";
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";
pub const MYSQL_URL_ENV: &str = "MYSQL_URL";

// --- Dialects ---

/// SQL flavour of the backing store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// Local file, positional `?` placeholders.
    Sqlite,
    /// Server store, positional `?` placeholders, backticked identifiers.
    Mysql,
    /// Server store, numbered `$n` placeholders.
    Postgres,
}

impl Dialect {
    pub fn from_url(url: &str) -> Result<Self, AppError> {
        let scheme = url.split(':').next().unwrap_or_default().to_ascii_lowercase();
        match scheme.as_str() {
            "sqlite" => Ok(Dialect::Sqlite),
            "mysql" | "mariadb" => Ok(Dialect::Mysql),
            "postgres" | "postgresql" => Ok(Dialect::Postgres),
            other => Err(AppError::Config(format!(
                "Unsupported database scheme '{}'",
                other
            ))),
        }
    }

    /// Rewrites `?` markers into this dialect's placeholder convention.
    pub fn render(&self, sql: &str) -> String {
        match self {
            Dialect::Sqlite | Dialect::Mysql => sql.to_string(),
            Dialect::Postgres => {
                let mut out = String::with_capacity(sql.len() + 8);
                let mut n = 0;
                for ch in sql.chars() {
                    if ch == '?' {
                        n += 1;
                        out.push('$');
                        out.push_str(&n.to_string());
                    } else {
                        out.push(ch);
                    }
                }
                out
            }
        }
    }

    fn id_column(&self) -> &'static str {
        match self {
            Dialect::Sqlite => "id INTEGER PRIMARY KEY AUTOINCREMENT",
            Dialect::Mysql => "id INTEGER PRIMARY KEY AUTO_INCREMENT",
            Dialect::Postgres => "id BIGSERIAL PRIMARY KEY",
        }
    }

    /// `user` is reserved on the server stores and must be quoted.
    pub fn user_column(&self) -> &'static str {
        match self {
            Dialect::Mysql => "`user`",
            Dialect::Sqlite | Dialect::Postgres => r#""user""#,
        }
    }

    pub fn schema(&self) -> Vec<String> {
        let id = self.id_column();
        let user = self.user_column();
        vec![
            format!("CREATE TABLE IF NOT EXISTS chats ({id}, {user} TEXT, bot TEXT, label TEXT)"),
            format!("CREATE TABLE IF NOT EXISTS users ({id}, name TEXT, email TEXT)"),
            format!("CREATE TABLE IF NOT EXISTS journals ({id}, entry TEXT, created_at TEXT)"),
            format!(
                "CREATE TABLE IF NOT EXISTS resources ({id}, title TEXT, url TEXT, category TEXT)"
            ),
            format!(
                "CREATE TABLE IF NOT EXISTS actions ({id}, action_type TEXT, details TEXT, created_at TEXT)"
            ),
        ]
    }

    pub fn decoder(&self) -> &'static dyn RowDecoder {
        match self {
            Dialect::Sqlite => &PositionalDecoder,
            Dialect::Mysql | Dialect::Postgres => &NamedDecoder,
        }
    }
}

// --- Row decoding ---

/// Reads typed columns out of a row. Each query lists its columns in a fixed
/// order, so both a position and a name are always available.
pub trait RowDecoder: Send + Sync {
    fn text(&self, row: &AnyRow, index: usize, name: &str) -> Result<Option<String>, sqlx::Error>;
    fn integer(&self, row: &AnyRow, index: usize, name: &str) -> Result<Option<i64>, sqlx::Error>;
}

/// Decodes by column position.
pub struct PositionalDecoder;

impl RowDecoder for PositionalDecoder {
    fn text(&self, row: &AnyRow, index: usize, _name: &str) -> Result<Option<String>, sqlx::Error> {
        row.try_get(index)
    }

    fn integer(&self, row: &AnyRow, index: usize, _name: &str) -> Result<Option<i64>, sqlx::Error> {
        row.try_get(index)
    }
}

/// Decodes by column name.
pub struct NamedDecoder;

impl RowDecoder for NamedDecoder {
    fn text(&self, row: &AnyRow, _index: usize, name: &str) -> Result<Option<String>, sqlx::Error> {
        row.try_get(name)
    }

    fn integer(&self, row: &AnyRow, _index: usize, name: &str) -> Result<Option<i64>, sqlx::Error> {
        row.try_get(name)
    }
}

// --- Configuration ---

/// Where the store lives. Chosen once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    Sqlite { path: PathBuf },
    Server { url: String },
}

impl StoreConfig {
    /// `USE_MYSQL=1` or a non-empty `DATABASE_URL` selects the server store,
    /// with `MYSQL_URL` as the fallback address. Without any URL it silently
    /// stays on the SQLite file.
    pub fn from_env(default_path: &Path) -> Self {
        let non_empty = |key: &str| std::env::var(key).ok().filter(|u| !u.trim().is_empty());
        let database_url = non_empty(DATABASE_URL_ENV);
        let wants_server = std::env::var(USE_MYSQL_ENV).map(|v| v == "1").unwrap_or(false)
            || database_url.is_some();

        match (wants_server, database_url.or_else(|| non_empty(MYSQL_URL_ENV))) {
            (true, Some(url)) => StoreConfig::Server { url },
            (true, None) => {
                debug!(
                    "Server store requested without {} or {}; using SQLite",
                    DATABASE_URL_ENV, MYSQL_URL_ENV
                );
                StoreConfig::Sqlite {
                    path: default_path.to_path_buf(),
                }
            }
            _ => StoreConfig::Sqlite {
                path: default_path.to_path_buf(),
            },
        }
    }

    pub fn url(&self) -> String {
        match self {
            StoreConfig::Sqlite { path } => format!("sqlite://{}?mode=rwc", path.to_string_lossy()),
            StoreConfig::Server { url } => url.clone(),
        }
    }
}

// --- Store ---

/// Cheap-to-clone handle; holds no open connection.
#[derive(Debug, Clone)]
pub struct Store {
    url: String,
    dialect: Dialect,
}

/// A single open connection with its dialect fixed.
pub struct StoreConnection {
    conn: AnyConnection,
    dialect: Dialect,
}

impl StoreConnection {
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    async fn execute(&mut self, sql: &str, args: &[Option<&str>]) -> Result<u64, sqlx::Error> {
        let rendered = self.dialect.render(sql);
        let mut query = sqlx::query::<Any>(&rendered);
        for arg in args {
            query = query.bind(arg.map(str::to_string));
        }
        Ok(query.execute(&mut self.conn).await?.rows_affected())
    }

    async fn fetch_all(
        &mut self,
        sql: &str,
        args: &[Option<&str>],
    ) -> Result<Vec<AnyRow>, sqlx::Error> {
        let rendered = self.dialect.render(sql);
        let mut query = sqlx::query::<Any>(&rendered);
        for arg in args {
            query = query.bind(arg.map(str::to_string));
        }
        query.fetch_all(&mut self.conn).await
    }

    /// Probes a column with an empty select; a database error means it is absent.
    async fn has_column(&mut self, table: &str, column: &str) -> Result<bool, sqlx::Error> {
        let sql = format!("SELECT {} FROM {} WHERE 1 = 0", column, table);
        match sqlx::query::<Any>(&sql).fetch_all(&mut self.conn).await {
            Ok(_) => Ok(true),
            Err(sqlx::Error::Database(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    pub async fn close(self) -> Result<(), sqlx::Error> {
        self.conn.close().await
    }
}

impl Store {
    pub fn new(config: &StoreConfig) -> Result<Self, AppError> {
        sqlx::any::install_default_drivers();
        let url = config.url();
        let dialect = Dialect::from_url(&url)?;
        match config {
            StoreConfig::Sqlite { path } => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent)?;
                }
            }
            StoreConfig::Server { url } => {
                let parsed = url::Url::parse(url)?;
                debug!("Using server store at {}", parsed.host_str().unwrap_or("localhost"));
            }
        }
        Ok(Self { url, dialect })
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub async fn connect(&self) -> Result<StoreConnection, AppError> {
        let conn = AnyConnection::connect(&self.url).await?;
        Ok(StoreConnection {
            conn,
            dialect: self.dialect,
        })
    }

    /// Creates missing tables and adds `chats.label` to legacy tables.
    #[instrument(skip(self))]
    pub async fn ensure_schema(&self) -> Result<(), AppError> {
        let mut conn = self.connect().await?;
        for ddl in conn.dialect().schema() {
            conn.execute(&ddl, &[]).await?;
        }

        match conn.has_column("chats", "label").await {
            Ok(true) => {}
            Ok(false) => {
                info!("Adding missing 'label' column to chats");
                conn.execute("ALTER TABLE chats ADD COLUMN label TEXT", &[]).await?;
            }
            Err(e) => warn!("Schema introspection failed, skipping migration: {}", e),
        }

        conn.close().await?;
        Ok(())
    }

    /// Inserts the default links when the resources table is empty.
    /// Returns the number of rows inserted.
    #[instrument(skip(self))]
    pub async fn seed_resources(&self) -> Result<usize, AppError> {
        let mut conn = self.connect().await?;
        let existing = conn.fetch_all("SELECT id FROM resources LIMIT 1", &[]).await?;
        let mut inserted = 0;
        if existing.is_empty() {
            for (title, url, category) in DEFAULT_RESOURCES {
                conn.execute(
                    "INSERT INTO resources (title, url, category) VALUES (?, ?, ?)",
                    &[Some(*title), Some(*url), Some(*category)],
                )
                .await?;
                inserted += 1;
            }
            info!("Seeded {} resources", inserted);
        }
        conn.close().await?;
        Ok(inserted)
    }

    #[instrument(skip(self, user, bot))]
    pub async fn insert_chat(&self, user: &str, bot: &str, label: &str) -> Result<(), AppError> {
        let mut conn = self.connect().await?;
        let sql = format!(
            "INSERT INTO chats ({}, bot, label) VALUES (?, ?, ?)",
            conn.dialect().user_column()
        );
        conn.execute(&sql, &[Some(user), Some(bot), Some(label)]).await?;
        conn.close().await?;
        Ok(())
    }

    /// Last 50 chats, newest first.
    pub async fn recent_chats(&self) -> Result<Vec<ChatRecord>, AppError> {
        let mut conn = self.connect().await?;
        let sql = format!(
            "SELECT {}, bot, label FROM chats ORDER BY id DESC LIMIT {}",
            conn.dialect().user_column(),
            HISTORY_LIMIT
        );
        let rows = conn.fetch_all(&sql, &[]).await?;
        let decoder = conn.dialect().decoder();
        let records = rows
            .iter()
            .map(|row| {
                Ok(ChatRecord {
                    user: decoder.text(row, 0, "user")?,
                    bot: decoder.text(row, 1, "bot")?,
                    label: decoder.text(row, 2, "label")?,
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()?;
        conn.close().await?;
        Ok(records)
    }

    /// Stores a journal entry and returns its creation timestamp.
    #[instrument(skip(self, entry))]
    pub async fn insert_journal(&self, entry: &str) -> Result<String, AppError> {
        let created_at = utc_timestamp();
        let mut conn = self.connect().await?;
        conn.execute(
            "INSERT INTO journals (entry, created_at) VALUES (?, ?)",
            &[Some(entry), Some(created_at.as_str())],
        )
        .await?;
        conn.close().await?;
        Ok(created_at)
    }

    /// Last 10 journal entries, newest first.
    pub async fn recent_journals(&self) -> Result<Vec<JournalEntry>, AppError> {
        let mut conn = self.connect().await?;
        let sql = format!(
            "SELECT entry, created_at FROM journals ORDER BY id DESC LIMIT {}",
            JOURNAL_LIMIT
        );
        let rows = conn.fetch_all(&sql, &[]).await?;
        let decoder = conn.dialect().decoder();
        let entries = rows
            .iter()
            .map(|row| {
                Ok(JournalEntry {
                    entry: decoder.text(row, 0, "entry")?,
                    created_at: decoder.text(row, 1, "created_at")?,
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()?;
        conn.close().await?;
        Ok(entries)
    }

    pub async fn insert_user(&self, user: &UserRecord) -> Result<(), AppError> {
        let mut conn = self.connect().await?;
        conn.execute(
            "INSERT INTO users (name, email) VALUES (?, ?)",
            &[Some(user.name.as_str()), Some(user.email.as_str())],
        )
        .await?;
        conn.close().await?;
        Ok(())
    }

    pub async fn insert_action(&self, action: &ActionLog) -> Result<(), AppError> {
        let created_at = utc_timestamp();
        let mut conn = self.connect().await?;
        conn.execute(
            "INSERT INTO actions (action_type, details, created_at) VALUES (?, ?, ?)",
            &[
                action.action_type.as_deref(),
                action.details.as_deref(),
                Some(created_at.as_str()),
            ],
        )
        .await?;
        conn.close().await?;
        Ok(())
    }

    /// Up to five links tagged with `category` or `general`, in insertion order.
    pub async fn resources_for(&self, category: &str) -> Result<Vec<ResourceLink>, AppError> {
        let mut conn = self.connect().await?;
        let sql = format!(
            "SELECT title, url, category FROM resources WHERE category = ? OR category = 'general' ORDER BY id ASC LIMIT {}",
            RESOURCE_LIMIT
        );
        let rows = conn.fetch_all(&sql, &[Some(category)]).await?;
        let decoder = conn.dialect().decoder();
        let links = rows
            .iter()
            .map(|row| {
                Ok(ResourceLink {
                    id: None,
                    title: decoder.text(row, 0, "title")?,
                    url: decoder.text(row, 1, "url")?,
                    category: decoder.text(row, 2, "category")?,
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()?;
        conn.close().await?;
        Ok(links)
    }

    /// Every link in ascending id order.
    pub async fn all_resources(&self) -> Result<Vec<ResourceLink>, AppError> {
        let mut conn = self.connect().await?;
        let rows = conn
            .fetch_all("SELECT id, title, url, category FROM resources ORDER BY id ASC", &[])
            .await?;
        let decoder = conn.dialect().decoder();
        let links = rows
            .iter()
            .map(|row| {
                Ok(ResourceLink {
                    id: decoder.integer(row, 0, "id")?,
                    title: decoder.text(row, 1, "title")?,
                    url: decoder.text(row, 2, "url")?,
                    category: decoder.text(row, 3, "category")?,
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()?;
        conn.close().await?;
        Ok(links)
    }
}

/// UTC now as `YYYY-MM-DDTHH:MM:SS.ffffff`.
pub fn utc_timestamp() -> String {
    Utc::now()
        .naive_utc()
        .format("%Y-%m-%dT%H:%M:%S%.6f")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialect_from_url() {
        assert_eq!(Dialect::from_url("sqlite://x.db").unwrap(), Dialect::Sqlite);
        assert_eq!(
            Dialect::from_url("mysql://u:p@localhost:3306/db").unwrap(),
            Dialect::Mysql
        );
        assert_eq!(
            Dialect::from_url("postgres://u:p@localhost/db").unwrap(),
            Dialect::Postgres
        );
        assert!(matches!(
            Dialect::from_url("oracle://localhost/db"),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn test_placeholder_rendering() {
        let sql = "INSERT INTO t (a, b) VALUES (?, ?)";
        assert_eq!(Dialect::Sqlite.render(sql), sql);
        assert_eq!(Dialect::Mysql.render(sql), sql);
        assert_eq!(
            Dialect::Postgres.render(sql),
            "INSERT INTO t (a, b) VALUES ($1, $2)"
        );
    }

    #[test]
    fn test_schema_flavours() {
        assert!(Dialect::Sqlite.schema()[0].contains("AUTOINCREMENT"));
        assert!(Dialect::Postgres.schema()[0].contains("BIGSERIAL"));
        assert_eq!(Dialect::Postgres.schema().len(), 5);

        let mysql = Dialect::Mysql.schema();
        assert_eq!(mysql.len(), 5);
        assert!(mysql.iter().all(|ddl| ddl.contains("INTEGER PRIMARY KEY AUTO_INCREMENT")));
        assert!(mysql[0].contains("`user` TEXT"));
        assert!(!mysql[0].contains('"'));
    }

    #[test]
    fn test_user_column_quoting() {
        assert_eq!(Dialect::Sqlite.user_column(), "\"user\"");
        assert_eq!(Dialect::Postgres.user_column(), "\"user\"");
        assert_eq!(Dialect::Mysql.user_column(), "`user`");
    }

    #[test]
    fn test_store_config_falls_back_to_file() {
        let path = Path::new("/tmp/escape/stress_chat.db");
        temp_env::with_vars(
            [
                (USE_MYSQL_ENV, Some("1")),
                (DATABASE_URL_ENV, None::<&str>),
                (MYSQL_URL_ENV, None),
            ],
            || {
                let cfg = StoreConfig::from_env(path);
                assert_eq!(cfg, StoreConfig::Sqlite { path: path.to_path_buf() });
            },
        );
        temp_env::with_vars(
            [
                (USE_MYSQL_ENV, None),
                (DATABASE_URL_ENV, Some("postgres://localhost/escape")),
                (MYSQL_URL_ENV, None),
            ],
            || {
                let cfg = StoreConfig::from_env(path);
                assert_eq!(
                    cfg,
                    StoreConfig::Server {
                        url: "postgres://localhost/escape".to_string()
                    }
                );
            },
        );
    }

    #[test]
    fn test_store_config_mysql_url_fallback() {
        let path = Path::new("/tmp/escape/stress_chat.db");
        temp_env::with_vars(
            [
                (USE_MYSQL_ENV, Some("1")),
                (DATABASE_URL_ENV, None::<&str>),
                (MYSQL_URL_ENV, Some("mysql://u:p@db:3306/escape")),
            ],
            || {
                let cfg = StoreConfig::from_env(path);
                assert_eq!(
                    cfg,
                    StoreConfig::Server {
                        url: "mysql://u:p@db:3306/escape".to_string()
                    }
                );
            },
        );
        temp_env::with_vars(
            [
                (USE_MYSQL_ENV, Some("1")),
                (DATABASE_URL_ENV, Some("mysql://u:p@primary/escape")),
                (MYSQL_URL_ENV, Some("mysql://u:p@replica/escape")),
            ],
            || {
                let cfg = StoreConfig::from_env(path);
                assert_eq!(cfg.url(), "mysql://u:p@primary/escape");
            },
        );
        // MYSQL_URL alone does not switch stores.
        temp_env::with_vars(
            [
                (USE_MYSQL_ENV, None::<&str>),
                (DATABASE_URL_ENV, None),
                (MYSQL_URL_ENV, Some("mysql://u:p@db/escape")),
            ],
            || {
                let cfg = StoreConfig::from_env(path);
                assert_eq!(cfg, StoreConfig::Sqlite { path: path.to_path_buf() });
            },
        );
    }

    #[test]
    fn test_server_store_url_validation() {
        let bad = StoreConfig::Server {
            url: "postgres://[::1".to_string(),
        };
        assert!(matches!(Store::new(&bad), Err(AppError::Config(_))));

        let unknown = StoreConfig::Server {
            url: "oracle://localhost/escape".to_string(),
        };
        assert!(matches!(Store::new(&unknown), Err(AppError::Config(_))));

        let mysql = StoreConfig::Server {
            url: "mysql://u:p@localhost:3306/escape".to_string(),
        };
        assert_eq!(Store::new(&mysql).unwrap().dialect(), Dialect::Mysql);

        let postgres = StoreConfig::Server {
            url: "postgres://u:p@localhost/escape".to_string(),
        };
        assert_eq!(Store::new(&postgres).unwrap().dialect(), Dialect::Postgres);
    }

    #[test]
    fn test_timestamp_shape() {
        let ts = utc_timestamp();
        assert_eq!(ts.len(), "2025-01-01T00:00:00.000000".len());
        assert!(chrono::NaiveDateTime::parse_from_str(&ts, "%Y-%m-%dT%H:%M:%S%.6f").is_ok());
    }
}
