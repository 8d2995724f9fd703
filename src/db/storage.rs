use crate::config::MysqlConfig;
use crate::db::models::DirectoryEntry;
use crate::db::schema::{CREATE_USERS, DROP_USERS, SEED_ENTRIES};
use crate::error::DirectoryError;
use backon::{ExponentialBuilder, Retryable};
use sqlx::any::AnyPoolOptions;
use sqlx::{Any, Pool};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

pub type DbPool = Pool<Any>;

/// Escape character for `LIKE` patterns. `\` is avoided because MySQL
/// treats it as a string-literal escape.
const LIKE_ESCAPE: char = '!';

fn connect_retry_policy() -> ExponentialBuilder {
    ExponentialBuilder::default()
        .with_min_delay(Duration::from_secs(1))
        .with_max_delay(Duration::from_secs(5))
        .with_max_times(3)
}

fn is_transient(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut)
}

/// Open a pool for either backend. Transient connect failures are retried.
pub async fn connect(database_url: &str) -> Result<DbPool, DirectoryError> {
    sqlx::any::install_default_drivers();

    let pool = (|| async { AnyPoolOptions::new().connect(database_url).await })
        .retry(connect_retry_policy())
        .when(is_transient)
        .notify(|err: &sqlx::Error, dur: Duration| {
            warn!("database connect failed: {}, retrying in {:?}", err, dur);
        })
        .await?;
    Ok(pool)
}

/// Build the MySQL connection URL from a resolved host.
/// Credentials are percent-encoded by `url`.
pub fn mysql_url(host: &str, cfg: &MysqlConfig) -> Result<String, DirectoryError> {
    let mut url = Url::parse(&format!("mysql://{}:{}", host, cfg.port))?;
    url.set_username(&cfg.user).map_err(|_| {
        DirectoryError::InvalidDatabaseUrl(format!("cannot set user on {host}"))
    })?;
    url.set_password(Some(&cfg.password)).map_err(|_| {
        DirectoryError::InvalidDatabaseUrl(format!("cannot set password on {host}"))
    })?;
    url.set_path(&format!("/{}", cfg.name));
    Ok(url.into())
}

/// Escape `LIKE` metacharacters so the value only ever matches literally.
fn escape_like(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if c == LIKE_ESCAPE || c == '%' || c == '_' {
            out.push(LIKE_ESCAPE);
        }
        out.push(c);
    }
    out
}

#[derive(Clone)]
pub struct DirectoryStorage {
    pool: DbPool,
}

impl DirectoryStorage {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Drop and recreate `users`, then load the seed rows.
    /// Not wrapped in a transaction; the first failure is returned as-is.
    pub async fn initialize(&self) -> Result<(), DirectoryError> {
        sqlx::query(DROP_USERS).execute(&self.pool).await?;
        sqlx::query(CREATE_USERS).execute(&self.pool).await?;
        for (username, email) in SEED_ENTRIES {
            self.insert(username, email).await?;
        }
        info!(rows = SEED_ENTRIES.len(), "users table reset and seeded");
        Ok(())
    }

    /// Entries whose username contains `keyword`, ordered by username.
    pub async fn search(&self, keyword: &str) -> Result<Vec<DirectoryEntry>, DirectoryError> {
        let pattern = format!("%{}%", escape_like(keyword));
        let rows = sqlx::query_as::<_, DirectoryEntry>(
            r#"SELECT username, email FROM users
               WHERE username LIKE ? ESCAPE '!'
               ORDER BY username"#,
        )
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;
        debug!(keyword, matches = rows.len(), "search executed");
        Ok(rows)
    }

    /// Existing entry matching `username` under the backend's `LIKE` rules,
    /// with no wildcards.
    pub async fn find_matching(
        &self,
        username: &str,
    ) -> Result<Option<DirectoryEntry>, DirectoryError> {
        let row = sqlx::query_as::<_, DirectoryEntry>(
            "SELECT username, email FROM users WHERE username LIKE ? ESCAPE '!'",
        )
        .bind(escape_like(username))
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn insert(&self, username: &str, email: &str) -> Result<(), DirectoryError> {
        sqlx::query("INSERT INTO users (username, email) VALUES (?, ?)")
            .bind(username)
            .bind(email)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
impl DirectoryStorage {
    pub(crate) async fn get_by_username(
        &self,
        username: &str,
    ) -> Result<Option<DirectoryEntry>, DirectoryError> {
        let row = sqlx::query_as::<_, DirectoryEntry>(
            "SELECT username, email FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub(crate) async fn list_all(&self) -> Result<Vec<DirectoryEntry>, DirectoryError> {
        let rows = sqlx::query_as::<_, DirectoryEntry>(
            "SELECT username, email FROM users ORDER BY username",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub(crate) async fn count(&self) -> Result<i64, DirectoryError> {
        let rec: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(rec.0)
    }
}
