use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use common::Entry;
use sqlx::{postgres::PgPoolOptions, Connection, PgPool};

use crate::{error::StoreError, EntryStore};

const SCHEMA_SQL: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS journal (
        id      BIGSERIAL PRIMARY KEY,
        time    TIMESTAMPTZ NOT NULL,
        login   TEXT NOT NULL,
        content TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS journal_time_idx ON journal (time)",
];

const ADD_SQL: &str = r#"
    INSERT INTO journal (time, login, content)
    VALUES ($1, $2, $3)
"#;

const QUERY_SQL: &str = r#"
    SELECT time, login, content
    FROM journal
    WHERE time >= $1 AND time <= $2
    ORDER BY time, id
"#;

const LAST_SQL: &str = r#"
    SELECT time, login, content
    FROM journal
    ORDER BY id DESC
    LIMIT 1
"#;

#[derive(sqlx::FromRow)]
struct EntryRow {
    time: DateTime<Utc>,
    login: String,
    content: String,
}

impl From<EntryRow> for Entry {
    fn from(row: EntryRow) -> Self {
        Entry {
            time: row.time,
            user: row.login,
            content: row.content,
        }
    }
}

/// Runs a storage call under `timeout`, reporting an elapsed deadline as
/// [`StoreError::Canceled`]. The inner future is dropped on expiry.
pub async fn bounded<T, F>(timeout: Duration, fut: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    tokio::time::timeout(timeout, fut)
        .await
        .map_err(|_| StoreError::Canceled(timeout))?
}

#[derive(Clone, Debug)]
pub struct PgStore {
    pool: PgPool,
    timeout: Duration,
}

impl PgStore {
    /// Opens the pool and creates the table if needed. On a schema failure
    /// the pool is closed before the error is returned.
    pub async fn connect(database_url: &str, timeout: Duration) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .acquire_timeout(timeout)
            .connect(database_url)
            .await
            .map_err(StoreError::Init)?;

        for &stmt in SCHEMA_SQL {
            if let Err(err) = sqlx::query(stmt).execute(&pool).await {
                pool.close().await;
                return Err(StoreError::Init(err));
            }
        }

        Ok(Self { pool, timeout })
    }
}

#[axum::async_trait]
impl EntryStore for PgStore {
    async fn add(&self, entry: &Entry) -> Result<(), StoreError> {
        bounded(self.timeout, async {
            sqlx::query(ADD_SQL)
                .bind(entry.time)
                .bind(&entry.user)
                .bind(&entry.content)
                .execute(&self.pool)
                .await
                .map_err(StoreError::Write)?;
            Ok(())
        })
        .await?;

        tracing::debug!(user = %entry.user, time = %entry.time, "entry stored");
        Ok(())
    }

    async fn query(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Entry>, StoreError> {
        let rows =
            bounded(self.timeout, async {
                sqlx::query_as::<_, EntryRow>(QUERY_SQL)
                    .bind(start)
                    .bind(end)
                    .fetch_all(&self.pool)
                    .await
                    .map_err(StoreError::Read)
            })
            .await?;

        Ok(rows.into_iter().map(Entry::from).collect())
    }

    async fn last(&self) -> Result<Entry, StoreError> {
        let row =
            bounded(self.timeout, async {
                sqlx::query_as::<_, EntryRow>(LAST_SQL)
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(StoreError::Read)
            })
            .await?;

        row.map(Entry::from).ok_or(StoreError::NotFound)
    }

    async fn health(&self) -> Result<(), StoreError> {
        let ping = async {
            let mut conn = self.pool.acquire().await?;
            conn.ping().await
        };

        match tokio::time::timeout(self.timeout, ping).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => Err(StoreError::Unavailable(err.to_string())),
            Err(_) => Err(StoreError::Unavailable(format!(
                "ping timed out after {:?}",
                self.timeout
            ))),
        }
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn bounded_cancels_calls_past_the_deadline() {
        let timeout = Duration::from_millis(20);

        let slow = bounded(timeout, async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;
        assert!(matches!(slow, Err(StoreError::Canceled(d)) if d == timeout));

        let fast = bounded(timeout, async { Ok(7) }).await;
        assert_eq!(fast.unwrap(), 7);

        let failed: Result<(), _> = bounded(timeout, async { Err(StoreError::NotFound) }).await;
        assert!(matches!(failed, Err(StoreError::NotFound)));
    }
}
