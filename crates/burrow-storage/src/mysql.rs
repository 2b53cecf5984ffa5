use async_trait::async_trait;
use burrow_core::repository::{ClickRepository, MappingRepository, ReadMappingRepository, Result};
use burrow_core::{
    ClickEvent, ClickId, Mapping, MappingId, NewMapping, OwnerId, ShortCode, StorageError,
    TimeRange,
};
use jiff::Timestamp;
use sqlx::mysql::MySqlRow;
use sqlx::{MySql, MySqlPool, Row};
use tracing::debug;

const URL_MAPPINGS_DDL: &str = include_str!("../ddl/mysql/url_mappings.sql");
const CLICK_EVENTS_DDL: &str = include_str!("../ddl/mysql/click_events.sql");

const MAPPING_COLUMNS: &str = "id, short_code, original_url, owner_id, created_at, click_count";

/// MySQL implementation of the mapping and click repositories.
///
/// Short-code uniqueness is the `uk_url_mappings_short_code` unique key, and
/// click events reference their mapping through a cascading foreign key.
/// Timestamps are stored as milliseconds since the Unix epoch.
#[derive(Debug, Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    /// Creates a store from an existing MySQL connection pool.
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Creates a store by opening a new MySQL connection pool.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = MySqlPool::connect(database_url)
            .await
            .map_err(map_sqlx_error)?;
        Ok(Self::new(pool))
    }

    /// Returns a reference to the underlying pool.
    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    /// Creates the `url_mappings` and `click_events` tables if they are missing.
    pub async fn ensure_schema(&self) -> Result<()> {
        for ddl in [URL_MAPPINGS_DDL, CLICK_EVENTS_DDL] {
            sqlx::query(ddl)
                .execute(&self.pool)
                .await
                .map_err(map_sqlx_error)?;
        }
        debug!("mysql schema is in place");
        Ok(())
    }

    async fn fetch_click_times(
        &self,
        sql: &str,
        key: QueryKey<'_>,
        range: TimeRange,
    ) -> Result<Vec<Timestamp>> {
        let query = sqlx::query(sql);
        let query = match key {
            QueryKey::Mapping(id) => query.bind(id.get()),
            QueryKey::Owner(owner) => query.bind(owner.as_str()),
        };

        let rows = query
            .bind(range.start().as_millisecond())
            .bind(range.end().as_millisecond())
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        rows.iter()
            .map(|row| {
                let millis: i64 = row.try_get("clicked_at").map_err(map_sqlx_error)?;
                parse_millis(millis)
            })
            .collect()
    }
}

enum QueryKey<'a> {
    Mapping(MappingId),
    Owner(&'a OwnerId),
}

fn parse_millis(millis: i64) -> Result<Timestamp> {
    Timestamp::from_millisecond(millis).map_err(|e| {
        StorageError::InvalidData(format!("invalid timestamp '{}': {e}", millis))
    })
}

fn mapping_from_row(row: &MySqlRow) -> Result<Mapping> {
    let id: u64 = row.try_get("id").map_err(map_sqlx_error)?;
    let code: String = row.try_get("short_code").map_err(map_sqlx_error)?;
    let original_url: String = row.try_get("original_url").map_err(map_sqlx_error)?;
    let owner: String = row.try_get("owner_id").map_err(map_sqlx_error)?;
    let created_at: i64 = row.try_get("created_at").map_err(map_sqlx_error)?;
    let click_count: u64 = row.try_get("click_count").map_err(map_sqlx_error)?;

    Ok(Mapping {
        id: MappingId::new(id),
        code: ShortCode::new_unchecked(code),
        original_url,
        owner: OwnerId::new(owner).map_err(|e| StorageError::InvalidData(e.to_string()))?,
        created_at: parse_millis(created_at)?,
        click_count,
    })
}

/// Single-statement atomic increment; returns the number of rows touched.
async fn bump_click_count<'e, E>(executor: E, id: MappingId) -> std::result::Result<u64, sqlx::Error>
where
    E: sqlx::Executor<'e, Database = MySql>,
{
    let result = sqlx::query(
        r#"
        UPDATE url_mappings
        SET click_count = click_count + 1
        WHERE id = ?
        "#,
    )
    .bind(id.get())
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(sqlx::error::DatabaseError::is_unique_violation)
}

fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(sqlx::error::DatabaseError::is_foreign_key_violation)
}

fn map_sqlx_error(err: sqlx::Error) -> StorageError {
    let message = err.to_string();

    match err {
        sqlx::Error::PoolTimedOut => StorageError::Timeout(message),
        sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => StorageError::Unavailable(message),
        sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::TypeNotFound { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::RowNotFound => StorageError::InvalidData(message),
        _ => StorageError::Query(message),
    }
}

#[async_trait]
impl ReadMappingRepository for MySqlStore {
    async fn find_by_code(&self, code: &ShortCode) -> Result<Option<Mapping>> {
        let row = sqlx::query(&format!(
            "SELECT {MAPPING_COLUMNS} FROM url_mappings WHERE short_code = ? LIMIT 1"
        ))
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.as_ref().map(mapping_from_row).transpose()
    }

    async fn find_by_id(&self, id: MappingId) -> Result<Option<Mapping>> {
        let row = sqlx::query(&format!(
            "SELECT {MAPPING_COLUMNS} FROM url_mappings WHERE id = ? LIMIT 1"
        ))
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.as_ref().map(mapping_from_row).transpose()
    }

    async fn list_by_owner(&self, owner: &OwnerId) -> Result<Vec<Mapping>> {
        let rows = sqlx::query(&format!(
            "SELECT {MAPPING_COLUMNS} FROM url_mappings WHERE owner_id = ?"
        ))
        .bind(owner.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.iter().map(mapping_from_row).collect()
    }
}

#[async_trait]
impl MappingRepository for MySqlStore {
    async fn insert(&self, mapping: NewMapping) -> Result<Mapping> {
        let result = sqlx::query(
            r#"
            INSERT INTO url_mappings (short_code, original_url, owner_id, created_at, click_count)
            VALUES (?, ?, ?, ?, 0)
            "#,
        )
        .bind(mapping.code.as_str())
        .bind(mapping.original_url.as_str())
        .bind(mapping.owner.as_str())
        .bind(mapping.created_at.as_millisecond())
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) => Ok(mapping.into_mapping(MappingId::new(done.last_insert_id()))),
            Err(err) if is_unique_violation(&err) => {
                Err(StorageError::Conflict(mapping.code.to_string()))
            }
            Err(err) => Err(map_sqlx_error(err)),
        }
    }

    async fn increment_click_count(&self, id: MappingId) -> Result<()> {
        let touched = bump_click_count(&self.pool, id)
            .await
            .map_err(map_sqlx_error)?;

        if touched == 0 {
            return Err(StorageError::NotFound(format!("mapping {id}")));
        }
        Ok(())
    }

    async fn delete(&self, id: MappingId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM url_mappings WHERE id = ?")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ClickRepository for MySqlStore {
    async fn insert_click(
        &self,
        mapping_id: MappingId,
        clicked_at: Timestamp,
    ) -> Result<ClickEvent> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        // Locks the mapping row first, so a concurrent delete cannot slip in
        // between the counter bump and the event insert.
        let touched = bump_click_count(&mut *tx, mapping_id)
            .await
            .map_err(map_sqlx_error)?;
        if touched == 0 {
            return Err(StorageError::UnknownMapping(mapping_id));
        }

        let inserted = sqlx::query("INSERT INTO click_events (mapping_id, clicked_at) VALUES (?, ?)")
            .bind(mapping_id.get())
            .bind(clicked_at.as_millisecond())
            .execute(&mut *tx)
            .await;

        let inserted = match inserted {
            Ok(done) => done,
            Err(err) if is_foreign_key_violation(&err) => {
                return Err(StorageError::UnknownMapping(mapping_id));
            }
            Err(err) => return Err(map_sqlx_error(err)),
        };

        tx.commit().await.map_err(map_sqlx_error)?;

        Ok(ClickEvent {
            id: ClickId::new(inserted.last_insert_id()),
            mapping_id,
            clicked_at,
        })
    }

    async fn click_times(&self, mapping_id: MappingId, range: TimeRange) -> Result<Vec<Timestamp>> {
        self.fetch_click_times(
            r#"
            SELECT clicked_at
            FROM click_events
            WHERE mapping_id = ?
              AND clicked_at >= ?
              AND clicked_at < ?
            "#,
            QueryKey::Mapping(mapping_id),
            range,
        )
        .await
    }

    async fn owner_click_times(
        &self,
        owner: &OwnerId,
        range: TimeRange,
    ) -> Result<Vec<Timestamp>> {
        self.fetch_click_times(
            r#"
            SELECT c.clicked_at AS clicked_at
            FROM click_events c
            JOIN url_mappings m ON m.id = c.mapping_id
            WHERE m.owner_id = ?
              AND c.clicked_at >= ?
              AND c.clicked_at < ?
            "#,
            QueryKey::Owner(owner),
            range,
        )
        .await
    }

    async fn count_clicks(&self, mapping_id: MappingId) -> Result<u64> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM click_events WHERE mapping_id = ?")
            .bind(mapping_id.get())
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        let total: i64 = row.try_get("total").map_err(map_sqlx_error)?;
        u64::try_from(total).map_err(|e| StorageError::InvalidData(e.to_string()))
    }
}
