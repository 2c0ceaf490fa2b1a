use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;

use crate::domain::batch_query::BatchQuery;
use crate::domain::subscriber_entry::{from_epoch_seconds, to_epoch_seconds, SubscriberEntry};

// SQLITE_CONSTRAINT_UNIQUE extended result code.
const UNIQUE_VIOLATION_CODE: &str = "2067";

/// The roster table. Both facades share one instance; the pool inside is reference counted so
/// cloning hands out another handle to the same connections.
#[derive(Clone, Debug)]
pub struct SubscriberStore {
    db_pool: SqlitePool,
}

#[derive(thiserror::Error)]
pub enum StoreError {
    #[error("{0} is already subscribed.")]
    DuplicateKey(String),
    #[error("{0}")]
    InvalidArgument(String),
    #[error("Failed to execute the query against the subscriber table.")]
    Failure(#[from] sqlx::Error),
}

impl std::fmt::Debug for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Failure(err) => write!(f, "{}\nCaused by:\n\t{:?}", self, err),
            _ => write!(f, "{}", self),
        }
    }
}

impl SubscriberStore {
    pub fn new(db_pool: SqlitePool) -> Self {
        Self { db_pool }
    }

    /// Opens the pool lazily; the first query (normally `initialize`) creates the file.
    pub fn connect_lazy(db_options: SqliteConnectOptions, max_connections: u32) -> Self {
        let db_pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .acquire_timeout(std::time::Duration::from_secs(2))
            .connect_lazy_with(db_options);

        Self::new(db_pool)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.db_pool
    }

    /// Creates the `emails` table. Running it against an initialized database is a success.
    #[tracing::instrument(name = "Creating the subscriber table", skip(self))]
    pub async fn initialize(&self) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            CREATE TABLE emails (
                id           INTEGER PRIMARY KEY,
                email        TEXT UNIQUE,
                confirmed_at INTEGER,
                opt_out      INTEGER
            );
            "#,
        )
        .execute(&self.db_pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(err) if is_table_already_created(&err) => {
                tracing::info!("Subscriber table already exists");
                Ok(())
            }
            Err(err) => {
                tracing::error!("Failed to create the subscriber table: {:?}", err);
                Err(StoreError::Failure(err))
            }
        }
    }

    #[tracing::instrument(name = "Insert a new subscriber into the database", skip(self))]
    pub async fn create(&self, email: &str) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO emails (email, confirmed_at, opt_out)
            VALUES (?, 0, ?)
            "#,
        )
        .bind(email)
        .bind(false)
        .execute(&self.db_pool)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                return StoreError::DuplicateKey(email.to_string());
            }
            tracing::error!("Failed to execute query: {:?}", err);
            StoreError::Failure(err)
        })?;

        Ok(())
    }

    /// `Ok(None)` means no row holds `email`, which is not a failure.
    #[tracing::instrument(name = "Fetch a subscriber by email", skip(self))]
    pub async fn get(&self, email: &str) -> Result<Option<SubscriberEntry>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, email, confirmed_at, opt_out
            FROM emails
            WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db_pool)
        .await
        .map_err(|err| {
            tracing::error!("Failed to execute query: {:?}", err);
            err
        })?;

        row.as_ref().map(entry_from_row).transpose().map_err(|err| {
            tracing::error!("Failed to decode subscriber row: {:?}", err);
            StoreError::Failure(err)
        })
    }

    /// Insert-or-overwrite keyed by email: an existing row takes both `confirmed_at` and
    /// `opt_out` from `entry`, its id is kept.
    #[tracing::instrument(
        name = "Upsert a subscriber",
        skip(self, entry),
        fields(subscriber_email = %entry.email, opt_out = entry.opt_out)
    )]
    pub async fn update(&self, entry: &SubscriberEntry) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO emails (email, confirmed_at, opt_out)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(email) DO UPDATE SET
                confirmed_at = ?2,
                opt_out = ?3
            "#,
        )
        .bind(entry.email.as_str())
        .bind(to_epoch_seconds(&entry.confirmed_at))
        .bind(entry.opt_out)
        .execute(&self.db_pool)
        .await
        .map_err(|err| {
            tracing::error!("Failed to execute query: {:?}", err);
            err
        })?;

        Ok(())
    }

    /// Soft delete. The row stays so the address cannot be created again; an unknown address
    /// is left alone without an error.
    #[tracing::instrument(name = "Opt out a subscriber", skip(self))]
    pub async fn opt_out(&self, email: &str) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE emails
            SET opt_out = ?
            WHERE email = ?
            "#,
        )
        .bind(true)
        .bind(email)
        .execute(&self.db_pool)
        .await
        .map_err(|err| {
            tracing::error!("Failed to execute query: {:?}", err);
            err
        })?;

        if result.rows_affected() == 0 {
            tracing::info!("No subscriber to opt out");
        }

        Ok(())
    }

    /// Subscribed rows `[(page - 1) * count, page * count)` in id order. A row that fails to
    /// decode fails the whole page.
    #[tracing::instrument(name = "Fetch a page of subscribers", skip(self))]
    pub async fn list_page(
        &self,
        page: i64,
        count: i64,
    ) -> Result<Vec<SubscriberEntry>, StoreError> {
        let query = BatchQuery::parse(page, count).map_err(StoreError::InvalidArgument)?;

        let rows = sqlx::query(
            r#"
            SELECT id, email, confirmed_at, opt_out
            FROM emails
            WHERE opt_out = ?
            ORDER BY id ASC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(false)
        .bind(query.count())
        .bind(query.offset())
        .fetch_all(&self.db_pool)
        .await
        .map_err(|err| {
            tracing::error!("Failed to execute query: {:?}", err);
            err
        })?;

        entries_from_rows(&rows)
    }

    /// Every row, opted out or not, in id order. Meant for operators, not for list traffic.
    #[tracing::instrument(name = "Fetch every subscriber row", skip(self))]
    pub async fn list_all(&self) -> Result<Vec<SubscriberEntry>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, email, confirmed_at, opt_out
            FROM emails
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.db_pool)
        .await
        .map_err(|err| {
            tracing::error!("Failed to execute query: {:?}", err);
            err
        })?;

        entries_from_rows(&rows)
    }
}

fn entries_from_rows(rows: &[SqliteRow]) -> Result<Vec<SubscriberEntry>, StoreError> {
    rows.iter()
        .map(entry_from_row)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| {
            tracing::error!("Failed to decode subscriber row: {:?}", err);
            StoreError::Failure(err)
        })
}

fn entry_from_row(row: &SqliteRow) -> Result<SubscriberEntry, sqlx::Error> {
    let confirmed_at: i64 = row.try_get("confirmed_at")?;
    let confirmed_at = from_epoch_seconds(confirmed_at).map_err(|err| sqlx::Error::ColumnDecode {
        index: String::from("confirmed_at"),
        source: err.into(),
    })?;

    Ok(SubscriberEntry {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        confirmed_at,
        opt_out: row.try_get("opt_out")?,
    })
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            db_err.code().as_deref() == Some(UNIQUE_VIOLATION_CODE)
                || db_err.message().contains("UNIQUE constraint failed")
        }
        _ => false,
    }
}

fn is_table_already_created(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.message().contains("already exists"),
        _ => false,
    }
}
