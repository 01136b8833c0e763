pub mod corpus;
pub mod corpus_models;
pub mod corpus_schema;

use std::fs;
use std::path::Path;
use std::thread::sleep;
use std::time::Duration;

use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool, PooledConnection};

use anyhow::{Context, Error as AnyhowError, Result};
use parking_lot::Mutex;

use crate::db::corpus::CorpusDbHandle;

pub type SqlitePool = Pool<ConnectionManager<SqliteConnection>>;
pub type DbConn = PooledConnection<ConnectionManager<SqliteConnection>>;

// Bounded retry for writes hitting transient SQLite lock contention.
// Fetch and validation failures are never retried.
static WRITE_RETRY_ATTEMPTS: usize = 3;
static WRITE_RETRY_BACKOFF: Duration = Duration::from_millis(250);

#[derive(Debug)]
pub struct DatabaseHandle {
    pool: SqlitePool,
    pub write_lock: Mutex<()>,
}

impl DatabaseHandle {
    pub fn new(database_url: &str) -> Result<Self> {
        let manager = ConnectionManager::new(database_url);
        let pool = Pool::builder()
            .max_size(5)
            .build(manager)
            .with_context(|| format!("Failed to create pool for: {}", database_url))?;

        Ok(Self {
            pool,
            write_lock: Mutex::new(()),
        })
    }

    pub fn get_conn(&self) -> Result<DbConn> {
        self.pool.get().map_err(AnyhowError::from)
    }

    /// Performs a write operation on the database, guarded by a Mutex
    /// write_lock. Transient "database is locked" errors from writers in
    /// other processes are retried a bounded number of times.
    pub fn do_write<F, T>(&self, operation: F) -> Result<T>
    where
        F: Fn(&mut SqliteConnection) -> Result<T, diesel::result::Error>,
    {
        let _lock = self.write_lock.lock();
        let mut db_conn = self.pool.get()
            .context("Failed to get connection from pool for write")?;

        let mut attempt = 0;
        loop {
            attempt += 1;
            match operation(&mut db_conn) {
                Ok(val) => return Ok(val),
                Err(e) => {
                    let locked = e.to_string().contains("database is locked");
                    if locked && attempt < WRITE_RETRY_ATTEMPTS {
                        sleep(WRITE_RETRY_BACKOFF);
                        continue;
                    }
                    return Err(AnyhowError::from(e));
                }
            }
        }
    }

    /// Performs a read operation on the database.
    pub fn do_read<F, T>(&self, operation: F) -> Result<T>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<T, diesel::result::Error>,
    {
        let mut db_conn = self.pool.get()
            .context("Failed to get connection from pool for read")?;
        operation(&mut db_conn).map_err(AnyhowError::from)
    }
}

/// Open (creating if needed) the corpus database at the given path and make
/// sure its tables exist.
pub fn open_corpus_db(db_path: &Path) -> Result<CorpusDbHandle> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create db dir: {:?}", parent))?;
        }
    }

    let abs_path = fs::canonicalize(db_path).unwrap_or(db_path.to_path_buf());
    let database_url = format!(
        "sqlite://{}",
        abs_path
            .to_str()
            .with_context(|| format!("Non-UTF8 db path: {:?}", abs_path))?
    );

    let handle = DatabaseHandle::new(&database_url)?;
    handle.create_tables()?;
    Ok(handle)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use diesel::result::DatabaseErrorKind;

    use super::*;

    fn locked_error() -> diesel::result::Error {
        diesel::result::Error::DatabaseError(
            DatabaseErrorKind::Unknown,
            Box::new("database is locked".to_string()),
        )
    }

    #[test]
    fn test_do_write_retries_transient_lock_errors() {
        let handle = DatabaseHandle::new(":memory:").expect("Can't open in-memory db");
        let attempts = AtomicUsize::new(0);

        let res: Result<usize> = handle.do_write(|_conn| {
            let n = attempts.fetch_add(1, Ordering::SeqCst);
            if n < 2 {
                Err(locked_error())
            } else {
                Ok(n)
            }
        });

        assert_eq!(res.expect("retried write should succeed"), 2);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_do_write_gives_up_after_bounded_attempts() {
        let handle = DatabaseHandle::new(":memory:").expect("Can't open in-memory db");
        let attempts = AtomicUsize::new(0);

        let res: Result<()> = handle.do_write(|_conn| {
            attempts.fetch_add(1, Ordering::SeqCst);
            Err(locked_error())
        });

        assert!(res.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), WRITE_RETRY_ATTEMPTS);
    }

    #[test]
    fn test_do_write_does_not_retry_other_errors() {
        let handle = DatabaseHandle::new(":memory:").expect("Can't open in-memory db");
        let attempts = AtomicUsize::new(0);

        let res: Result<()> = handle.do_write(|_conn| {
            attempts.fetch_add(1, Ordering::SeqCst);
            Err(diesel::result::Error::NotFound)
        });

        assert!(res.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }
}
