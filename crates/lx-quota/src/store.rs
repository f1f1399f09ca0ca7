use crate::clock::Clock;
use crate::migrations;
use rusqlite::{Connection, OptionalExtension, TransactionBehavior};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// String-keyed store with per-entry expiry.
///
/// Expired entries are never returned, even before `purge_expired` removes
/// them. `update` runs its callback and the following write as one atomic
/// step with respect to every other call on the same store.
pub trait KvStore: Send + Sync {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>>;

    /// Overwrite `key`. `ttl = None` keeps the entry until deleted.
    fn put(&self, key: &str, value: &str, ttl: Option<Duration>) -> anyhow::Result<()>;

    /// Read-modify-write. `apply` sees the live value (or `None`); returning
    /// `Some(new)` stores it with `ttl`, returning `None` leaves the entry
    /// untouched. Returns whatever was written.
    fn update(
        &self,
        key: &str,
        ttl: Option<Duration>,
        apply: &mut dyn FnMut(Option<&str>) -> anyhow::Result<Option<String>>,
    ) -> anyhow::Result<Option<String>>;

    /// Physically remove expired entries, returning how many were dropped.
    fn purge_expired(&self) -> anyhow::Result<usize>;
}

pub struct SqliteKvStore {
    conn: Mutex<Connection>,
    clock: Arc<dyn Clock>,
}

impl SqliteKvStore {
    pub fn open(path: &Path, clock: Arc<dyn Clock>) -> anyhow::Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA busy_timeout=5000;")?;
        migrations::run_migrations(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            clock,
        })
    }

    pub fn in_memory(clock: Arc<dyn Clock>) -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory()?;
        migrations::run_migrations(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            clock,
        })
    }

    fn lock(&self) -> anyhow::Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow::anyhow!("kv store connection mutex poisoned"))
    }

    fn now_secs(&self) -> i64 {
        self.clock.now().timestamp()
    }

    fn expires_at(&self, ttl: Option<Duration>) -> Option<i64> {
        ttl.map(|ttl| self.now_secs() + ttl.as_secs() as i64)
    }
}

fn read_live(conn: &Connection, key: &str, now: i64) -> rusqlite::Result<Option<String>> {
    conn.query_row(
        "SELECT value FROM kv_entries WHERE key = ?1 AND (expires_at IS NULL OR expires_at > ?2)",
        rusqlite::params![key, now],
        |row| row.get(0),
    )
    .optional()
}

fn write(
    conn: &Connection,
    key: &str,
    value: &str,
    expires_at: Option<i64>,
) -> rusqlite::Result<usize> {
    conn.execute(
        "INSERT INTO kv_entries (key, value, expires_at, updated_at)
         VALUES (?1, ?2, ?3, datetime('now'))
         ON CONFLICT(key) DO UPDATE SET
            value = excluded.value,
            expires_at = excluded.expires_at,
            updated_at = excluded.updated_at",
        rusqlite::params![key, value, expires_at],
    )
}

impl KvStore for SqliteKvStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let conn = self.lock()?;
        Ok(read_live(&conn, key, self.now_secs())?)
    }

    fn put(&self, key: &str, value: &str, ttl: Option<Duration>) -> anyhow::Result<()> {
        let conn = self.lock()?;
        write(&conn, key, value, self.expires_at(ttl))?;
        Ok(())
    }

    fn update(
        &self,
        key: &str,
        ttl: Option<Duration>,
        apply: &mut dyn FnMut(Option<&str>) -> anyhow::Result<Option<String>>,
    ) -> anyhow::Result<Option<String>> {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let current = read_live(&tx, key, self.now_secs())?;
        let next = apply(current.as_deref())?;
        if let Some(value) = &next {
            write(&tx, key, value, self.expires_at(ttl))?;
        }
        tx.commit()?;
        Ok(next)
    }

    fn purge_expired(&self) -> anyhow::Result<usize> {
        let conn = self.lock()?;
        let removed = conn.execute(
            "DELETE FROM kv_entries WHERE expires_at IS NOT NULL AND expires_at <= ?1",
            [self.now_secs()],
        )?;
        if removed > 0 {
            tracing::info!("Purged {} expired entries", removed);
        }
        Ok(removed)
    }
}
