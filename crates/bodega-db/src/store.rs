use std::sync::Arc;

use tokio::sync::watch;
use tokio::task;

use bodega_types::models::UserRecord;

use crate::Database;
use crate::error::{Result, StoreError};

/// Async facade over the account database.
///
/// Cheap to clone; all clones share one database and one active-user
/// channel. Queries run under `spawn_blocking` so sqlite work stays off the
/// async runtime.
#[derive(Clone)]
pub struct UserStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    db: Database,
    active_tx: watch::Sender<Option<UserRecord>>,
}

impl UserStore {
    pub fn new(db: Database) -> Result<Self> {
        let current = db.active_user_record()?;
        let (active_tx, _) = watch::channel(current);
        Ok(Self {
            inner: Arc::new(StoreInner { db, active_tx }),
        })
    }

    pub fn in_memory() -> Result<Self> {
        Self::new(Database::open_in_memory()?)
    }

    /// Direct database access for maintenance paths and tests.
    pub fn database(&self) -> &Database {
        &self.inner.db
    }

    /// Insert when `local_id` is unassigned, update in place otherwise.
    /// Returns the stored record with its assigned id.
    pub async fn upsert(&self, record: UserRecord) -> Result<UserRecord> {
        let inner = self.inner.clone();
        let (stored, active) = task::spawn_blocking(move || {
            let stored = inner.db.upsert_user(&record)?;
            let active = inner.db.active_user_record()?;
            Ok::<_, StoreError>((stored, active))
        })
        .await??;

        self.publish_active(active);
        Ok(stored)
    }

    /// Case-sensitive exact match on the stored email.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        let inner = self.inner.clone();
        let email = email.to_string();
        task::spawn_blocking(move || inner.db.user_by_email(&email)).await?
    }

    pub async fn find_by_id(&self, local_id: i64) -> Result<Option<UserRecord>> {
        let inner = self.inner.clone();
        task::spawn_blocking(move || inner.db.user_by_id(local_id)).await?
    }

    pub async fn delete_by_id(&self, local_id: i64) -> Result<()> {
        let inner = self.inner.clone();
        let active = task::spawn_blocking(move || {
            inner.db.delete_user(local_id)?;
            inner.db.active_user_record()
        })
        .await??;

        self.publish_active(active);
        Ok(())
    }

    /// Every account known to this device, oldest first.
    pub async fn list(&self) -> Result<Vec<UserRecord>> {
        let inner = self.inner.clone();
        task::spawn_blocking(move || inner.db.all_users()).await?
    }

    /// Reactive view of the current session. The receiver always holds the
    /// latest active record, or `None` when no session is open, and is
    /// notified on every write that changes it.
    pub fn active_user(&self) -> watch::Receiver<Option<UserRecord>> {
        self.inner.active_tx.subscribe()
    }

    fn publish_active(&self, active: Option<UserRecord>) {
        self.inner.active_tx.send_if_modified(|current| {
            if *current == active {
                false
            } else {
                *current = active;
                true
            }
        });
    }
}
