//! Single read/write surface over the three storage scopes. The
//! repository owns the one-entry-per-project-per-day rule, id
//! assignment, and the translation between the cloud row shape and the
//! canonical [`LogEntry`].

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::warn;

use crate::errors::RepoError;
use crate::models::{LogDraft, LogEntry, MigrationReport};
use crate::remote::{AuthSession, LogRow, RemoteStore, UserId};
use crate::storage::{DurableStore, SessionStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Durable,
    Session,
    Remote,
}

pub struct LogRepository {
    durable: DurableStore,
    session: SessionStore,
    remote: Option<Arc<dyn RemoteStore>>,
    auth: AuthSession,
}

impl LogRepository {
    pub fn new(
        durable: DurableStore,
        session: SessionStore,
        remote: Option<Arc<dyn RemoteStore>>,
        auth: AuthSession,
    ) -> Self {
        Self {
            durable,
            session,
            remote,
            auth,
        }
    }

    pub fn current_user(&self) -> Option<UserId> {
        self.auth.current_user()
    }

    /// Scope new writes land in: the cloud once a user is signed in,
    /// otherwise the tab-lifetime session collection.
    pub fn active_scope(&self) -> Scope {
        if self.remote.is_some() && self.auth.current_user().is_some() {
            Scope::Remote
        } else {
            Scope::Session
        }
    }

    fn remote_handle(&self) -> Result<(&dyn RemoteStore, UserId), RepoError> {
        let store = self.remote.as_deref().ok_or(RepoError::NotSignedIn)?;
        let user = self.auth.current_user().ok_or(RepoError::NotSignedIn)?;
        Ok((store, user))
    }

    pub async fn list(&self, scope: Scope) -> Result<Vec<LogEntry>, RepoError> {
        match scope {
            Scope::Durable => Ok(self.durable.load().await),
            Scope::Session => Ok(self.session.load().await),
            Scope::Remote => {
                let (store, user) = self.remote_handle()?;
                let rows = store.select_all(&user).await.map_err(|err| {
                    warn!("cloud list failed: {err}");
                    RepoError::Remote
                })?;
                rows.into_iter()
                    .map(|row| row.decode().map_err(RepoError::Decode))
                    .collect()
            }
        }
    }

    /// Everything the current actor can see, newest first: the cloud for
    /// signed-in users, the durable and session collections merged for
    /// anonymous ones.
    pub async fn list_visible(&self) -> Result<Vec<LogEntry>, RepoError> {
        let mut entries = if self.active_scope() == Scope::Remote {
            self.list(Scope::Remote).await?
        } else {
            let mut merged = self.list(Scope::Durable).await?;
            merged.extend(self.list(Scope::Session).await?);
            merged
        };
        // Ids are numeric timestamps serialized as strings; ordering by
        // length first keeps "1000" above "999".
        entries.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| (b.id.len(), b.id.as_str()).cmp(&(a.id.len(), a.id.as_str())))
        });
        Ok(entries)
    }

    pub async fn get_by_id(&self, id: &str) -> Result<LogEntry, RepoError> {
        self.list_visible()
            .await?
            .into_iter()
            .find(|entry| entry.id == id)
            .ok_or(RepoError::NotFound)
    }

    pub async fn create(&self, draft: LogDraft) -> Result<LogEntry, RepoError> {
        draft.validate()?;

        let scope = self.active_scope();
        let existing = self.list(scope).await?;
        let now = Utc::now();

        if collides(&existing, &draft.project, now.date_naive(), None) {
            return Err(RepoError::Duplicate);
        }

        let entry = LogEntry {
            id: assign_id(&existing, now),
            created_at: now,
            project: draft.project,
            work_time: draft.work_time,
            gains: draft.gains,
            challenges: draft.challenges,
            plan: draft.plan,
        };

        match scope {
            Scope::Remote => {
                let (store, user) = self.remote_handle()?;
                let row = LogRow::from_entry(&entry, &user);
                store.insert(&row).await.map_err(|err| {
                    warn!("cloud insert failed: {err}");
                    RepoError::Remote
                })?;
            }
            _ => {
                let mut entries = existing;
                entries.push(entry.clone());
                self.save_local(scope, &entries).await?;
            }
        }

        Ok(entry)
    }

    pub async fn update(&self, updated: LogEntry) -> Result<(), RepoError> {
        if self.active_scope() == Scope::Remote {
            let existing = self.list(Scope::Remote).await?;
            if !existing.iter().any(|entry| entry.id == updated.id) {
                return Err(RepoError::NotFound);
            }
            if collides(&existing, &updated.project, updated.day(), Some(&updated.id)) {
                return Err(RepoError::Duplicate);
            }
            let (store, user) = self.remote_handle()?;
            let row = LogRow::from_entry(&updated, &user);
            return store.update(&row).await.map_err(|err| {
                warn!("cloud update failed: {err}");
                RepoError::Remote
            });
        }

        // The invariant is scoped per collection, so resolve the entry's
        // home scope first and check conflicts only there.
        let scope = self
            .find_local_scope(&updated.id)
            .await
            .ok_or(RepoError::NotFound)?;
        let mut entries = self.list(scope).await?;
        if collides(&entries, &updated.project, updated.day(), Some(&updated.id)) {
            return Err(RepoError::Duplicate);
        }
        let slot = entries
            .iter_mut()
            .find(|entry| entry.id == updated.id)
            .ok_or(RepoError::NotFound)?;
        *slot = updated;
        self.save_local(scope, &entries).await
    }

    /// Idempotent: deleting an id that is already gone is not an error.
    pub async fn delete(&self, id: &str) -> Result<(), RepoError> {
        if self.active_scope() == Scope::Remote {
            let (store, user) = self.remote_handle()?;
            return store.delete(id, &user).await.map_err(|err| {
                warn!("cloud delete failed: {err}");
                RepoError::Remote
            });
        }

        for scope in [Scope::Session, Scope::Durable] {
            let mut entries = self.list(scope).await?;
            let before = entries.len();
            entries.retain(|entry| entry.id != id);
            if entries.len() != before {
                self.save_local(scope, &entries).await?;
            }
        }
        Ok(())
    }

    /// Uploads each session entry in turn, tolerating independent
    /// failures, then clears the session collection. Returns the tallies
    /// for the caller to report.
    pub async fn migrate_session_to_remote(&self) -> Result<MigrationReport, RepoError> {
        let (store, user) = self.remote_handle()?;
        let entries = self.session.load().await;

        let mut migrated = 0;
        let mut failed = 0;
        for entry in &entries {
            let row = LogRow::from_entry(entry, &user);
            match store.insert(&row).await {
                Ok(()) => migrated += 1,
                Err(err) => {
                    warn!("migration of entry {} failed: {err}", entry.id);
                    failed += 1;
                }
            }
        }

        self.session.clear().await;
        Ok(MigrationReport { migrated, failed })
    }

    /// Session dump for download, or `None` when there is nothing to
    /// export. The filename carries the current date.
    pub async fn export_session(&self) -> Result<Option<(String, String)>, RepoError> {
        if self.session.load().await.is_empty() {
            return Ok(None);
        }
        let body = self.session.export_json().await?;
        let filename = format!("logs-{}.json", Utc::now().date_naive());
        Ok(Some((filename, body)))
    }

    pub async fn session_count(&self) -> usize {
        self.session.load().await.len()
    }

    async fn find_local_scope(&self, id: &str) -> Option<Scope> {
        for scope in [Scope::Session, Scope::Durable] {
            let entries = self.list(scope).await.ok()?;
            if entries.iter().any(|entry| entry.id == id) {
                return Some(scope);
            }
        }
        None
    }

    async fn save_local(&self, scope: Scope, entries: &[LogEntry]) -> Result<(), RepoError> {
        match scope {
            Scope::Durable => Ok(self.durable.save(entries).await?),
            Scope::Session => Ok(self.session.save(entries).await?),
            Scope::Remote => unreachable!("remote writes go through the store client"),
        }
    }
}

fn collides(entries: &[LogEntry], project: &str, day: NaiveDate, exclude_id: Option<&str>) -> bool {
    let project = project.trim();
    entries.iter().any(|entry| {
        exclude_id != Some(entry.id.as_str())
            && entry.project.trim() == project
            && entry.day() == day
    })
}

/// Millisecond timestamp, bumped past any id already taken in the target
/// collection. Ids are never reused.
fn assign_id(entries: &[LogEntry], now: DateTime<Utc>) -> String {
    let mut candidate = now.timestamp_millis();
    while entries.iter().any(|entry| entry.id == candidate.to_string()) {
        candidate += 1;
    }
    candidate.to_string()
}
