use std::sync::Arc;

use chrono::Duration;
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::error::{Result, SessionError};
use crate::types::Session;

/// In-process map of live sessions, keyed by `conversation_id`.
///
/// Each session is wrapped in its own `tokio::sync::Mutex`, guarded for the
/// duration of exactly one turn — turns against the same session serialize,
/// turns against different sessions never block each other.
/// The `DashMap`'s own internal shard lock is only ever held long enough to
/// clone the `Arc` out — never across an `.await` — so lookups for
/// *different* sessions never contend with each other or with an
/// in-flight turn.
pub struct SessionStore {
    sessions: DashMap<String, Arc<Mutex<Session>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl: Duration::seconds(ttl_secs as i64),
        }
    }

    /// Create a new session, parsing `form_context_md` once to populate
    /// `required_fields` and `field_types`.
    ///
    /// If `id` is provided and already in use, returns `AlreadyExists`.
    #[instrument(skip(self, form_context_md), fields(id))]
    pub fn create(&self, form_context_md: String, id: Option<String>) -> Result<Arc<Mutex<Session>>> {
        let id = id.unwrap_or_else(|| Uuid::new_v4().to_string());
        if self.sessions.contains_key(&id) {
            return Err(SessionError::AlreadyExists { id });
        }

        let parsed = formpilot_forms::parse_form(&form_context_md);
        let session = Session::new(id.clone(), form_context_md, parsed.required_fields, parsed.field_types);
        let handle = Arc::new(Mutex::new(session));
        self.sessions.insert(id.clone(), Arc::clone(&handle));
        info!(id = %id, "session created");
        Ok(handle)
    }

    /// Retrieve a session handle by id. Does not touch `last_accessed_at` —
    /// callers update that once they've actually locked and used the session.
    pub fn get(&self, id: &str) -> Option<Arc<Mutex<Session>>> {
        self.sessions.get(id).map(|entry| Arc::clone(entry.value()))
    }

    /// Get an existing session or create a new one with the given id.
    pub fn get_or_create(&self, id: &str, form_context_md: impl FnOnce() -> String) -> Arc<Mutex<Session>> {
        if let Some(existing) = self.get(id) {
            return existing;
        }
        // `create` can race under concurrent first-turns for the same fresh
        // id; fall back to whichever handle actually landed in the map.
        match self.create(form_context_md(), Some(id.to_string())) {
            Ok(handle) => handle,
            Err(SessionError::AlreadyExists { .. }) => self
                .get(id)
                .expect("session just reported AlreadyExists but is now missing"),
            Err(SessionError::NotFound { .. }) => {
                unreachable!("create() never returns NotFound")
            }
        }
    }

    #[instrument(skip(self))]
    pub fn delete(&self, id: &str) -> Result<()> {
        match self.sessions.remove(id) {
            Some(_) => {
                debug!(id = %id, "session deleted");
                Ok(())
            }
            None => Err(SessionError::NotFound { id: id.to_string() }),
        }
    }

    pub fn active_count(&self) -> usize {
        self.sessions.len()
    }

    /// Remove every session whose `last_accessed_at` is older than the
    /// configured TTL. Returns the number of sessions swept.
    ///
    /// A session is only inspected under its own lock — a `try_lock` skip
    /// is fine here since a session actively mid-turn has, by definition,
    /// just been accessed and is in no danger of looking expired.
    pub fn sweep_expired(&self) -> usize {
        let ttl = self.ttl;
        let expired: Vec<String> = self
            .sessions
            .iter()
            .filter_map(|entry| {
                entry
                    .value()
                    .try_lock()
                    .ok()
                    .filter(|session| session.is_expired(ttl))
                    .map(|_| entry.key().clone())
            })
            .collect();

        for id in &expired {
            self.sessions.remove(id);
        }
        if !expired.is_empty() {
            info!(count = expired.len(), "swept expired sessions");
        }
        expired.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FORM: &str = "# Leave\n\n## Field Summary\n| Field ID | Type | Required |\n|---|---|---|\n| leave_type | dropdown | yes |\n";

    #[test]
    fn create_then_get_round_trips() {
        let store = SessionStore::new(1800);
        let handle = store.create(FORM.to_string(), None).unwrap();
        let id = {
            let session = handle.try_lock().unwrap();
            session.id.clone()
        };
        assert!(store.get(&id).is_some());
        assert_eq!(store.active_count(), 1);
    }

    #[test]
    fn create_with_duplicate_id_fails() {
        let store = SessionStore::new(1800);
        store.create(FORM.to_string(), Some("dup".into())).unwrap();
        let err = store.create(FORM.to_string(), Some("dup".into())).unwrap_err();
        assert!(matches!(err, SessionError::AlreadyExists { .. }));
    }

    #[test]
    fn delete_missing_session_errors() {
        let store = SessionStore::new(1800);
        assert!(store.delete("nope").is_err());
    }

    #[test]
    fn sweep_removes_nothing_when_fresh() {
        let store = SessionStore::new(1800);
        store.create(FORM.to_string(), Some("s1".into())).unwrap();
        assert_eq!(store.sweep_expired(), 0);
        assert_eq!(store.active_count(), 1);
    }

    #[test]
    fn sweep_removes_expired_sessions() {
        let store = SessionStore::new(0);
        store.create(FORM.to_string(), Some("s1".into())).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));
        assert_eq!(store.sweep_expired(), 1);
        assert_eq!(store.active_count(), 0);
    }
}
