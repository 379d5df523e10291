use chrono::{DateTime, Duration, Utc};
use domain::session::{SessionContext, TurnRecord};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::{Mutex as TurnMutex, OwnedMutexGuard};
use tracing::{debug, info};
use uuid::Uuid;

/// Default inactivity window after which a session is dropped.
pub const DEFAULT_TTL_MINUTES: i64 = 30;

/// In-memory session registry keyed by session id.
///
/// Every operation takes `now` explicitly so expiry is driven by the caller's
/// clock. Contexts handed out are snapshots; mutation goes through
/// [`SessionStore::touch`].
pub struct SessionStore {
    sessions: Mutex<HashMap<String, SessionContext>>,
    turn_locks: Mutex<HashMap<String, Arc<TurnMutex<()>>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            turn_locks: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn sessions(&self) -> MutexGuard<'_, HashMap<String, SessionContext>> {
        self.sessions.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn turn_locks(&self) -> MutexGuard<'_, HashMap<String, Arc<TurnMutex<()>>>> {
        self.turn_locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Return a live context for `session_id` together with the effective id.
    ///
    /// A missing or blank id gets a fresh uuid. An unknown id is registered
    /// as given. An expired context is discarded and replaced by a fresh one
    /// under the same id, so stale book/city values never leak into the turn.
    pub fn resolve(&self, session_id: Option<&str>, now: DateTime<Utc>) -> (SessionContext, String) {
        let id = match session_id.map(str::trim).filter(|id| !id.is_empty()) {
            Some(id) => id.to_string(),
            None => Uuid::new_v4().to_string(),
        };

        let mut sessions = self.sessions();
        if let Some(existing) = sessions.get(&id) {
            if !existing.is_expired(now, self.ttl) {
                return (existing.clone(), id);
            }
            info!(session_id = %id, "session expired; starting over");
        } else {
            debug!(session_id = %id, "new session");
        }

        let fresh = SessionContext::new(id.clone(), now);
        sessions.insert(id.clone(), fresh.clone());
        (fresh, id)
    }

    /// Snapshot of a live session. Expired sessions read as absent.
    pub fn get(&self, session_id: &str, now: DateTime<Utc>) -> Option<SessionContext> {
        self.sessions()
            .get(session_id)
            .filter(|ctx| !ctx.is_expired(now, self.ttl))
            .cloned()
    }

    /// Record a completed turn. Book and city are only replaced by definite
    /// values.
    pub fn touch(
        &self,
        session_id: &str,
        record: TurnRecord,
        book: Option<String>,
        city: Option<String>,
        now: DateTime<Utc>,
    ) {
        self.sessions()
            .entry(session_id.to_string())
            .or_insert_with(|| SessionContext::new(session_id, now))
            .record_turn(record, book, city, now);
    }

    /// Remove every expired session and return how many were removed.
    /// Sessions with a turn in flight are left for the next sweep.
    pub fn sweep_expired(&self, now: DateTime<Utc>) -> usize {
        let busy: HashSet<String> = self
            .turn_locks()
            .iter()
            .filter(|(_, lock)| Arc::strong_count(lock) > 1)
            .map(|(id, _)| id.clone())
            .collect();

        let removed = {
            let mut sessions = self.sessions();
            let before = sessions.len();
            sessions.retain(|id, ctx| busy.contains(id) || !ctx.is_expired(now, self.ttl));
            before - sessions.len()
        };

        // Drop turn locks nobody holds and whose session is gone.
        let live: Vec<String> = self.sessions().keys().cloned().collect();
        self.turn_locks()
            .retain(|id, lock| live.contains(id) || Arc::strong_count(lock) > 1);

        if removed > 0 {
            info!(removed, "expired sessions swept");
        }
        removed
    }

    /// Serialize turns on one session id. Distinct ids never contend.
    pub async fn lock_turn(&self, session_id: &str) -> OwnedMutexGuard<()> {
        let lock = self
            .turn_locks()
            .entry(session_id.to_string())
            .or_insert_with(|| Arc::new(TurnMutex::new(())))
            .clone();
        lock.lock_owned().await
    }

    pub fn len(&self) -> usize {
        self.sessions().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(Duration::minutes(DEFAULT_TTL_MINUTES))
    }
}
