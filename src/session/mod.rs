// Session Store — server-held state for the two-phase avatar protocol
//
// The avatar provider hands back a session token that must outlive a single
// HTTP request (create → send text → close). Callers only ever see an opaque
// session id; the token stays in this store. Entries are keyed by UUID in a
// DashMap; map guards are released before any await so an in-flight upstream
// call never blocks unrelated sessions.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use uuid::Uuid;

use crate::error::GatewayError;

/// Lifecycle of one avatar session. Transitions only advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Created,
    Started,
    Active,
    Closed,
}

impl SessionStatus {
    /// Position in the forward-only lifecycle.
    fn rank(self) -> u8 {
        match self {
            Self::Created => 0,
            Self::Started => 1,
            Self::Active => 2,
            Self::Closed => 3,
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Created => "created",
            Self::Started => "started",
            Self::Active => "active",
            Self::Closed => "closed",
        };
        f.write_str(s)
    }
}

/// One live-avatar conversation, as held by the gateway.
#[derive(Debug, Clone, Serialize)]
pub struct AvatarSession {
    /// Opaque id handed to the caller (gateway-generated, not the provider's)
    pub id: String,
    /// Provider-side session identifier
    pub provider_session_id: String,
    /// Provider token — never serialized out to callers
    #[serde(skip_serializing)]
    pub session_token: String,
    pub avatar_id: String,
    pub voice_id: String,
    pub context_id: Option<String>,
    pub language: String,
    pub created_at: DateTime<Utc>,
    pub status: SessionStatus,
}

impl AvatarSession {
    pub fn new(
        provider_session_id: String,
        session_token: String,
        avatar_id: String,
        voice_id: String,
        context_id: Option<String>,
        language: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            provider_session_id,
            session_token,
            avatar_id,
            voice_id,
            context_id,
            language,
            created_at: Utc::now(),
            status: SessionStatus::Created,
        }
    }
}

struct SessionEntry {
    session: AvatarSession,
    /// Refreshed on every successful lookup; drives TTL eviction
    last_activity: Instant,
    /// Serializes send_text per session — the provider's conversational
    /// state is order-sensitive
    send_lock: Arc<Mutex<()>>,
}

/// Thread-safe in-memory session store with idle-TTL eviction.
pub struct SessionStore {
    entries: DashMap<String, SessionEntry>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Insert a freshly created session. Ids are UUIDs, so collisions are
    /// not expected; an existing entry under the same id is replaced.
    pub fn put(&self, session: AvatarSession) {
        self.entries.insert(
            session.id.clone(),
            SessionEntry {
                session,
                last_activity: Instant::now(),
                send_lock: Arc::new(Mutex::new(())),
            },
        );
    }

    /// Look up a session by id, refreshing its activity timestamp.
    ///
    /// A session past its idle TTL is evicted on the spot and reported as
    /// unknown — lookups never resurrect an expired session.
    pub fn get(&self, id: &str) -> Result<AvatarSession, GatewayError> {
        let now = Instant::now();
        {
            let Some(mut entry) = self.entries.get_mut(id) else {
                return Err(GatewayError::SessionNotFound { id: id.to_string() });
            };
            if now.duration_since(entry.last_activity) < self.ttl {
                entry.last_activity = now;
                return Ok(entry.session.clone());
            }
        }
        // Expired — drop the guard before removing
        self.entries.remove(id);
        tracing::debug!(session_id = id, "session expired on lookup");
        Err(GatewayError::SessionNotFound { id: id.to_string() })
    }

    /// Hand out the per-session send lock. The Arc is cloned out so the
    /// caller can await the mutex without holding a map guard.
    pub fn send_lock(&self, id: &str) -> Result<Arc<Mutex<()>>, GatewayError> {
        self.entries
            .get(id)
            .map(|entry| Arc::clone(&entry.send_lock))
            .ok_or_else(|| GatewayError::SessionNotFound { id: id.to_string() })
    }

    /// Advance a session's status.
    ///
    /// Same-status updates are idempotent no-ops; any regression fails with
    /// `InvalidTransition` and leaves the entry untouched.
    pub fn update_status(
        &self,
        id: &str,
        new_status: SessionStatus,
    ) -> Result<(), GatewayError> {
        let mut entry = self
            .entries
            .get_mut(id)
            .ok_or_else(|| GatewayError::SessionNotFound { id: id.to_string() })?;

        let current = entry.session.status;
        if new_status.rank() < current.rank() {
            return Err(GatewayError::InvalidTransition {
                from: current,
                to: new_status,
            });
        }
        entry.session.status = new_status;
        entry.last_activity = Instant::now();
        Ok(())
    }

    /// Remove sessions idle past the TTL. Returns how many were evicted.
    pub fn evict_expired(&self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| now.duration_since(entry.last_activity) < self.ttl);
        let evicted = before - self.entries.len();
        if evicted > 0 {
            tracing::info!(evicted, "evicted idle avatar sessions");
        }
        evicted
    }

    /// Number of sessions currently held.
    pub fn active_count(&self) -> usize {
        self.entries.len()
    }
}
