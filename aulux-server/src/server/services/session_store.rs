use chrono::Utc;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::common::TokenPair;
use crate::server::models::{PendingLogin, Role, UserSession};

/// How long a login may sit at Google's consent screen.
const PENDING_LOGIN_TTL: Duration = Duration::from_secs(600);

pub struct SessionStore {
    sessions: Arc<DashMap<String, UserSession>>,
    pending: Arc<DashMap<String, PendingLogin>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl_seconds: u64) -> Self {
        let store = Self {
            sessions: Arc::new(DashMap::new()),
            pending: Arc::new(DashMap::new()),
            ttl: Duration::from_secs(ttl_seconds),
        };

        // Spawn background cleanup task
        let sessions_clone = store.sessions.clone();
        let pending_clone = store.pending.clone();
        let ttl_clone = store.ttl;
        tokio::spawn(async move {
            cleanup_expired_sessions(sessions_clone, pending_clone, ttl_clone).await;
        });

        tracing::info!(
            "Session store initialized with TTL of {} seconds",
            ttl_seconds
        );
        store
    }

    /// Remember a CSRF state until the callback consumes it
    pub fn begin_login(&self, state: String) {
        self.pending.insert(
            state.clone(),
            PendingLogin {
                state,
                created_at: Utc::now(),
            },
        );
    }

    /// Consume a CSRF state. Each state is accepted at most once.
    pub fn complete_login(&self, state: &str) -> bool {
        match self.pending.remove(state) {
            Some((_, login)) => age(&login.created_at) < PENDING_LOGIN_TTL,
            None => false,
        }
    }

    /// Create a session for a freshly signed-in user
    pub fn create_session(
        &self,
        email: String,
        name: Option<String>,
        role: Role,
        tokens: TokenPair,
    ) -> UserSession {
        let session = UserSession {
            session_id: Uuid::new_v4().to_string(),
            email,
            name,
            role,
            tokens,
            created_at: Utc::now(),
        };
        self.sessions
            .insert(session.session_id.clone(), session.clone());
        tracing::debug!(
            session_id = %session.session_id,
            email = %session.email,
            role = %session.role,
            "Created session"
        );
        session
    }

    /// Get a live session by ID
    pub fn get_session(&self, session_id: &str) -> Option<UserSession> {
        self.sessions
            .get(session_id)
            .filter(|s| age(&s.created_at) < self.ttl)
            .map(|s| s.clone())
    }

    /// Most recent live session belonging to an email
    pub fn find_by_email(&self, email: &str) -> Option<UserSession> {
        let email = email.trim().to_lowercase();
        self.sessions
            .iter()
            .filter(|s| s.email.to_lowercase() == email && age(&s.created_at) < self.ttl)
            .max_by_key(|s| s.created_at)
            .map(|s| s.clone())
    }

    /// Update a session using a closure
    pub fn update_session<F>(&self, session_id: &str, update_fn: F) -> Option<UserSession>
    where
        F: FnOnce(&mut UserSession),
    {
        self.sessions.get_mut(session_id).map(|mut s| {
            update_fn(&mut s);
            s.clone()
        })
    }

    /// Store refreshed tokens and the recomputed role
    pub fn refresh_session(
        &self,
        session_id: &str,
        tokens: TokenPair,
        role: Role,
    ) -> Option<UserSession> {
        let result = self.update_session(session_id, |s| {
            let previous = s.tokens.refresh_token.take();
            s.tokens = tokens.or_refresh_token(previous);
            s.role = role;
        });
        if result.is_some() {
            tracing::debug!("Session refreshed: {}", session_id);
        }
        result
    }

    /// Delete a session
    pub fn delete_session(&self, session_id: &str) {
        self.sessions.remove(session_id);
        tracing::debug!("Session deleted: {}", session_id);
    }

    /// Get session count (for monitoring)
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

fn age(created_at: &chrono::DateTime<Utc>) -> Duration {
    Utc::now()
        .signed_duration_since(created_at)
        .to_std()
        .unwrap_or(Duration::ZERO)
}

/// Background task that periodically cleans up expired sessions and logins
async fn cleanup_expired_sessions(
    sessions: Arc<DashMap<String, UserSession>>,
    pending: Arc<DashMap<String, PendingLogin>>,
    ttl: Duration,
) {
    let mut interval = tokio::time::interval(Duration::from_secs(60));
    loop {
        interval.tick().await;
        let initial_count = sessions.len();

        sessions.retain(|session_id, session| {
            if age(&session.created_at) >= ttl {
                tracing::debug!(
                    session_id = %session_id,
                    email = %session.email,
                    "Cleaning up expired session"
                );
                false
            } else {
                true
            }
        });
        pending.retain(|_, login| age(&login.created_at) < PENDING_LOGIN_TTL);

        let cleaned = initial_count.saturating_sub(sessions.len());
        if cleaned > 0 {
            tracing::info!(
                "Cleaned up {} expired sessions, {} remaining",
                cleaned,
                sessions.len()
            );
        }
    }
}
