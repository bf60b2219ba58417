//! Explicit session store.
//!
//! The store is a plain object owned by the application state and passed
//! by reference to whatever needs it; there is no process-wide singleton.
//! Observers register on the store itself and are notified synchronously
//! on login and logout. Tests construct a fresh store per case.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::config::AuthConfig;

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: &'static str,
    pub last_login: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub token: Uuid,
    pub user: User,
    pub created_at: DateTime<Utc>,
}

/// Event delivered to registered observers.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    LoggedIn { email: String },
    LoggedOut { email: String },
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,
}

type Listener = Arc<dyn Fn(&SessionEvent) + Send + Sync>;

/// Holds live sessions and an explicit observer list.
pub struct SessionStore {
    credentials: AuthConfig,
    sessions: DashMap<Uuid, Session>,
    listeners: Mutex<Vec<Listener>>,
}

impl SessionStore {
    pub fn new(credentials: AuthConfig) -> Self {
        Self {
            credentials,
            sessions: DashMap::new(),
            listeners: Mutex::new(Vec::new()),
        }
    }

    /// Validate credentials and open a session.
    pub fn login(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        if email != self.credentials.admin_email || password != self.credentials.admin_password {
            return Err(AuthError::InvalidCredentials);
        }

        let now = Utc::now();
        let session = Session {
            token: Uuid::new_v4(),
            user: User {
                id: "admin-1".to_string(),
                email: email.to_string(),
                name: self.credentials.admin_name.clone(),
                role: "admin",
                last_login: now,
            },
            created_at: now,
        };

        self.sessions.insert(session.token, session.clone());
        self.notify(&SessionEvent::LoggedIn {
            email: email.to_string(),
        });

        Ok(session)
    }

    /// Close a session. Returns whether the token was live.
    pub fn logout(&self, token: &Uuid) -> bool {
        match self.sessions.remove(token) {
            Some((_, session)) => {
                self.notify(&SessionEvent::LoggedOut {
                    email: session.user.email,
                });
                true
            }
            None => false,
        }
    }

    pub fn session(&self, token: &Uuid) -> Option<Session> {
        self.sessions.get(token).map(|s| s.clone())
    }

    /// Register an observer for login/logout events.
    pub fn subscribe(&self, listener: impl Fn(&SessionEvent) + Send + Sync + 'static) {
        if let Ok(mut listeners) = self.listeners.lock() {
            listeners.push(Arc::new(listener));
        }
    }

    pub fn active_sessions(&self) -> Vec<Session> {
        self.sessions.iter().map(|s| s.clone()).collect()
    }

    fn notify(&self, event: &SessionEvent) {
        // Snapshot under the lock, invoke outside it, so a listener can
        // call back into the store without deadlocking.
        let snapshot: Vec<Listener> = match self.listeners.lock() {
            Ok(listeners) => listeners.clone(),
            Err(_) => return,
        };
        for listener in snapshot {
            listener(event);
        }
    }
}
