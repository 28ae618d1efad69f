//! Admin sign-in and bearer sessions.
//!
//! Accounts are fixed at startup from configuration and carry the SHA-256
//! digest of their password. A successful sign-in issues an opaque bearer
//! token that stays valid until it expires or the admin signs out. Sessions
//! live in memory only.

use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::errors::MemorialError;

pub const DEFAULT_SESSION_TTL_MINUTES: i64 = 720;

/// A configured admin account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub email: String,
    /// Lowercase hex SHA-256 of the password
    pub password_sha256: String,
    pub uid: String,
}

impl Credential {
    pub fn new(email: impl Into<String>, password_sha256: impl Into<String>, uid: impl Into<String>) -> Self {
        Self {
            email: email.into().trim().to_string(),
            password_sha256: password_sha256.into().trim().to_lowercase(),
            uid: uid.into(),
        }
    }
}

/// The authenticated admin a request acts for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub uid: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub principal: Principal,
    pub expires_at: DateTime<Utc>,
}

/// Hash a password using SHA256
pub fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

#[derive(Clone)]
pub struct AuthService {
    credentials: Vec<Credential>,
    sessions: Arc<RwLock<HashMap<String, Session>>>,
    ttl: Duration,
}

impl AuthService {
    pub fn new(credentials: Vec<Credential>, ttl: Duration) -> Self {
        Self {
            credentials,
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    pub fn has_accounts(&self) -> bool {
        !self.credentials.is_empty()
    }

    /// Check email and password, then open a session
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, MemorialError> {
        let email = email.trim();
        let digest = hash_password(password);

        let Some(credential) = self
            .credentials
            .iter()
            .find(|c| c.email.eq_ignore_ascii_case(email) && c.password_sha256 == digest)
        else {
            warn!("Failed sign-in attempt for {}", email);
            return Err(MemorialError::AuthFailure);
        };

        let session = Session {
            token: Uuid::new_v4().simple().to_string(),
            principal: Principal {
                uid: credential.uid.clone(),
                email: credential.email.clone(),
            },
            expires_at: Utc::now() + self.ttl,
        };

        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, s| s.expires_at > Utc::now());
        sessions.insert(session.token.clone(), session.clone());

        info!("Admin {} signed in", session.principal.email);
        Ok(session)
    }

    /// Resolve a bearer token to its principal; expired sessions are evicted
    pub async fn authenticate(&self, token: &str) -> Option<Principal> {
        {
            let sessions = self.sessions.read().await;
            match sessions.get(token) {
                None => return None,
                Some(session) if session.expires_at > Utc::now() => {
                    return Some(session.principal.clone());
                }
                Some(_) => {}
            }
        }

        let mut sessions = self.sessions.write().await;
        if let Some(session) = sessions.remove(token) {
            debug!("Evicted expired session for {}", session.principal.email);
        }
        None
    }

    /// End a session; returns false if the token was unknown
    pub async fn sign_out(&self, token: &str) -> bool {
        let removed = self.sessions.write().await.remove(token);
        if let Some(session) = &removed {
            info!("Admin {} signed out", session.principal.email);
        }
        removed.is_some()
    }
}
