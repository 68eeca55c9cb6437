//! Sign-in state.
//!
//! Sessions live in memory keyed by a random token carried in the
//! `bs_session` cookie. Every authenticated handler receives a
//! [`UserContext`] built from that session plus the server clock, and passes
//! it down instead of reading ambient state.

use crate::errors::AppError;
use crate::state::AppState;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "bs_session";

pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// `false` for a wrong password and for a stored hash that does not parse.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: i64,
    pub username: String,
    pub theme: String,
}

/// Signed-in sessions kept per user; signing in again past this evicts the
/// oldest one.
pub const MAX_SESSIONS_PER_USER: usize = 5;

#[derive(Debug)]
struct Issued {
    session: Session,
    serial: u64,
}

#[derive(Debug, Default)]
struct Sessions {
    by_token: HashMap<String, Issued>,
    next_serial: u64,
}

#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<Sessions>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `session` under a fresh token and returns the token.
    pub async fn create(&self, session: Session) -> String {
        let token = Uuid::new_v4().to_string();
        let mut sessions = self.inner.write().await;

        let mut held: Vec<(u64, String)> = sessions
            .by_token
            .iter()
            .filter(|(_, issued)| issued.session.user_id == session.user_id)
            .map(|(token, issued)| (issued.serial, token.clone()))
            .collect();
        if held.len() >= MAX_SESSIONS_PER_USER {
            held.sort_unstable();
            let excess = held.len() + 1 - MAX_SESSIONS_PER_USER;
            for (_, stale) in held.into_iter().take(excess) {
                sessions.by_token.remove(&stale);
            }
            debug!(user_id = session.user_id, evicted = excess, "session cap reached");
        }

        let serial = sessions.next_serial;
        sessions.next_serial += 1;
        sessions
            .by_token
            .insert(token.clone(), Issued { session, serial });
        token
    }

    pub async fn get(&self, token: &str) -> Option<Session> {
        self.inner
            .read()
            .await
            .by_token
            .get(token)
            .map(|issued| issued.session.clone())
    }

    pub async fn remove(&self, token: &str) -> Option<Session> {
        self.inner
            .write()
            .await
            .by_token
            .remove(token)
            .map(|issued| issued.session)
    }

    pub async fn set_theme(&self, token: &str, theme: &str) -> bool {
        match self.inner.write().await.by_token.get_mut(token) {
            Some(issued) => {
                issued.session.theme = theme.to_string();
                true
            }
            None => false,
        }
    }
}

/// The signed-in user for one request, with the request's notion of "now".
#[derive(Debug, Clone)]
pub struct UserContext {
    pub token: String,
    pub user_id: i64,
    pub username: String,
    pub theme: String,
    pub now: NaiveDateTime,
    pub today: NaiveDate,
}

/// API callers get a JSON 401; page requests are sent to the login form.
#[derive(Debug)]
pub enum AuthRejection {
    Unauthorized,
    LoginRedirect,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthorized => AppError::unauthorized("not signed in").into_response(),
            Self::LoginRedirect => Redirect::to("/login").into_response(),
        }
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for UserContext {
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let rejection = if parts.uri.path().starts_with("/api") {
            AuthRejection::Unauthorized
        } else {
            AuthRejection::LoginRedirect
        };

        let jar = CookieJar::from_headers(&parts.headers);
        let Some(token) = jar.get(SESSION_COOKIE).map(|cookie| cookie.value().to_string()) else {
            return Err(rejection);
        };
        let Some(session) = state.sessions.get(&token).await else {
            debug!("unknown session token");
            return Err(rejection);
        };

        let now = state.clock.now();
        Ok(Self {
            token,
            user_id: session.user_id,
            username: session.username,
            theme: session.theme,
            now,
            today: now.date(),
        })
    }
}
