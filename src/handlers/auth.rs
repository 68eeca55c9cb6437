use crate::errors::AppError;
use crate::models::{LoginForm, RegisterForm};
use crate::session::{hash_password, verify_password, Session, UserContext, SESSION_COOKIE};
use crate::state::AppState;
use crate::ui::{render_login, render_register};
use axum::extract::{FromRequest, Request, State};
use axum::http::header;
use axum::response::{Html, Redirect};
use axum::{Form, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::de::DeserializeOwned;
use tracing::{info, warn};

/// A body posted either by an HTML form or as JSON.
pub struct Submitted<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequest<S> for Submitted<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("application/json"));
        if is_json {
            let Json(value) = Json::<T>::from_request(req, state).await?;
            Ok(Self(value))
        } else {
            let Form(value) = Form::<T>::from_request(req, state).await?;
            Ok(Self(value))
        }
    }
}

pub async fn index(ctx: Option<UserContext>) -> Redirect {
    match ctx {
        Some(_) => Redirect::to("/api/dashboard"),
        None => Redirect::to("/login"),
    }
}

pub async fn login_page() -> Html<String> {
    Html(render_login())
}

pub async fn register_page() -> Html<String> {
    Html(render_register())
}

pub async fn register(
    State(state): State<AppState>,
    Submitted(form): Submitted<RegisterForm>,
) -> Result<Redirect, AppError> {
    let new_user = form.validate()?;
    let taken = || AppError::conflict("username or email already taken");
    if state
        .store
        .username_or_email_taken(&new_user.username, &new_user.email)
        .await?
    {
        return Err(taken());
    }

    let password = new_user.password.clone();
    let hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(AppError::internal)?
        .map_err(AppError::internal)?;

    let id = match state.store.create_user(&new_user, &hash, state.clock.now()).await {
        Ok(id) => id,
        Err(sqlx::Error::Database(db)) if db.is_unique_violation() => return Err(taken()),
        Err(err) => return Err(err.into()),
    };
    info!(user_id = id, username = %new_user.username, "user registered");
    Ok(Redirect::to("/login"))
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Submitted(form): Submitted<LoginForm>,
) -> Result<(CookieJar, Redirect), AppError> {
    let rejected = || AppError::unauthorized("invalid username or password");
    let Some(user) = state.store.find_user_by_username(form.username.trim()).await? else {
        warn!(username = %form.username.trim(), "login for unknown user");
        return Err(rejected());
    };

    let password = form.password;
    let stored = user.password_hash.clone();
    let verified = tokio::task::spawn_blocking(move || verify_password(&password, &stored))
        .await
        .map_err(AppError::internal)?;
    if !verified {
        warn!(user_id = user.id, "login with wrong password");
        return Err(rejected());
    }

    let token = state
        .sessions
        .create(Session {
            user_id: user.id,
            username: user.username,
            theme: user.theme,
        })
        .await;
    let cookie = Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);
    info!(user_id = user.id, "signed in");
    Ok((jar.add(cookie), Redirect::to("/api/dashboard")))
}

pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Redirect) {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        if let Some(session) = state.sessions.remove(cookie.value()).await {
            info!(user_id = session.user_id, "signed out");
        }
    }
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    (jar, Redirect::to("/login"))
}
