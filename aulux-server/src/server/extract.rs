use axum::{
    extract::{FromRequestParts, Query},
    http::{header, request::Parts, HeaderMap},
};
use serde::de::DeserializeOwned;
use classroom_api::Client;
use secrecy::{ExposeSecret, SecretString};
use subtle::ConstantTimeEq;

use crate::server::{
    error::ServerError,
    models::{Role, UserSession},
    AppState, Settings,
};

/// The signed-in user behind the session cookie.
///
/// Expired access tokens are refreshed before the handler runs.
pub struct CurrentUser(pub UserSession);

impl CurrentUser {
    pub fn require(&self, role: Role) -> Result<(), ServerError> {
        if self.0.role == role {
            Ok(())
        } else {
            Err(ServerError::Forbidden(format!(
                "Requires role {}, signed in as {}",
                role, self.0.role
            )))
        }
    }

    /// Classroom/Calendar client acting as this user.
    pub fn classroom_client(&self, settings: &Settings) -> Client {
        classroom_client(settings, &self.0)
    }
}

pub fn classroom_client(settings: &Settings, session: &UserSession) -> Client {
    google_client(settings, &session.tokens.access_token)
}

pub fn google_client(settings: &Settings, access_token: &str) -> Client {
    Client::with_base_urls(
        &SecretString::from(access_token),
        &settings.classroom.classroom_base_url,
        &settings.classroom.google_base_url,
    )
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let session_id = session_cookie(&parts.headers, &state.settings.cookie_name)
            .ok_or_else(|| ServerError::Unauthorized("No session".to_string()))?;

        let session = state
            .session_store
            .get_session(&session_id)
            .ok_or_else(|| ServerError::Unauthorized("Unknown or expired session".to_string()))?;

        if session.tokens.is_expired() {
            return refresh_session(state, &session).await.map(CurrentUser);
        }
        Ok(CurrentUser(session))
    }
}

/// Refresh a session's tokens and recompute its role from the allowlists.
pub async fn refresh_session(
    state: &AppState,
    session: &UserSession,
) -> Result<UserSession, ServerError> {
    let refresh_token = session.tokens.refresh_token.as_deref().ok_or_else(|| {
        ServerError::Unauthorized("Session expired and cannot be refreshed".to_string())
    })?;

    let tokens = state
        .oauth_client
        .refresh_access_token(refresh_token)
        .await
        .map_err(|e| {
            tracing::warn!(session_id = %session.session_id, error = %e, "Token refresh failed");
            ServerError::Unauthorized("Session expired, sign in again".to_string())
        })?;

    let role = state.roles.resolve(&session.email);
    state
        .session_store
        .refresh_session(&session.session_id, tokens, role)
        .ok_or_else(|| ServerError::Unauthorized("Session ended during refresh".to_string()))
}

pub fn session_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, value)| *key == name && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

/// Query string extractor whose rejections render as JSON 400s.
pub struct ApiQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Query::<T>::try_from_uri(&parts.uri)
            .map(|Query(value)| ApiQuery(value))
            .map_err(|rejection| ServerError::BadRequest(rejection.body_text()))
    }
}

/// Marker for requests carrying `Authorization: Bearer <cron secret>`.
pub struct CronAuth;

impl FromRequestParts<AppState> for CronAuth {
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let secret = state.settings.cron_secret.as_ref().ok_or_else(|| {
            tracing::warn!("Cron request rejected: no cron secret configured");
            ServerError::Unauthorized("No autorizado".to_string())
        })?;

        let provided = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .unwrap_or_default();

        if bool::from(provided.as_bytes().ct_eq(secret.expose_secret().as_bytes())) {
            Ok(CronAuth)
        } else {
            tracing::warn!("Cron request rejected: bad secret");
            Err(ServerError::Unauthorized("No autorizado".to_string()))
        }
    }
}
