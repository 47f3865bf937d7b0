use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Json,
};
use classroom_api::Request;
use serde_json::{json, Value};
use tracing::Instrument;

use crate::server::{
    error::ServerError,
    extract::{self, ApiQuery, CurrentUser},
    models::{CallbackParams, RefreshResponse, SessionResponse},
    services::OAuthClient,
    AppState,
};

const SUCCESS_HTML: &str = r#"<!DOCTYPE html>
<html lang="es">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>Sesión iniciada</title>
    <style>
        body {
            margin: 0;
            font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, "Helvetica Neue", Arial, sans-serif;
            background: linear-gradient(135deg, #3B82F6 0%, #1E40AF 100%);
            display: flex;
            justify-content: center;
            align-items: center;
            height: 100vh;
        }
        .container {
            background: white;
            border-radius: 12px;
            padding: 48px;
            box-shadow: 0 8px 32px rgba(0, 0, 0, 0.1);
            text-align: center;
            max-width: 400px;
        }
        .checkmark {
            width: 64px;
            height: 64px;
            border-radius: 50%;
            background: #10B981;
            color: white;
            display: inline-flex;
            align-items: center;
            justify-content: center;
            font-size: 32px;
            margin-bottom: 24px;
        }
        h1 { color: #1F2937; margin: 0 0 12px 0; font-size: 24px; font-weight: 600; }
        p { color: #6B7280; margin: 0 0 24px 0; line-height: 1.5; }
        .footer { color: #9CA3AF; font-size: 14px; }
    </style>
</head>
<body>
    <div class="container">
        <div class="checkmark">✓</div>
        <h1>¡Bienvenido/a, {NAME}!</h1>
        <p>Ingresaste como <strong>{ROLE}</strong>. Ya podés volver al dashboard de Aulux.</p>
        <div class="footer">Aulux - Semillero Digital</div>
    </div>
</body>
</html>"#;

const ERROR_HTML_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="es">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>Error de autenticación</title>
    <style>
        body {
            margin: 0;
            font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, "Helvetica Neue", Arial, sans-serif;
            background: linear-gradient(135deg, #f093fb 0%, #f5576c 100%);
            display: flex;
            justify-content: center;
            align-items: center;
            height: 100vh;
        }
        .container {
            background: white;
            border-radius: 12px;
            padding: 48px;
            box-shadow: 0 8px 32px rgba(0, 0, 0, 0.1);
            text-align: center;
            max-width: 400px;
        }
        .error-icon {
            width: 64px;
            height: 64px;
            border-radius: 50%;
            background: #EF4444;
            color: white;
            display: inline-flex;
            align-items: center;
            justify-content: center;
            font-size: 32px;
            margin-bottom: 24px;
        }
        h1 { color: #1F2937; margin: 0 0 12px 0; font-size: 24px; font-weight: 600; }
        p { color: #6B7280; margin: 0 0 24px 0; line-height: 1.5; }
        .error-details {
            background: #FEE2E2;
            border-radius: 8px;
            padding: 16px;
            color: #991B1B;
            font-family: monospace;
            font-size: 14px;
            margin-bottom: 24px;
        }
        .footer { color: #9CA3AF; font-size: 14px; }
    </style>
</head>
<body>
    <div class="container">
        <div class="error-icon">✗</div>
        <h1>No se pudo iniciar sesión</h1>
        <div class="error-details">{ERROR}</div>
        <p>Cerrá esta ventana y volvé a intentarlo.</p>
        <div class="footer">Aulux - Semillero Digital</div>
    </div>
</body>
</html>"#;

fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn session_cookie(name: &str, value: &str, max_age: u64, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; HttpOnly; Path=/; SameSite=Lax; Max-Age={}",
        name, value, max_age
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

pub async fn login(State(state): State<AppState>) -> Result<Redirect, ServerError> {
    let csrf_state = OAuthClient::generate_state_token();
    state.session_store.begin_login(csrf_state.clone());

    let auth_url = state.oauth_client.build_authorization_url(&csrf_state)?;
    tracing::debug!("Redirecting to Google consent screen");

    Ok(Redirect::to(&auth_url))
}

pub async fn oauth_callback(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<CallbackParams>,
) -> Result<Response, ServerError> {
    // Check for OAuth errors
    if let Some(error) = params.error {
        tracing::warn!(error = %error, "OAuth callback error");
        let page = ERROR_HTML_TEMPLATE.replace("{ERROR}", &escape_html(&error));
        return Ok((StatusCode::BAD_REQUEST, Html(page)).into_response());
    }

    if !state.session_store.complete_login(&params.state) {
        return Err(ServerError::BadRequest(
            "Invalid or expired login state".to_string(),
        ));
    }

    // Get authorization code
    let code = params
        .code
        .ok_or_else(|| ServerError::BadRequest("Missing authorization code".to_string()))?;

    // Exchange code for tokens
    let tokens = state.oauth_client.exchange_code_for_token(&code).await?;

    let client = extract::google_client(&state.settings, &tokens.access_token);
    let profile = client.send(Request::userinfo().get()).await?;
    let email = profile
        .email
        .ok_or_else(|| ServerError::OAuthError("Google profile has no email".to_string()))?;

    let span = tracing::info_span!("oauth_callback", email = %email);
    let _enter = span.enter();

    let role = state.roles.resolve(&email);
    if !state.roles.is_listed(&email) {
        tracing::warn!("Email is on no role list, signing in as alumno");
    }
    let session = state
        .session_store
        .create_session(email, profile.name, role, tokens);

    tracing::info!(role = %session.role, "OAuth callback successful");

    let display_name = session.name.as_deref().unwrap_or(&session.email);
    let page = SUCCESS_HTML
        .replace("{NAME}", &escape_html(display_name))
        .replace("{ROLE}", session.role.as_str());
    let cookie = session_cookie(
        &state.settings.cookie_name,
        &session.session_id,
        state.settings.session_ttl_seconds,
        state.settings.secure_cookies,
    );

    Ok(([(header::SET_COOKIE, cookie)], Html(page)).into_response())
}

pub async fn current_session(CurrentUser(session): CurrentUser) -> Json<SessionResponse> {
    Json(SessionResponse {
        email: session.email,
        name: session.name,
        role: session.role,
        expires_at: session.tokens.expires_at,
    })
}

pub async fn refresh_tokens(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
) -> Result<Json<RefreshResponse>, ServerError> {
    let span = tracing::info_span!("refresh_tokens", email = %session.email);
    let session = extract::refresh_session(&state, &session)
        .instrument(span)
        .await?;

    tracing::info!(role = %session.role, "Token refresh successful");

    Ok(Json(RefreshResponse {
        role: session.role,
        expires_at: session.tokens.expires_at,
    }))
}

pub async fn logout(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
) -> impl IntoResponse {
    state.session_store.delete_session(&session.session_id);
    tracing::info!(email = %session.email, "Signed out");

    let cookie = session_cookie(
        &state.settings.cookie_name,
        "",
        0,
        state.settings.secure_cookies,
    );
    ([(header::SET_COOKIE, cookie)], Json::<Value>(json!({ "success": true })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secure_flag_follows_setting() {
        let plain = session_cookie("aulux_session", "abc", 60, false);
        assert_eq!(
            plain,
            "aulux_session=abc; HttpOnly; Path=/; SameSite=Lax; Max-Age=60"
        );
        assert!(!plain.contains("Secure"));
        assert!(session_cookie("aulux_session", "abc", 60, true).ends_with("; Secure"));
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_html("<b>&</b>"), "&lt;b&gt;&amp;&lt;/b&gt;");
    }
}
