pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod models;
pub mod services;

pub use config::Configuration;
pub use error::ServerError;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    routing::{get, post},
    Router,
};
use config::ClassroomConfiguration;
use secrecy::{ExposeSecret, SecretString};
use services::{
    AllowlistRoleProvider, AttendanceRepository, Dispatcher, GatherOptions,
    InMemoryAttendanceStore, NotificationDispatcher, OAuthClient, ResendClient, RoleProvider,
    SessionStore, TwilioClient,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::CorsLayer, limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer,
};

const BODY_LIMIT_BYTES: usize = 1024 * 1024;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Values handlers read from configuration at request time.
pub struct Settings {
    pub cookie_name: String,
    pub session_ttl_seconds: u64,
    pub allowed_origin: Option<String>,
    pub classroom: ClassroomConfiguration,
    pub cron_secret: Option<SecretString>,
    /// Mark the session cookie `Secure`; on when the OAuth redirect is https.
    pub secure_cookies: bool,
}

impl Settings {
    pub fn gather_options(&self) -> GatherOptions {
        GatherOptions {
            concurrency: self.classroom.fetch_concurrency,
            timeout: Duration::from_secs(self.classroom.request_timeout_seconds),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub session_store: Arc<SessionStore>,
    pub oauth_client: Arc<OAuthClient>,
    pub roles: Arc<dyn RoleProvider>,
    pub attendance: Arc<dyn AttendanceRepository>,
    pub dispatcher: Arc<Dispatcher>,
}

impl AppState {
    /// Wire the default services. Must run inside a Tokio runtime.
    pub fn from_config(configuration: &Configuration) -> Result<Self, ServerError> {
        let server = &configuration.server;
        let notifications = &configuration.notifications;

        let settings = Settings {
            cookie_name: server.cookie_name.clone(),
            session_ttl_seconds: server.session_ttl_seconds,
            allowed_origin: server.allowed_origin.clone(),
            classroom: configuration.classroom.clone(),
            cron_secret: notifications
                .cron_secret
                .as_ref()
                .map(|s| SecretString::from(s.expose_secret())),
            secure_cookies: configuration.oauth.redirect_uri.starts_with("https://"),
        };

        if settings.cron_secret.is_none() {
            tracing::warn!("No cron secret configured, cron endpoints will reject every request");
        }

        let dispatcher = NotificationDispatcher::new(
            ResendClient::new(notifications.email.as_ref()),
            TwilioClient::new(notifications.whatsapp.as_ref()),
        );

        Ok(Self {
            settings: Arc::new(settings),
            session_store: Arc::new(SessionStore::new(server.session_ttl_seconds)),
            oauth_client: Arc::new(OAuthClient::new(&configuration.oauth)?),
            roles: Arc::new(AllowlistRoleProvider::from_config(&configuration.roles)),
            attendance: Arc::new(InMemoryAttendanceStore::new()),
            dispatcher: Arc::new(dispatcher),
        })
    }
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route(
            "/attendance",
            get(handlers::list_attendance)
                .post(handlers::record_attendance)
                .put(handlers::update_attendance)
                .delete(handlers::delete_attendance),
        )
        .route(
            "/calendar/events",
            get(handlers::list_events).post(handlers::create_event),
        )
        .route("/classroom/courses", get(handlers::list_courses))
        .route(
            "/classroom/courses/{course_id}/courseWork",
            get(handlers::list_course_work),
        )
        .route(
            "/classroom/courses/{course_id}/students",
            get(handlers::list_students),
        )
        .route(
            "/classroom/courses/{course_id}/courseWork/{work_id}/studentSubmissions",
            get(handlers::list_submissions),
        )
        .route("/metrics", get(handlers::metrics))
        .route("/metrics/coordinator", get(handlers::coordinator_metrics))
        .route("/notifications/send", post(handlers::send_notifications))
        .route("/notifications/auto", post(handlers::auto_notifications))
        .route("/notifications/trigger", post(handlers::trigger_notifications))
        .route(
            "/notifications/detect-new",
            get(handlers::detect_new_get).post(handlers::detect_new_post),
        )
        .route(
            "/notifications/cron",
            get(handlers::cron_run).post(handlers::cron_manual),
        );

    let mut app = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/auth/login", get(handlers::login))
        .route("/auth/callback", get(handlers::oauth_callback))
        .route("/auth/session", get(handlers::current_session))
        .route("/auth/refresh", post(handlers::refresh_tokens))
        .route("/auth/logout", post(handlers::logout))
        .nest("/api", api)
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            REQUEST_TIMEOUT,
        ))
        .layer(TraceLayer::new_for_http());

    if let Some(origin) = state.settings.allowed_origin.as_deref() {
        match origin.parse::<HeaderValue>() {
            Ok(origin) => {
                app = app.layer(
                    CorsLayer::new()
                        .allow_origin(origin)
                        .allow_credentials(true)
                        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
                        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
                );
            }
            Err(e) => tracing::warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin"),
        }
    }

    app.with_state(state)
}
