use secrecy::SecretString;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Configuration {
    pub server: ServerConfiguration,
    pub oauth: OAuthConfiguration,
    #[serde(default)]
    pub roles: RolesConfiguration,
    #[serde(default)]
    pub classroom: ClassroomConfiguration,
    #[serde(default)]
    pub notifications: NotificationsConfiguration,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfiguration {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_session_ttl")]
    pub session_ttl_seconds: u64,

    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Browser origin allowed to call the API with credentials.
    pub allowed_origin: Option<String>,
}

#[derive(Debug, Default, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Deserialize)]
pub struct OAuthConfiguration {
    pub client_id: String,
    pub client_secret: SecretString,
    pub redirect_uri: String,
}

/// Comma separated allowlists, one per role.
#[derive(Debug, Default, Deserialize, Clone)]
pub struct RolesConfiguration {
    #[serde(default)]
    pub coordinator_emails: String,
    #[serde(default)]
    pub professor_emails: String,
    #[serde(default)]
    pub student_emails: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ClassroomConfiguration {
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    #[serde(default = "default_fetch_concurrency")]
    pub fetch_concurrency: usize,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,

    #[serde(default = "default_time_zone")]
    pub calendar_time_zone: String,

    /// Overridable for emulators and tests.
    #[serde(default = "default_classroom_base_url")]
    pub classroom_base_url: String,

    #[serde(default = "default_google_base_url")]
    pub google_base_url: String,
}

impl Default for ClassroomConfiguration {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            fetch_concurrency: default_fetch_concurrency(),
            request_timeout_seconds: default_request_timeout(),
            calendar_time_zone: default_time_zone(),
            classroom_base_url: default_classroom_base_url(),
            google_base_url: default_google_base_url(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct NotificationsConfiguration {
    /// Shared secret expected as `Authorization: Bearer <secret>` on cron routes.
    pub cron_secret: Option<SecretString>,
    pub email: Option<EmailConfiguration>,
    pub whatsapp: Option<WhatsAppConfiguration>,
}

#[derive(Debug, Deserialize)]
pub struct EmailConfiguration {
    pub api_key: SecretString,

    #[serde(default = "default_from_address")]
    pub from_address: String,

    #[serde(default = "default_resend_url")]
    pub base_url: String,
}

#[derive(Debug, Deserialize)]
pub struct WhatsAppConfiguration {
    pub account_sid: String,
    pub auth_token: SecretString,

    #[serde(default = "default_whatsapp_from")]
    pub from_number: String,

    #[serde(default = "default_twilio_url")]
    pub base_url: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_session_ttl() -> u64 {
    86_400
}

fn default_cookie_name() -> String {
    "aulux_session".to_string()
}

fn default_page_size() -> u32 {
    50
}

fn default_fetch_concurrency() -> usize {
    4
}

fn default_request_timeout() -> u64 {
    15
}

fn default_time_zone() -> String {
    "America/Argentina/Buenos_Aires".to_string()
}

fn default_classroom_base_url() -> String {
    "https://classroom.googleapis.com/v1".to_string()
}

fn default_google_base_url() -> String {
    "https://www.googleapis.com".to_string()
}

fn default_from_address() -> String {
    "noreply@resend.dev".to_string()
}

fn default_resend_url() -> String {
    "https://api.resend.com".to_string()
}

fn default_whatsapp_from() -> String {
    "whatsapp:+14155238886".to_string()
}

fn default_twilio_url() -> String {
    "https://api.twilio.com".to_string()
}

impl Configuration {
    pub fn new() -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        if std::path::Path::new("config.toml").exists() {
            builder = builder.add_source(config::File::with_name("config"));
        }

        builder = builder.add_source(config::Environment::with_prefix("AULUX").separator("__"));

        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{Config, File, FileFormat};
    use secrecy::ExposeSecret;

    fn parse(toml: &str) -> Configuration {
        Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn minimal_config_gets_defaults() {
        let configuration = parse(
            r#"
            [server]
            [oauth]
            client_id = "id"
            client_secret = "secret"
            redirect_uri = "http://localhost:8080/auth/callback"
            "#,
        );

        assert_eq!(configuration.server.port, 8080);
        assert_eq!(configuration.server.cookie_name, "aulux_session");
        assert_eq!(configuration.server.log_format, LogFormat::Pretty);
        assert_eq!(configuration.classroom.fetch_concurrency, 4);
        assert_eq!(
            configuration.classroom.calendar_time_zone,
            "America/Argentina/Buenos_Aires"
        );
        assert_eq!(
            configuration.classroom.classroom_base_url,
            "https://classroom.googleapis.com/v1"
        );
        assert!(configuration.roles.coordinator_emails.is_empty());
        assert!(configuration.notifications.cron_secret.is_none());
        assert_eq!(configuration.oauth.client_secret.expose_secret(), "secret");
    }

    #[test]
    fn provider_sections_fill_defaults() {
        let configuration = parse(
            r#"
            [server]
            log_format = "json"
            [oauth]
            client_id = "id"
            client_secret = "secret"
            redirect_uri = "http://localhost:8080/auth/callback"
            [notifications]
            cron_secret = "tick"
            [notifications.email]
            api_key = "re_123"
            [notifications.whatsapp]
            account_sid = "AC1"
            auth_token = "tok"
            "#,
        );

        assert_eq!(configuration.server.log_format, LogFormat::Json);
        let email = configuration.notifications.email.unwrap();
        assert_eq!(email.from_address, "noreply@resend.dev");
        assert_eq!(email.base_url, "https://api.resend.com");
        let whatsapp = configuration.notifications.whatsapp.unwrap();
        assert_eq!(whatsapp.from_number, "whatsapp:+14155238886");
    }
}
