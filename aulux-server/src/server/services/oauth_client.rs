use chrono::Utc;
use oauth2::{
    basic::BasicClient, AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, HttpRequest,
    HttpResponse, RedirectUrl, RefreshToken, Scope, TokenResponse, TokenUrl,
};
use rand::Rng;
use secrecy::{ExposeSecret, SecretString};

use crate::common::TokenPair;
use crate::server::config::OAuthConfiguration;
use crate::server::error::ServerError;

// Simple async HTTP client for OAuth2
async fn http_client(request: HttpRequest) -> Result<HttpResponse, reqwest::Error> {
    let client = reqwest::Client::new();
    let mut builder = client
        .request(request.method().clone(), request.uri().to_string())
        .body(request.body().clone());

    for (name, value) in request.headers() {
        builder = builder.header(name.as_str(), value.as_bytes());
    }

    let response = builder.send().await?;
    let status = response.status();
    let body = response.bytes().await?.to_vec();

    let mut http_response = HttpResponse::new(body);
    *http_response.status_mut() = status;

    Ok(http_response)
}

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

const SCOPES: &[&str] = &[
    "openid",
    "email",
    "profile",
    "https://www.googleapis.com/auth/classroom.courses.readonly",
    "https://www.googleapis.com/auth/classroom.rosters.readonly",
    "https://www.googleapis.com/auth/classroom.coursework.students.readonly",
    "https://www.googleapis.com/auth/classroom.student-submissions.students.readonly",
    "https://www.googleapis.com/auth/calendar.readonly",
    "https://www.googleapis.com/auth/calendar.events",
];

pub struct OAuthClient {
    client_id: String,
    client_secret: SecretString,
    auth_url: AuthUrl,
    token_url: TokenUrl,
    redirect_url: RedirectUrl,
}

impl OAuthClient {
    pub fn new(config: &OAuthConfiguration) -> Result<Self, ServerError> {
        let auth_url = AuthUrl::new(GOOGLE_AUTH_URL.to_string())
            .map_err(|e| ServerError::Configuration(format!("Invalid auth URL: {}", e)))?;

        let token_url = TokenUrl::new(GOOGLE_TOKEN_URL.to_string())
            .map_err(|e| ServerError::Configuration(format!("Invalid token URL: {}", e)))?;

        let redirect_url = RedirectUrl::new(config.redirect_uri.clone())
            .map_err(|e| ServerError::Configuration(format!("Invalid redirect URI: {}", e)))?;

        Ok(Self {
            client_id: config.client_id.clone(),
            client_secret: SecretString::from(config.client_secret.expose_secret()),
            auth_url,
            token_url,
            redirect_url,
        })
    }

    fn client_secret(&self) -> ClientSecret {
        ClientSecret::new(self.client_secret.expose_secret().to_string())
    }

    /// Build the Google consent URL carrying `state` for CSRF protection.
    ///
    /// Offline access with forced consent, so the first exchange yields a
    /// refresh token.
    pub fn build_authorization_url(&self, state: &str) -> Result<String, ServerError> {
        let csrf_token = CsrfToken::new(state.to_string());
        let (auth_url, _) = BasicClient::new(ClientId::new(self.client_id.clone()))
            .set_client_secret(self.client_secret())
            .set_auth_uri(self.auth_url.clone())
            .set_token_uri(self.token_url.clone())
            .set_redirect_uri(self.redirect_url.clone())
            .authorize_url(|| csrf_token)
            .add_scopes(SCOPES.iter().map(|s| Scope::new(s.to_string())))
            .add_extra_param("access_type", "offline")
            .add_extra_param("prompt", "consent")
            .add_extra_param("include_granted_scopes", "true")
            .url();
        Ok(auth_url.to_string())
    }

    /// Exchange authorization code for access and refresh tokens
    pub async fn exchange_code_for_token(&self, code: &str) -> Result<TokenPair, ServerError> {
        let token_result = BasicClient::new(ClientId::new(self.client_id.clone()))
            .set_client_secret(self.client_secret())
            .set_auth_uri(self.auth_url.clone())
            .set_token_uri(self.token_url.clone())
            .set_redirect_uri(self.redirect_url.clone())
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .request_async(&http_client)
            .await?;

        let tokens = token_pair(&token_result)?;

        tracing::debug!(
            "Successfully exchanged code for tokens, expires_at: {}",
            tokens.expires_at
        );

        Ok(tokens)
    }

    /// Refresh an expired access token using a refresh token.
    ///
    /// Google usually omits the refresh token here; callers keep the old one.
    pub async fn refresh_access_token(
        &self,
        refresh_token: &str,
    ) -> Result<TokenPair, ServerError> {
        let token_result = BasicClient::new(ClientId::new(self.client_id.clone()))
            .set_client_secret(self.client_secret())
            .set_auth_uri(self.auth_url.clone())
            .set_token_uri(self.token_url.clone())
            .set_redirect_uri(self.redirect_url.clone())
            .exchange_refresh_token(&RefreshToken::new(refresh_token.to_string()))
            .request_async(&http_client)
            .await?;

        let tokens = token_pair(&token_result)?;

        tracing::debug!("Successfully refreshed tokens, expires_at: {}", tokens.expires_at);

        Ok(tokens)
    }

    /// Generate a random CSRF state token
    pub fn generate_state_token() -> String {
        use base64::Engine;
        let mut rng = rand::rng();
        let random_bytes: Vec<u8> = (0..32).map(|_| rng.random()).collect();
        base64::prelude::BASE64_URL_SAFE_NO_PAD.encode(&random_bytes)
    }
}

fn token_pair(token_result: &impl TokenResponse) -> Result<TokenPair, ServerError> {
    let access_token = token_result.access_token().secret().to_string();
    let refresh_token = token_result
        .refresh_token()
        .map(|token| token.secret().to_string());

    let expires_in = token_result
        .expires_in()
        .ok_or_else(|| ServerError::OAuthError("No expiration time in response".to_string()))?;

    Ok(TokenPair {
        access_token,
        refresh_token,
        expires_at: Utc::now() + expires_in,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> OAuthClient {
        OAuthClient::new(&OAuthConfiguration {
            client_id: "client-id".to_string(),
            client_secret: SecretString::from("client-secret"),
            redirect_uri: "http://localhost:8080/auth/callback".to_string(),
        })
        .unwrap()
    }

    #[test]
    fn authorization_url_requests_offline_classroom_access() {
        let url = client().build_authorization_url("csrf").unwrap();
        assert!(url.starts_with(GOOGLE_AUTH_URL));
        assert!(url.contains("state=csrf"));
        assert!(url.contains("access_type=offline"));
        assert!(url.contains("prompt=consent"));
        assert!(url.contains("classroom.courses.readonly"));
        assert!(url.contains("client_id=client-id"));
    }

    #[test]
    fn rejects_invalid_redirect_uri() {
        let result = OAuthClient::new(&OAuthConfiguration {
            client_id: "id".to_string(),
            client_secret: SecretString::from("secret"),
            redirect_uri: "not a url".to_string(),
        });
        assert!(matches!(result, Err(ServerError::Configuration(_))));
    }

    #[test]
    fn state_tokens_are_url_safe_and_unique() {
        let a = OAuthClient::generate_state_token();
        let b = OAuthClient::generate_state_token();
        assert_ne!(a, b);
        assert!(!a.contains('+') && !a.contains('/') && !a.contains('='));
    }
}
