use chrono::{serde::ts_seconds, DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Access tokens are refreshed this long before they actually expire.
const EXPIRY_BUFFER_MINUTES: i64 = 5;

/// Token pair returned from OAuth flow
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    /// Google only returns a refresh token on the first consent; later
    /// refreshes keep the previous one.
    pub refresh_token: Option<String>,
    #[serde(with = "ts_seconds")]
    pub expires_at: DateTime<Utc>,
}

impl TokenPair {
    pub fn is_expired(&self) -> bool {
        self.expires_at - Duration::minutes(EXPIRY_BUFFER_MINUTES) <= Utc::now()
    }

    /// Carries the previous refresh token over when the new pair lacks one.
    pub fn or_refresh_token(mut self, previous: Option<String>) -> Self {
        if self.refresh_token.is_none() {
            self.refresh_token = previous;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(expires_in: Duration) -> TokenPair {
        TokenPair {
            access_token: "access".to_string(),
            refresh_token: None,
            expires_at: Utc::now() + expires_in,
        }
    }

    #[test]
    fn expiry_includes_buffer() {
        assert!(pair(Duration::minutes(-1)).is_expired());
        assert!(pair(Duration::minutes(4)).is_expired());
        assert!(!pair(Duration::minutes(30)).is_expired());
    }

    #[test]
    fn keeps_previous_refresh_token() {
        let refreshed = pair(Duration::hours(1)).or_refresh_token(Some("old".to_string()));
        assert_eq!(refreshed.refresh_token.as_deref(), Some("old"));

        let mut rotated = pair(Duration::hours(1));
        rotated.refresh_token = Some("new".to_string());
        let rotated = rotated.or_refresh_token(Some("old".to_string()));
        assert_eq!(rotated.refresh_token.as_deref(), Some("new"));
    }
}
