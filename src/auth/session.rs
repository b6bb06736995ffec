//! Session data for an authenticated operator

use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// An authentication session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(rename = "access_token")]
    pub access_token: String,

    #[serde(rename = "refresh_token")]
    pub refresh_token: String,

    #[serde(rename = "user_id")]
    pub user_id: String,

    #[serde(rename = "token_type")]
    pub token_type: String,

    /// Lifetime in seconds, as issued
    #[serde(rename = "expires_in")]
    pub expires_in: i64,

    /// Absolute expiry timestamp (unix seconds)
    #[serde(rename = "expires_at")]
    pub expires_at: Option<i64>,
}

impl Session {
    /// Create a new session expiring `expires_in` seconds from now
    pub fn new(
        access_token: String,
        refresh_token: String,
        user_id: String,
        expires_in: i64,
    ) -> Self {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::from_secs(0))
            .as_secs() as i64;

        Self {
            access_token,
            refresh_token,
            user_id,
            token_type: "bearer".to_string(),
            expires_in,
            expires_at: Some(now + expires_in),
        }
    }

    /// Check if the session has expired
    pub fn is_expired(&self) -> bool {
        if let Some(expires_at) = self.expires_at {
            let now = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or(Duration::from_secs(0))
                .as_secs() as i64;

            now >= expires_at
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_session_is_not_expired() {
        let session = Session::new("at".into(), "rt".into(), "uid".into(), 3600);
        assert!(!session.is_expired());
    }

    #[test]
    fn past_expiry_is_expired() {
        let mut session = Session::new("at".into(), "rt".into(), "uid".into(), 3600);
        session.expires_at = Some(0);
        assert!(session.is_expired());
    }
}
