use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Staff roles recognized by the back office.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StaffRole {
    Admin,
    Receptionist,
}

impl StaffRole {
    pub const fn label(self) -> &'static str {
        match self {
            StaffRole::Admin => "admin",
            StaffRole::Receptionist => "receptionist",
        }
    }
}

/// Credentials attached to every staff request.
///
/// Created on login, checked against the clock before each use, and cleared
/// on logout. Holding expiry alongside the token keeps the check client-side
/// instead of relying on ambient browser storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub role: StaffRole,
}

impl AuthContext {
    pub fn new(token: impl Into<String>, expires_at: DateTime<Utc>, role: StaffRole) -> Self {
        Self {
            token: token.into(),
            expires_at,
            role,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Render the `Authorization` header value, refusing expired sessions.
    pub fn bearer(&self, now: DateTime<Utc>) -> Result<String, AuthError> {
        if self.is_expired(now) {
            return Err(AuthError::SessionExpired {
                expired_at: self.expires_at,
            });
        }
        Ok(format!("Bearer {}", self.token))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("session expired at {expired_at}; log in again")]
    SessionExpired { expired_at: DateTime<Utc> },
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn context(offset_minutes: i64) -> AuthContext {
        AuthContext::new(
            "token-123",
            Utc::now() + Duration::minutes(offset_minutes),
            StaffRole::Admin,
        )
    }

    #[test]
    fn live_session_produces_bearer_header() {
        let ctx = context(30);
        let header = ctx.bearer(Utc::now()).expect("session is live");
        assert_eq!(header, "Bearer token-123");
    }

    #[test]
    fn expired_session_is_refused() {
        let ctx = context(-5);
        match ctx.bearer(Utc::now()) {
            Err(AuthError::SessionExpired { .. }) => {}
            other => panic!("expected expired session error, got {other:?}"),
        }
    }
}
