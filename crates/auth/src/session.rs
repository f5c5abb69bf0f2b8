use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use sitegate_core::UserId;

use crate::ProviderError;

/// Claims of an authenticated session (transport-agnostic).
///
/// Decoding and signature verification of whatever token carries these
/// claims happen outside this crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject / authenticated user.
    pub sub: UserId,

    /// Issued-at timestamp.
    pub issued_at: DateTime<Utc>,

    /// Expiration timestamp.
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("session has expired")]
    Expired,

    #[error("session not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid session time window (expires_at <= issued_at)")]
    InvalidTimeWindow,

    #[error("session validity window out of representable range")]
    OutOfRange,
}

/// Deterministically validate session claims at `now`.
///
/// `clock_skew` widens both ends of the validity window. A skew that pushes
/// `now` outside the representable date range is rejected.
pub fn validate_session(
    claims: &SessionClaims,
    now: DateTime<Utc>,
    clock_skew: Duration,
) -> Result<(), SessionError> {
    if claims.expires_at <= claims.issued_at {
        return Err(SessionError::InvalidTimeWindow);
    }
    let latest = now.checked_add_signed(clock_skew).ok_or(SessionError::OutOfRange)?;
    let earliest = now.checked_sub_signed(clock_skew).ok_or(SessionError::OutOfRange)?;
    if latest < claims.issued_at {
        return Err(SessionError::NotYetValid);
    }
    if earliest >= claims.expires_at {
        return Err(SessionError::Expired);
    }
    Ok(())
}

/// Resolves an opaque session token to its claims.
///
/// `Ok(None)` means the token is unknown (unauthenticated), not a failure.
#[async_trait]
pub trait SessionResolver: Send + Sync {
    async fn resolve(&self, token: &str) -> Result<Option<SessionClaims>, ProviderError>;
}

#[async_trait]
impl<T> SessionResolver for std::sync::Arc<T>
where
    T: SessionResolver + ?Sized,
{
    async fn resolve(&self, token: &str) -> Result<Option<SessionClaims>, ProviderError> {
        (**self).resolve(token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(issued_offset_secs: i64, ttl_secs: i64) -> (SessionClaims, DateTime<Utc>) {
        let now = Utc::now();
        let issued_at = now + Duration::seconds(issued_offset_secs);
        (
            SessionClaims {
                sub: UserId::new("u1"),
                issued_at,
                expires_at: issued_at + Duration::seconds(ttl_secs),
            },
            now,
        )
    }

    #[test]
    fn live_session_is_valid() {
        let (c, now) = claims(-10, 3600);
        assert_eq!(validate_session(&c, now, Duration::zero()), Ok(()));
    }

    #[test]
    fn expired_session_is_rejected() {
        let (c, now) = claims(-7200, 3600);
        assert_eq!(validate_session(&c, now, Duration::zero()), Err(SessionError::Expired));
    }

    #[test]
    fn future_session_is_rejected_unless_within_skew() {
        let (c, now) = claims(30, 3600);
        assert_eq!(validate_session(&c, now, Duration::zero()), Err(SessionError::NotYetValid));
        assert_eq!(validate_session(&c, now, Duration::seconds(60)), Ok(()));
    }

    #[test]
    fn recently_expired_session_is_accepted_within_skew() {
        let (c, now) = claims(-3610, 3600);
        assert_eq!(validate_session(&c, now, Duration::zero()), Err(SessionError::Expired));
        assert_eq!(validate_session(&c, now, Duration::seconds(60)), Ok(()));
        assert_eq!(validate_session(&c, now, Duration::seconds(5)), Err(SessionError::Expired));
    }

    #[test]
    fn skew_beyond_date_range_is_rejected() {
        let (c, now) = claims(-10, 3600);
        let huge = Duration::days(365 * 1_000_000);
        assert_eq!(validate_session(&c, now, huge), Err(SessionError::OutOfRange));
    }

    #[test]
    fn inverted_window_is_rejected() {
        let (c, now) = claims(0, -1);
        assert_eq!(validate_session(&c, now, Duration::zero()), Err(SessionError::InvalidTimeWindow));
    }
}
