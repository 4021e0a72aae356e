use chrono::{DateTime, Duration, Utc};
use common::helper::error_chain_fmt;
use serde::Serialize;
use std::{collections::HashMap, sync::Mutex};
use tracing::{debug, info};
use uuid::Uuid;

/// Opaque token issued by the server to identify a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SessionToken(Uuid);

impl SessionToken {
    pub fn parse(s: &str) -> Result<Self, SessionRepositoryError> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| SessionRepositoryError::InvalidToken(s.to_string()))
    }
}

impl std::fmt::Display for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub token: SessionToken,
    pub created_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// In-memory registry of the sessions of the visualization clients.
///
/// A session expires `ttl` after its last use. Expired sessions are evicted
/// whenever a session is created or looked up.
pub struct SessionMemoryRepository {
    sessions: Mutex<HashMap<SessionToken, Session>>,
    ttl: Duration,
}

impl SessionMemoryRepository {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    #[tracing::instrument(name = "Creating session", skip(self))]
    pub fn create(&self, now: DateTime<Utc>) -> Result<Session, SessionRepositoryError> {
        let mut sessions = self.lock()?;
        Self::evict(&mut sessions, now);

        let session = Session {
            token: SessionToken(Uuid::new_v4()),
            created_at: now,
            last_seen_at: now,
            expires_at: now + self.ttl,
        };
        sessions.insert(session.token, session.clone());

        info!(token = %session.token, active_sessions = sessions.len(), "Session created");
        Ok(session)
    }

    /// Finds a live session and extends its lifetime
    #[tracing::instrument(name = "Touching session", skip(self))]
    pub fn touch(
        &self,
        token: &SessionToken,
        now: DateTime<Utc>,
    ) -> Result<Session, SessionRepositoryError> {
        let mut sessions = self.lock()?;
        Self::evict(&mut sessions, now);

        let session = sessions
            .get_mut(token)
            .ok_or_else(|| SessionRepositoryError::SessionNotFound(token.to_string()))?;
        session.last_seen_at = now;
        session.expires_at = now + self.ttl;

        Ok(session.clone())
    }

    /// Removes a session, returns false if it did not exist
    #[tracing::instrument(name = "Removing session", skip(self))]
    pub fn remove(&self, token: &SessionToken) -> Result<bool, SessionRepositoryError> {
        Ok(self.lock()?.remove(token).is_some())
    }

    /// Returns the number of evicted sessions
    pub fn evict_expired(&self, now: DateTime<Utc>) -> Result<usize, SessionRepositoryError> {
        Ok(Self::evict(&mut *self.lock()?, now))
    }

    pub fn len(&self) -> Result<usize, SessionRepositoryError> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, SessionRepositoryError> {
        Ok(self.len()? == 0)
    }

    fn evict(sessions: &mut HashMap<SessionToken, Session>, now: DateTime<Utc>) -> usize {
        let before = sessions.len();
        sessions.retain(|_, session| session.expires_at > now);

        let evicted = before - sessions.len();
        if evicted > 0 {
            debug!(evicted, "Evicted expired sessions");
        }
        evicted
    }

    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<SessionToken, Session>>, SessionRepositoryError>
    {
        self.sessions
            .lock()
            .map_err(|e| SessionRepositoryError::Poisoned(e.to_string()))
    }
}

#[derive(thiserror::Error)]
pub enum SessionRepositoryError {
    #[error("Invalid session token: {0}")]
    InvalidToken(String),
    #[error("Session not found: {0}")]
    SessionNotFound(String),
    #[error("Session registry is unusable: {0}")]
    Poisoned(String),
}

impl std::fmt::Debug for SessionRepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use claims::{assert_err, assert_ok};

    fn repository() -> SessionMemoryRepository {
        SessionMemoryRepository::new(Duration::minutes(30))
    }

    #[test]
    fn a_created_session_can_be_found() {
        let repository = repository();
        let now = Utc::now();

        let session = repository.create(now).unwrap();
        let found = assert_ok!(repository.touch(&session.token, now + Duration::minutes(5)));

        assert_eq!(found.token, session.token);
        assert_eq!(found.expires_at, now + Duration::minutes(35));
    }

    #[test]
    fn each_session_gets_its_own_token() {
        let repository = repository();
        let now = Utc::now();

        let first = repository.create(now).unwrap();
        let second = repository.create(now).unwrap();

        assert_ne!(first.token, second.token);
        assert_eq!(repository.len().unwrap(), 2);
    }

    #[test]
    fn an_expired_session_is_not_found() {
        let repository = repository();
        let now = Utc::now();
        let session = repository.create(now).unwrap();

        let result = repository.touch(&session.token, now + Duration::minutes(31));

        assert!(matches!(
            assert_err!(result),
            SessionRepositoryError::SessionNotFound(_)
        ));
        assert!(repository.is_empty().unwrap());
    }

    #[test]
    fn using_a_session_extends_its_lifetime() {
        let repository = repository();
        let now = Utc::now();
        let session = repository.create(now).unwrap();

        repository
            .touch(&session.token, now + Duration::minutes(20))
            .unwrap();

        assert_ok!(repository.touch(&session.token, now + Duration::minutes(45)));
    }

    #[test]
    fn a_removed_session_is_not_found() {
        let repository = repository();
        let now = Utc::now();
        let session = repository.create(now).unwrap();

        assert!(repository.remove(&session.token).unwrap());
        assert!(!repository.remove(&session.token).unwrap());
        assert_err!(repository.touch(&session.token, now));
    }

    #[test]
    fn only_expired_sessions_are_evicted() {
        let repository = repository();
        let now = Utc::now();
        repository.create(now).unwrap();
        repository.create(now + Duration::minutes(20)).unwrap();

        let evicted = repository
            .evict_expired(now + Duration::minutes(40))
            .unwrap();

        assert_eq!(evicted, 1);
        assert_eq!(repository.len().unwrap(), 1);
    }

    #[test]
    fn tokens_must_be_uuids() {
        assert_err!(SessionToken::parse("1234"));
        assert_ok!(SessionToken::parse(&Uuid::new_v4().to_string()));
    }
}
