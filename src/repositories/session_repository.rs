use std::{collections::HashMap, sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    errors::{AppError, AppResult},
    models::domain::QuizSession,
};

#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn find_by_id(&self, id: &Uuid) -> AppResult<Option<QuizSession>>;
    async fn create(&self, session: QuizSession) -> AppResult<QuizSession>;
    async fn update(&self, session: QuizSession) -> AppResult<QuizSession>;
    async fn delete(&self, id: &Uuid) -> AppResult<()>;
    async fn count(&self) -> AppResult<usize>;
    /// Drops sessions idle for longer than the store's time-to-live and
    /// returns how many were removed.
    async fn purge_expired(&self) -> AppResult<usize>;
}

/// Process-local session store. Sessions do not survive a restart. With a
/// time-to-live set, a session untouched for longer than it is treated as
/// gone and removed on the next write or sweep.
#[derive(Default)]
pub struct InMemorySessionRepository {
    sessions: Arc<RwLock<HashMap<Uuid, QuizSession>>>,
    ttl: Option<chrono::Duration>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(ttl: Option<Duration>) -> Self {
        Self {
            sessions: Arc::default(),
            ttl: ttl.and_then(|ttl| chrono::Duration::from_std(ttl).ok()),
        }
    }

    fn is_expired(&self, session: &QuizSession, now: DateTime<Utc>) -> bool {
        self.ttl
            .map(|ttl| now - session.modified_at > ttl)
            .unwrap_or(false)
    }

    fn evict_expired(&self, sessions: &mut HashMap<Uuid, QuizSession>) -> usize {
        let now = Utc::now();
        let before = sessions.len();
        sessions.retain(|_, session| !self.is_expired(session, now));
        before - sessions.len()
    }
}

/// Periodically purges idle sessions; runs until the process exits.
pub async fn run_expiry_sweep(repository: Arc<dyn SessionRepository>, period: Duration) {
    let mut interval = tokio::time::interval(period);
    loop {
        interval.tick().await;
        match repository.purge_expired().await {
            Ok(0) => {}
            Ok(removed) => log::info!("Expired {} idle session(s)", removed),
            Err(e) => log::error!("Session expiry sweep failed: {}", e),
        }
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn find_by_id(&self, id: &Uuid) -> AppResult<Option<QuizSession>> {
        let sessions = self.sessions.read().await;
        let now = Utc::now();
        Ok(sessions
            .get(id)
            .filter(|session| !self.is_expired(session, now))
            .cloned())
    }

    async fn create(&self, session: QuizSession) -> AppResult<QuizSession> {
        let mut sessions = self.sessions.write().await;
        self.evict_expired(&mut sessions);
        if sessions.contains_key(&session.id) {
            return Err(AppError::InvalidState(format!(
                "Session with id '{}' already exists",
                session.id
            )));
        }

        sessions.insert(session.id, session.clone());
        log::info!("Created session {} ({} active)", session.id, sessions.len());
        Ok(session)
    }

    async fn update(&self, session: QuizSession) -> AppResult<QuizSession> {
        let mut sessions = self.sessions.write().await;
        if !sessions.contains_key(&session.id) {
            return Err(AppError::NotFound(format!(
                "Session with id '{}' not found",
                session.id
            )));
        }

        sessions.insert(session.id, session.clone());
        Ok(session)
    }

    async fn delete(&self, id: &Uuid) -> AppResult<()> {
        let mut sessions = self.sessions.write().await;
        if sessions.remove(id).is_none() {
            return Err(AppError::NotFound(format!(
                "Session with id '{}' not found",
                id
            )));
        }

        log::info!("Deleted session {} ({} active)", id, sessions.len());
        Ok(())
    }

    async fn count(&self) -> AppResult<usize> {
        let sessions = self.sessions.read().await;
        let now = Utc::now();
        Ok(sessions
            .values()
            .filter(|session| !self.is_expired(session, now))
            .count())
    }

    async fn purge_expired(&self) -> AppResult<usize> {
        let mut sessions = self.sessions.write().await;
        Ok(self.evict_expired(&mut sessions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::fixtures::sample_questions;

    #[actix_rt::test]
    async fn create_then_find_returns_independent_copy() {
        let repository = InMemorySessionRepository::new();
        let session = repository.create(QuizSession::new()).await.unwrap();

        let mut found = repository.find_by_id(&session.id).await.unwrap().unwrap();
        found.load("Space", sample_questions(3)).unwrap();

        let stored = repository.find_by_id(&session.id).await.unwrap().unwrap();
        assert!(stored.questions().is_empty());
    }

    #[actix_rt::test]
    async fn update_persists_changes() {
        let repository = InMemorySessionRepository::new();
        let mut session = repository.create(QuizSession::new()).await.unwrap();

        session.load("Space", sample_questions(3)).unwrap();
        repository.update(session.clone()).await.unwrap();

        let stored = repository.find_by_id(&session.id).await.unwrap().unwrap();
        assert_eq!(stored.questions().len(), 3);
    }

    #[actix_rt::test]
    async fn duplicate_create_and_unknown_update_fail() {
        let repository = InMemorySessionRepository::new();
        let session = repository.create(QuizSession::new()).await.unwrap();

        assert!(matches!(
            repository.create(session).await,
            Err(AppError::InvalidState(_))
        ));
        assert!(matches!(
            repository.update(QuizSession::new()).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[actix_rt::test]
    async fn delete_removes_session() {
        let repository = InMemorySessionRepository::new();
        let session = repository.create(QuizSession::new()).await.unwrap();
        assert_eq!(repository.count().await.unwrap(), 1);

        repository.delete(&session.id).await.unwrap();

        assert!(repository.find_by_id(&session.id).await.unwrap().is_none());
        assert!(matches!(
            repository.delete(&session.id).await,
            Err(AppError::NotFound(_))
        ));
        assert_eq!(repository.count().await.unwrap(), 0);
    }

    /// Stores `session` as last touched `idle` ago.
    async fn backdate(repository: &InMemorySessionRepository, mut session: QuizSession, idle: chrono::Duration) {
        session.modified_at = Utc::now() - idle;
        repository.update(session).await.unwrap();
    }

    #[actix_rt::test]
    async fn idle_session_past_ttl_is_gone() {
        let repository = InMemorySessionRepository::with_ttl(Some(Duration::from_secs(60)));
        let idle = repository.create(QuizSession::new()).await.unwrap();
        let active = repository.create(QuizSession::new()).await.unwrap();
        assert_eq!(repository.count().await.unwrap(), 2);

        backdate(&repository, idle.clone(), chrono::Duration::minutes(5)).await;

        assert!(repository.find_by_id(&idle.id).await.unwrap().is_none());
        assert!(repository.find_by_id(&active.id).await.unwrap().is_some());
        assert_eq!(repository.count().await.unwrap(), 1);

        assert_eq!(repository.purge_expired().await.unwrap(), 1);
        assert!(matches!(
            repository.delete(&idle.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[actix_rt::test]
    async fn create_evicts_idle_sessions() {
        let repository = InMemorySessionRepository::with_ttl(Some(Duration::from_secs(60)));
        let idle = repository.create(QuizSession::new()).await.unwrap();
        backdate(&repository, idle, chrono::Duration::hours(1)).await;

        repository.create(QuizSession::new()).await.unwrap();

        assert_eq!(repository.sessions.read().await.len(), 1);
    }

    #[actix_rt::test]
    async fn without_ttl_sessions_never_expire() {
        let repository = InMemorySessionRepository::new();
        let session = repository.create(QuizSession::new()).await.unwrap();
        backdate(&repository, session.clone(), chrono::Duration::days(30)).await;

        assert!(repository.find_by_id(&session.id).await.unwrap().is_some());
        assert_eq!(repository.purge_expired().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn sweep_purges_on_each_tick() {
        let repository = Arc::new(InMemorySessionRepository::with_ttl(Some(Duration::from_secs(60))));
        let session = repository.create(QuizSession::new()).await.unwrap();
        backdate(&repository, session, chrono::Duration::minutes(10)).await;

        let sweep = tokio::spawn(run_expiry_sweep(repository.clone(), Duration::from_secs(30)));
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(repository.sessions.read().await.len(), 0);
        sweep.abort();
    }

    #[actix_rt::test]
    async fn sessions_are_isolated() {
        let repository = InMemorySessionRepository::new();
        let mut first = repository.create(QuizSession::new()).await.unwrap();
        let second = repository.create(QuizSession::new()).await.unwrap();

        first.load("History", sample_questions(3)).unwrap();
        repository.update(first).await.unwrap();

        let second = repository.find_by_id(&second.id).await.unwrap().unwrap();
        assert!(second.topic().is_none());
    }
}
