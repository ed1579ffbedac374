//! Home page counts

use std::sync::Arc;

use serde::Serialize;
use utoipa::ToSchema;

use crate::{error::AppResult, models::LoanStatus, repository::Repository};

use super::session::SessionStore;

/// Titles containing this word are counted separately on the home page
pub const TITLE_KEYWORD: &str = "abație";

/// Catalog counts shown on the home page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct DashboardCounts {
    pub num_books: i64,
    pub num_instances: i64,
    /// Copies with status available
    pub num_instances_available: i64,
    pub num_authors: i64,
    pub num_genres: i64,
    /// Books whose title contains the keyword, ignoring case
    pub num_word: i64,
    /// Visits to the home page in this session before the current one
    pub num_visits: i64,
}

#[derive(Clone)]
pub struct DashboardService {
    repository: Repository,
    sessions: Arc<dyn SessionStore>,
}

impl DashboardService {
    pub fn new(repository: Repository, sessions: Arc<dyn SessionStore>) -> Self {
        Self {
            repository,
            sessions,
        }
    }

    /// Compute the counts and record this visit against session `sid`
    pub async fn summary(&self, sid: &str) -> AppResult<DashboardCounts> {
        let repo = &self.repository;
        let (
            num_books,
            num_instances,
            num_instances_available,
            num_authors,
            num_genres,
            num_word,
            visits,
        ) = tokio::try_join!(
            repo.books.count(),
            repo.instances.count(),
            repo.instances.count_by_status(LoanStatus::Available),
            repo.authors.count(),
            repo.taxonomy.count_genres(),
            repo.books.count_title_containing(TITLE_KEYWORD),
            self.sessions.incr_visits(sid),
        )?;

        Ok(DashboardCounts {
            num_books,
            num_instances,
            num_instances_available,
            num_authors,
            num_genres,
            num_word,
            num_visits: visits - 1,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicI64, Ordering};

    use super::*;
    use crate::{services::session::MockSessionStore, test_util::MockRepository};

    fn repository() -> Repository {
        let mut repo = MockRepository::default();
        repo.books.expect_count().returning(|| Ok(12));
        repo.books
            .expect_count_title_containing()
            .withf(|needle| needle == TITLE_KEYWORD)
            .returning(|_| Ok(1));
        repo.instances.expect_count().returning(|| Ok(30));
        repo.instances
            .expect_count_by_status()
            .withf(|status| *status == LoanStatus::Available)
            .returning(|_| Ok(9));
        repo.authors.expect_count().returning(|| Ok(5));
        repo.taxonomy.expect_count_genres().returning(|| Ok(4));
        repo.build()
    }

    #[tokio::test]
    async fn counts_are_collected() {
        let mut sessions = MockSessionStore::new();
        sessions.expect_incr_visits().returning(|_| Ok(1));

        let service = DashboardService::new(repository(), Arc::new(sessions));
        let counts = service.summary("sid").await.unwrap();
        assert_eq!(
            counts,
            DashboardCounts {
                num_books: 12,
                num_instances: 30,
                num_instances_available: 9,
                num_authors: 5,
                num_genres: 4,
                num_word: 1,
                num_visits: 0,
            }
        );
    }

    #[tokio::test]
    async fn visits_count_up_from_zero_within_a_session() {
        let counter = Arc::new(AtomicI64::new(0));
        let mut sessions = MockSessionStore::new();
        let c = counter.clone();
        sessions
            .expect_incr_visits()
            .withf(|sid| sid == "abc")
            .returning(move |_| Ok(c.fetch_add(1, Ordering::SeqCst) + 1));

        let service = DashboardService::new(repository(), Arc::new(sessions));
        let mut seen = Vec::new();
        for _ in 0..4 {
            seen.push(service.summary("abc").await.unwrap().num_visits);
        }
        assert_eq!(seen, vec![0, 1, 2, 3]);
    }
}
