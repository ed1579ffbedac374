//! Genres and languages

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::error::AppResult;

use super::TaxonomyRepository;

#[derive(Clone)]
pub struct PgTaxonomyRepository {
    pool: Pool<Postgres>,
}

impl PgTaxonomyRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaxonomyRepository for PgTaxonomyRepository {
    async fn count_genres(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM genres")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn genres_exist(&self, ids: &[i32]) -> AppResult<bool> {
        if ids.is_empty() {
            return Ok(true);
        }
        let found: i64 = sqlx::query_scalar("SELECT COUNT(DISTINCT id) FROM genres WHERE id = ANY($1)")
            .bind(ids)
            .fetch_one(&self.pool)
            .await?;

        let mut wanted = ids.to_vec();
        wanted.sort_unstable();
        wanted.dedup();
        Ok(found == wanted.len() as i64)
    }

    async fn language_exists(&self, id: i32) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM languages WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }
}
