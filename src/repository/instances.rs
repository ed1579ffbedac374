//! Book instances repository

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{BookInstance, LoanStatus},
};

use super::InstancesRepository;

/// Instance columns joined with the book title and borrower username
pub(crate) const INSTANCE_SELECT: &str = r#"
    SELECT bi.id, bi.book_id, b.title AS book_title, bi.imprint, bi.due_back,
           bi.status, bi.borrower_id, u.username AS borrower_username,
           COALESCE(bi.due_back < CURRENT_DATE, FALSE) AS is_overdue
    FROM book_instances bi
    JOIN books b ON b.id = bi.book_id
    LEFT JOIN users u ON u.id = bi.borrower_id
"#;

#[derive(Clone)]
pub struct PgInstancesRepository {
    pool: Pool<Postgres>,
}

impl PgInstancesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InstancesRepository for PgInstancesRepository {
    async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM book_instances")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn count_by_status(&self, status: LoanStatus) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM book_instances WHERE status = $1")
            .bind(status)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn count_for_book(&self, book_id: i32) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM book_instances WHERE book_id = $1")
                .bind(book_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<BookInstance> {
        let query = format!("{} WHERE bi.id = $1", INSTANCE_SELECT);
        sqlx::query_as::<_, BookInstance>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book instance {} not found", id)))
    }

    async fn count_on_loan(&self, borrower_id: Option<i32>) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM book_instances
            WHERE status = $1 AND ($2::int IS NULL OR borrower_id = $2)
            "#,
        )
        .bind(LoanStatus::OnLoan)
        .bind(borrower_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn list_on_loan(
        &self,
        borrower_id: Option<i32>,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<BookInstance>> {
        let query = format!(
            r#"{}
            WHERE bi.status = $1 AND ($2::int IS NULL OR bi.borrower_id = $2)
            ORDER BY bi.due_back ASC, bi.id
            LIMIT $3 OFFSET $4
            "#,
            INSTANCE_SELECT
        );
        let instances = sqlx::query_as::<_, BookInstance>(&query)
            .bind(LoanStatus::OnLoan)
            .bind(borrower_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(instances)
    }

    async fn set_due_back(&self, id: Uuid, due_back: NaiveDate) -> AppResult<()> {
        let result = sqlx::query("UPDATE book_instances SET due_back = $1 WHERE id = $2")
            .bind(due_back)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book instance {} not found", id)));
        }
        Ok(())
    }
}
