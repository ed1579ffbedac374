//! Books repository for database operations

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        book::Book, Author, BookDetail, BookForm, BookInstance, BookShort, Genre, Language,
    },
};

use super::{escape_like, instances::INSTANCE_SELECT, BooksRepository};

const BOOK_SHORT_SELECT: &str = r#"
    SELECT b.id, b.title, b.author_id,
           CASE WHEN a.id IS NULL THEN NULL
                ELSE a.last_name || ', ' || a.first_name END AS author_name
    FROM books b
    LEFT JOIN authors a ON a.id = b.author_id
"#;

#[derive(Clone)]
pub struct PgBooksRepository {
    pool: Pool<Postgres>,
}

impl PgBooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BooksRepository for PgBooksRepository {
    async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn count_title_containing(&self, needle: &str) -> AppResult<i64> {
        let pattern = format!("%{}%", escape_like(needle));
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE title ILIKE $1")
            .bind(pattern)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn list(&self, limit: i64, offset: i64) -> AppResult<Vec<BookShort>> {
        let query = format!("{} ORDER BY b.title, b.id LIMIT $1 OFFSET $2", BOOK_SHORT_SELECT);
        let books = sqlx::query_as::<_, BookShort>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(books)
    }

    async fn get_by_id(&self, id: i32) -> AppResult<BookDetail> {
        let book = sqlx::query_as::<_, Book>(
            "SELECT id, title, author_id, summary, isbn, language_id FROM books WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        let author = sqlx::query_as::<_, Author>(
            "SELECT id, first_name, last_name, date_of_birth, date_of_death FROM authors WHERE id = $1",
        )
        .bind(book.author_id)
        .fetch_optional(&self.pool)
        .await?;

        let genres = sqlx::query_as::<_, Genre>(
            r#"
            SELECT g.id, g.name
            FROM genres g
            JOIN book_genres bg ON bg.genre_id = g.id
            WHERE bg.book_id = $1
            ORDER BY g.name
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let language = sqlx::query_as::<_, Language>("SELECT id, name FROM languages WHERE id = $1")
            .bind(book.language_id)
            .fetch_optional(&self.pool)
            .await?;

        let query = format!("{} WHERE bi.book_id = $1 ORDER BY bi.due_back, bi.id", INSTANCE_SELECT);
        let instances = sqlx::query_as::<_, BookInstance>(&query)
            .bind(id)
            .fetch_all(&self.pool)
            .await?;

        Ok(BookDetail {
            id: book.id,
            title: book.title,
            summary: book.summary,
            isbn: book.isbn,
            author,
            genres,
            language,
            instances,
        })
    }

    async fn isbn_exists(&self, isbn: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM books WHERE isbn = $1 AND ($2::int IS NULL OR id <> $2))",
        )
        .bind(isbn)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn create(&self, form: &BookForm) -> AppResult<i32> {
        let mut tx = self.pool.begin().await?;

        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO books (title, author_id, summary, isbn, language_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(&form.title)
        .bind(form.author_id)
        .bind(&form.summary)
        .bind(&form.isbn)
        .bind(form.language_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO book_genres (book_id, genre_id) SELECT $1, UNNEST($2::int[])")
            .bind(id)
            .bind(form.unique_genre_ids())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(id)
    }

    async fn update(&self, id: i32, form: &BookForm) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE books
            SET title = $1, author_id = $2, summary = $3, isbn = $4, language_id = $5
            WHERE id = $6
            "#,
        )
        .bind(&form.title)
        .bind(form.author_id)
        .bind(&form.summary)
        .bind(&form.isbn)
        .bind(form.language_id)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }

        sqlx::query("DELETE FROM book_genres WHERE book_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("INSERT INTO book_genres (book_id, genre_id) SELECT $1, UNNEST($2::int[])")
            .bind(id)
            .bind(form.unique_genre_ids())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }
        Ok(())
    }
}
