//! Repository layer for database operations
//!
//! Each record kind is reached through an async trait so that services can
//! be exercised against mocks; the `Pg*` types are the PostgreSQL-backed
//! implementations used by the server.

pub mod authors;
pub mod books;
pub mod instances;
pub mod taxonomy;
pub mod users;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        Author, AuthorDetail, AuthorForm, BookDetail, BookForm, BookInstance, BookShort,
        LoanStatus, User,
    },
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BooksRepository: Send + Sync {
    async fn count(&self) -> AppResult<i64>;
    /// Books whose title contains `needle`, ignoring case
    async fn count_title_containing(&self, needle: &str) -> AppResult<i64>;
    /// Books ordered by title
    async fn list(&self, limit: i64, offset: i64) -> AppResult<Vec<BookShort>>;
    async fn get_by_id(&self, id: i32) -> AppResult<BookDetail>;
    async fn isbn_exists(&self, isbn: &str, exclude_id: Option<i32>) -> AppResult<bool>;
    async fn create(&self, form: &BookForm) -> AppResult<i32>;
    async fn update(&self, id: i32, form: &BookForm) -> AppResult<()>;
    async fn delete(&self, id: i32) -> AppResult<()>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthorsRepository: Send + Sync {
    async fn count(&self) -> AppResult<i64>;
    /// Authors ordered by last name, then first name
    async fn list(&self, limit: i64, offset: i64) -> AppResult<Vec<Author>>;
    async fn get_by_id(&self, id: i32) -> AppResult<AuthorDetail>;
    async fn exists(&self, id: i32) -> AppResult<bool>;
    async fn create(&self, form: &AuthorForm) -> AppResult<i32>;
    async fn update(&self, id: i32, form: &AuthorForm) -> AppResult<()>;
    async fn delete(&self, id: i32) -> AppResult<()>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InstancesRepository: Send + Sync {
    async fn count(&self) -> AppResult<i64>;
    async fn count_by_status(&self, status: LoanStatus) -> AppResult<i64>;
    async fn count_for_book(&self, book_id: i32) -> AppResult<i64>;
    async fn get_by_id(&self, id: Uuid) -> AppResult<BookInstance>;
    /// On-loan copies, optionally restricted to one borrower
    async fn count_on_loan(&self, borrower_id: Option<i32>) -> AppResult<i64>;
    /// On-loan copies ordered by due date (earliest first)
    async fn list_on_loan(
        &self,
        borrower_id: Option<i32>,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<BookInstance>>;
    async fn set_due_back(&self, id: Uuid, due_back: NaiveDate) -> AppResult<()>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaxonomyRepository: Send + Sync {
    async fn count_genres(&self) -> AppResult<i64>;
    /// True when every id names an existing genre
    async fn genres_exist(&self, ids: &[i32]) -> AppResult<bool>;
    async fn language_exists(&self, id: i32) -> AppResult<bool>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersRepository: Send + Sync {
    async fn get_by_username(&self, username: &str) -> AppResult<Option<User>>;
    /// Permission strings granted directly or through groups
    async fn get_permissions(&self, user_id: i32) -> AppResult<Vec<String>>;
    async fn touch_last_login(&self, user_id: i32) -> AppResult<()>;
}

/// Main repository struct holding one handle per record kind
#[derive(Clone)]
pub struct Repository {
    pub books: Arc<dyn BooksRepository>,
    pub authors: Arc<dyn AuthorsRepository>,
    pub instances: Arc<dyn InstancesRepository>,
    pub taxonomy: Arc<dyn TaxonomyRepository>,
    pub users: Arc<dyn UsersRepository>,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            books: Arc::new(books::PgBooksRepository::new(pool.clone())),
            authors: Arc::new(authors::PgAuthorsRepository::new(pool.clone())),
            instances: Arc::new(instances::PgInstancesRepository::new(pool.clone())),
            taxonomy: Arc::new(taxonomy::PgTaxonomyRepository::new(pool.clone())),
            users: Arc::new(users::PgUsersRepository::new(pool)),
        }
    }
}

/// Escape LIKE wildcards so `needle` matches literally
pub(crate) fn escape_like(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len());
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
