//! Catalog management service (books and authors)

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        forms::{add_error, field_errors, FieldErrors},
        Author, AuthorDetail, AuthorForm, BookDetail, BookForm, BookShort, Page, PageRequest,
    },
    repository::Repository,
};

const INVALID_CHOICE: &str = "Select a valid choice. That choice is not one of the available choices.";

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Succeeds once the catalog tables answer queries
    pub async fn check_ready(&self) -> AppResult<()> {
        self.repository.books.count().await.map(|_| ())
    }

    // =========================================================================
    // BOOKS
    // =========================================================================

    /// Books ordered by title, one page at a time
    pub async fn list_books(&self, page: Option<i64>, per_page: i64) -> AppResult<Page<BookShort>> {
        let total = self.repository.books.count().await?;
        let request = PageRequest::resolve(page, per_page, total)?;
        let items = self
            .repository
            .books
            .list(request.limit(), request.offset())
            .await?;
        Ok(Page {
            items,
            total,
            request,
        })
    }

    pub async fn get_book(&self, id: i32) -> AppResult<BookDetail> {
        self.repository.books.get_by_id(id).await
    }

    /// Create a book and return its id
    pub async fn create_book(&self, form: BookForm) -> AppResult<i32> {
        self.clean_book(&form, None).await?;
        let id = self.repository.books.create(&form).await?;
        tracing::info!("Created book id={} isbn={}", id, form.isbn);
        Ok(id)
    }

    pub async fn update_book(&self, id: i32, form: BookForm) -> AppResult<()> {
        // Check if book exists
        self.repository.books.get_by_id(id).await?;
        self.clean_book(&form, Some(id)).await?;
        self.repository.books.update(id, &form).await?;
        tracing::info!("Updated book id={}", id);
        Ok(())
    }

    /// Delete a book; copies of it must be removed first
    pub async fn delete_book(&self, id: i32) -> AppResult<()> {
        self.repository.books.get_by_id(id).await?;

        let copies = self.repository.instances.count_for_book(id).await?;
        if copies > 0 {
            return Err(AppError::Conflict(format!(
                "Book {} still has {} copies and cannot be deleted",
                id, copies
            )));
        }

        self.repository.books.delete(id).await?;
        tracing::info!("Deleted book id={}", id);
        Ok(())
    }

    async fn clean_book(&self, form: &BookForm, id: Option<i32>) -> AppResult<()> {
        let mut errors = match form.validate() {
            Ok(()) => FieldErrors::new(),
            Err(e) => field_errors(&e),
        };

        if let Some(author_id) = form.author_id {
            if !self.repository.authors.exists(author_id).await? {
                add_error(&mut errors, "author_id", INVALID_CHOICE);
            }
        }

        let genre_ids = form.unique_genre_ids();
        if !genre_ids.is_empty() && !self.repository.taxonomy.genres_exist(&genre_ids).await? {
            add_error(&mut errors, "genre_ids", INVALID_CHOICE);
        }

        if let Some(language_id) = form.language_id {
            if !self.repository.taxonomy.language_exists(language_id).await? {
                add_error(&mut errors, "language_id", INVALID_CHOICE);
            }
        }

        if !errors.is_empty() {
            return Err(AppError::InvalidForm(errors));
        }

        if self.repository.books.isbn_exists(&form.isbn, id).await? {
            return Err(AppError::Conflict(
                "Book with this ISBN already exists".to_string(),
            ));
        }

        Ok(())
    }

    // =========================================================================
    // AUTHORS
    // =========================================================================

    /// Authors ordered by name, one page at a time
    pub async fn list_authors(&self, page: Option<i64>, per_page: i64) -> AppResult<Page<Author>> {
        let total = self.repository.authors.count().await?;
        let request = PageRequest::resolve(page, per_page, total)?;
        let items = self
            .repository
            .authors
            .list(request.limit(), request.offset())
            .await?;
        Ok(Page {
            items,
            total,
            request,
        })
    }

    pub async fn get_author(&self, id: i32) -> AppResult<AuthorDetail> {
        self.repository.authors.get_by_id(id).await
    }

    pub async fn create_author(&self, form: AuthorForm) -> AppResult<i32> {
        form.validate()
            .map_err(|e| AppError::InvalidForm(field_errors(&e)))?;
        let id = self.repository.authors.create(&form).await?;
        tracing::info!("Created author id={}", id);
        Ok(id)
    }

    pub async fn update_author(&self, id: i32, form: AuthorForm) -> AppResult<()> {
        if !self.repository.authors.exists(id).await? {
            return Err(AppError::NotFound(format!("Author with id {} not found", id)));
        }
        form.validate()
            .map_err(|e| AppError::InvalidForm(field_errors(&e)))?;
        self.repository.authors.update(id, &form).await?;
        tracing::info!("Updated author id={}", id);
        Ok(())
    }

    /// Delete an author; their books are kept without an author
    pub async fn delete_author(&self, id: i32) -> AppResult<()> {
        self.repository.authors.delete(id).await?;
        tracing::info!("Deleted author id={}", id);
        Ok(())
    }
}
