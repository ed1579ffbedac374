//! Loaned books and renewal service

use chrono::{Duration, NaiveDate};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    config::LoansConfig,
    error::AppResult,
    models::{
        forms::{RenewBookForm, RenewBookFormView, RenewalWindow},
        BookInstance, Page, PageRequest,
    },
    repository::Repository,
};

/// Renewal form together with the copy it applies to
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RenewalPage {
    pub form: RenewBookFormView,
    pub book_instance: BookInstance,
}

/// Result of a renewal submission
#[derive(Debug)]
pub enum RenewalOutcome {
    /// Due date written
    Renewed(BookInstance),
    /// Form rejected; nothing was written
    Rejected(RenewalPage),
}

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
    config: LoansConfig,
}

impl LoansService {
    pub fn new(repository: Repository, config: LoansConfig) -> Self {
        Self { repository, config }
    }

    /// Copies on loan, earliest due first; `borrower_id` restricts to one user
    pub async fn list_on_loan(
        &self,
        borrower_id: Option<i32>,
        page: Option<i64>,
        per_page: i64,
    ) -> AppResult<Page<BookInstance>> {
        let total = self.repository.instances.count_on_loan(borrower_id).await?;
        let request = PageRequest::resolve(page, per_page, total)?;
        let items = self
            .repository
            .instances
            .list_on_loan(borrower_id, request.limit(), request.offset())
            .await?;
        Ok(Page {
            items,
            total,
            request,
        })
    }

    /// Unbound renewal form, proposing a date a few weeks from `today`
    pub async fn renewal_form(&self, id: Uuid, today: NaiveDate) -> AppResult<RenewalPage> {
        let book_instance = self.repository.instances.get_by_id(id).await?;
        let proposed = today + Duration::weeks(self.config.proposed_renewal_weeks);
        Ok(RenewalPage {
            form: RenewBookFormView::initial(proposed),
            book_instance,
        })
    }

    /// Validate a renewal submission and, when valid, write the new due date
    pub async fn renew(
        &self,
        id: Uuid,
        form: RenewBookForm,
        today: NaiveDate,
    ) -> AppResult<RenewalOutcome> {
        let mut book_instance = self.repository.instances.get_by_id(id).await?;

        let window = RenewalWindow::new(today, self.config.max_renewal_weeks);
        match form.clean(window) {
            Ok(renewal_date) => {
                self.repository
                    .instances
                    .set_due_back(id, renewal_date)
                    .await?;
                tracing::info!("Renewed book instance {} until {}", id, renewal_date);
                book_instance.due_back = Some(renewal_date);
                book_instance.is_overdue = false;
                Ok(RenewalOutcome::Renewed(book_instance))
            }
            Err(errors) => Ok(RenewalOutcome::Rejected(RenewalPage {
                form: RenewBookFormView::rejected(form, errors),
                book_instance,
            })),
        }
    }
}
