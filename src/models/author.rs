//! Author model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use super::book::BookShort;

/// Author record from database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Author {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

impl Author {
    /// "Last, First", as shown in listings
    pub fn display_name(&self) -> String {
        format!("{}, {}", self.last_name, self.first_name)
    }
}

/// Author with the books attributed to them
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthorDetail {
    #[serde(flatten)]
    pub author: Author,
    pub books: Vec<BookShort>,
}

/// Editable author fields, used by both create and update
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_lifespan", skip_on_field_errors = true))]
pub struct AuthorForm {
    #[validate(length(min = 1, max = 100, message = "Ensure this value has between 1 and 100 characters."))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "Ensure this value has between 1 and 100 characters."))]
    pub last_name: String,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub date_of_death: Option<NaiveDate>,
}

fn validate_lifespan(form: &AuthorForm) -> Result<(), ValidationError> {
    match (form.date_of_birth, form.date_of_death) {
        (Some(born), Some(died)) if died < born => {
            let mut error = ValidationError::new("lifespan");
            error.message = Some("Date of death cannot precede date of birth.".into());
            Err(error)
        }
        _ => Ok(()),
    }
}
