//! Form handling shared by the catalog and loan endpoints
//!
//! Forms report problems per field, the way an HTML form would show them
//! next to each input.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::ValidationErrors;

/// Field name -> messages
pub type FieldErrors = BTreeMap<String, Vec<String>>;

pub const REQUIRED: &str = "This field is required.";
pub const INVALID_DATE: &str = "Enter a valid date.";
pub const RENEWAL_IN_PAST: &str = "Invalid date - renewal in past";

/// Flatten `validator` errors into per-field messages.
pub fn field_errors(errors: &ValidationErrors) -> FieldErrors {
    let mut out = FieldErrors::new();
    for (field, errs) in errors.field_errors() {
        let messages = errs
            .iter()
            .map(|e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string())
            })
            .collect::<Vec<_>>();
        out.entry(field.to_string()).or_default().extend(messages);
    }
    out
}

pub fn add_error(errors: &mut FieldErrors, field: &str, message: impl Into<String>) {
    errors
        .entry(field.to_string())
        .or_default()
        .push(message.into());
}

/// Renewal form as submitted (form-encoded `renewal_date=YYYY-MM-DD`)
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct RenewBookForm {
    /// Date between now and the maximum renewal window (YYYY-MM-DD)
    pub renewal_date: Option<String>,
}

/// Acceptable window for a renewal date, computed from a given day
#[derive(Debug, Clone, Copy)]
pub struct RenewalWindow {
    pub earliest: NaiveDate,
    pub latest: NaiveDate,
    pub max_weeks: i64,
}

impl RenewalWindow {
    pub fn new(today: NaiveDate, max_weeks: i64) -> Self {
        Self {
            earliest: today,
            latest: today + Duration::weeks(max_weeks),
            max_weeks,
        }
    }

    /// Message for a date past `latest`
    pub fn too_far_message(&self) -> String {
        format!(
            "Invalid date - renewal more than {} weeks ahead",
            self.max_weeks
        )
    }
}

impl RenewBookForm {
    /// Validate the submitted date against the renewal window.
    pub fn clean(&self, window: RenewalWindow) -> Result<NaiveDate, FieldErrors> {
        let mut errors = FieldErrors::new();

        let raw = match self.renewal_date.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => raw,
            _ => {
                add_error(&mut errors, "renewal_date", REQUIRED);
                return Err(errors);
            }
        };

        let date = match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            Ok(date) => date,
            Err(_) => {
                add_error(&mut errors, "renewal_date", INVALID_DATE);
                return Err(errors);
            }
        };

        if date < window.earliest {
            add_error(&mut errors, "renewal_date", RENEWAL_IN_PAST);
        } else if date > window.latest {
            add_error(&mut errors, "renewal_date", window.too_far_message());
        }

        if errors.is_empty() {
            Ok(date)
        } else {
            Err(errors)
        }
    }
}

/// Renewal form as rendered back to the client
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RenewBookFormView {
    /// Current value of the date input
    pub renewal_date: Option<String>,
    /// Field-level error messages (empty when the form is unbound or valid)
    #[schema(value_type = Object)]
    pub errors: FieldErrors,
}

impl RenewBookFormView {
    /// Unbound form with an initial value
    pub fn initial(date: NaiveDate) -> Self {
        Self {
            renewal_date: Some(date.format("%Y-%m-%d").to_string()),
            errors: FieldErrors::new(),
        }
    }

    /// Bound form that failed validation
    pub fn rejected(form: RenewBookForm, errors: FieldErrors) -> Self {
        Self {
            renewal_date: form.renewal_date,
            errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn submit(value: &str) -> Result<NaiveDate, FieldErrors> {
        RenewBookForm {
            renewal_date: Some(value.to_string()),
        }
        .clean(RenewalWindow::new(today(), 4))
    }

    #[test]
    fn accepts_dates_inside_window() {
        assert_eq!(submit("2024-01-01"), Ok(today()));
        assert_eq!(
            submit("2024-01-22"),
            Ok(NaiveDate::from_ymd_opt(2024, 1, 22).unwrap())
        );
        assert_eq!(
            submit("2024-01-29"),
            Ok(NaiveDate::from_ymd_opt(2024, 1, 29).unwrap())
        );
    }

    #[test]
    fn rejects_past_date() {
        let errors = submit("2023-12-31").unwrap_err();
        assert_eq!(errors["renewal_date"], vec![RENEWAL_IN_PAST.to_string()]);
    }

    #[test]
    fn rejects_date_beyond_four_weeks() {
        let errors = submit("2024-01-30").unwrap_err();
        assert_eq!(
            errors["renewal_date"],
            vec!["Invalid date - renewal more than 4 weeks ahead".to_string()]
        );
    }

    #[test]
    fn window_length_follows_configuration() {
        let window = RenewalWindow::new(today(), 2);
        let form = |value: &str| RenewBookForm {
            renewal_date: Some(value.to_string()),
        };

        assert!(form("2024-01-15").clean(window).is_ok());
        let errors = form("2024-01-16").clean(window).unwrap_err();
        assert_eq!(
            errors["renewal_date"],
            vec!["Invalid date - renewal more than 2 weeks ahead".to_string()]
        );
    }

    #[test]
    fn rejects_missing_and_malformed_input() {
        let missing = RenewBookForm::default()
            .clean(RenewalWindow::new(today(), 4))
            .unwrap_err();
        assert_eq!(missing["renewal_date"], vec![REQUIRED.to_string()]);

        assert_eq!(submit("  ").unwrap_err()["renewal_date"], vec![REQUIRED.to_string()]);
        assert_eq!(
            submit("22/01/2024").unwrap_err()["renewal_date"],
            vec![INVALID_DATE.to_string()]
        );
    }

    #[test]
    fn initial_view_is_formatted_and_clean() {
        let view = RenewBookFormView::initial(NaiveDate::from_ymd_opt(2024, 1, 22).unwrap());
        assert_eq!(view.renewal_date.as_deref(), Some("2024-01-22"));
        assert!(view.errors.is_empty());
    }
}
