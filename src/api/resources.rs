//! Catalog resources served by the generic list/detail/edit endpoints
//!
//! Books and authors differ only in the data below: page size, editable
//! fields and the permission guarding each change.

use axum::{
    extract::{FromRequest, Request},
    response::Redirect,
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{
    error::{AppError, AppResult},
    models::{forms::{add_error, FieldErrors, REQUIRED}, Permission},
    AppState,
};

use super::API_PREFIX;

#[derive(Debug, Clone, Copy)]
pub struct Resource {
    pub name: &'static str,
    /// Path of the list endpoint, relative to the API prefix
    pub list_path: &'static str,
    /// Detail endpoints live at `{detail_path}/{id}`
    pub detail_path: &'static str,
    pub paginate_by: i64,
    /// Fields accepted by create and update; anything else is rejected
    pub fields: &'static [&'static str],
    pub required: &'static [&'static str],
    pub add: Permission,
    pub change: Permission,
    pub delete: Permission,
}

pub const BOOKS: Resource = Resource {
    name: "book",
    list_path: "/books",
    detail_path: "/book",
    paginate_by: 5,
    fields: &["title", "author_id", "summary", "isbn", "genre_ids", "language_id"],
    required: &["title", "summary", "isbn"],
    add: Permission::AddBook,
    change: Permission::ChangeBook,
    delete: Permission::DeleteBook,
};

pub const AUTHORS: Resource = Resource {
    name: "author",
    list_path: "/authors",
    detail_path: "/author",
    paginate_by: 3,
    fields: &["first_name", "last_name", "date_of_birth", "date_of_death"],
    required: &["first_name", "last_name"],
    add: Permission::AddAuthor,
    change: Permission::ChangeAuthor,
    delete: Permission::DeleteAuthor,
};

impl Resource {
    pub fn list_url(&self) -> String {
        format!("{}{}", API_PREFIX, self.list_path)
    }

    pub fn detail_url(&self, id: i32) -> String {
        format!("{}{}/{}", API_PREFIX, self.detail_path, id)
    }

    /// 303 to the detail endpoint of record `id`
    pub fn redirect_to_detail(&self, id: i32) -> Redirect {
        Redirect::to(&self.detail_url(id))
    }

    /// 303 to the list endpoint
    pub fn redirect_to_list(&self) -> Redirect {
        Redirect::to(&self.list_url())
    }

    /// Read a JSON form from the request body and decode it with
    /// [`Resource::parse_form`]. Call only after the permission check.
    pub async fn read_form<T: DeserializeOwned>(
        &self,
        request: Request,
        state: &AppState,
    ) -> AppResult<T> {
        let Json(body) = Json::<Value>::from_request(request, state)
            .await
            .map_err(|rejection| AppError::Validation(rejection.body_text()))?;
        self.parse_form(body)
    }

    /// Decode a submitted form, accepting only this resource's fields.
    ///
    /// Unknown and missing required fields are reported per field before
    /// the body is decoded into `T`.
    pub fn parse_form<T: DeserializeOwned>(&self, body: Value) -> AppResult<T> {
        let object = match body {
            Value::Object(object) => object,
            _ => {
                return Err(AppError::Validation(format!(
                    "Expected a {} form object",
                    self.name
                )))
            }
        };

        let mut errors = FieldErrors::new();
        for key in object.keys() {
            if !self.fields.contains(&key.as_str()) {
                add_error(&mut errors, key, "Unknown field.");
            }
        }
        for field in self.required {
            if object.get(*field).map_or(true, Value::is_null) {
                add_error(&mut errors, field, REQUIRED);
            }
        }
        if !errors.is_empty() {
            return Err(AppError::InvalidForm(errors));
        }

        serde_json::from_value(Value::Object(object))
            .map_err(|e| AppError::Validation(format!("Invalid {} form: {}", self.name, e)))
    }
}
