//! Book model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::{author::Author, genre::Genre, genre::Language, instance::BookInstance};

/// Book row as stored
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author_id: Option<i32>,
    pub summary: String,
    pub isbn: String,
    pub language_id: Option<i32>,
}

/// Short book representation for lists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookShort {
    pub id: i32,
    pub title: String,
    pub author_id: Option<i32>,
    /// "Last, First" of the author, when there is one
    pub author_name: Option<String>,
}

/// Book with its author, genres, language and copies
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookDetail {
    pub id: i32,
    pub title: String,
    pub summary: String,
    pub isbn: String,
    pub author: Option<Author>,
    pub genres: Vec<Genre>,
    pub language: Option<Language>,
    pub instances: Vec<BookInstance>,
}

/// Editable book fields, used by both create and update
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct BookForm {
    #[validate(length(min = 1, max = 200, message = "Ensure this value has between 1 and 200 characters."))]
    pub title: String,
    #[serde(default)]
    pub author_id: Option<i32>,
    #[validate(length(min = 1, max = 1000, message = "Ensure this value has between 1 and 1000 characters."))]
    pub summary: String,
    /// 13 character ISBN
    #[validate(length(equal = 13, message = "ISBN must be exactly 13 characters."))]
    pub isbn: String,
    #[serde(default)]
    pub genre_ids: Vec<i32>,
    #[serde(default)]
    pub language_id: Option<i32>,
}

impl BookForm {
    /// Genre ids without duplicates, in submission order
    pub fn unique_genre_ids(&self) -> Vec<i32> {
        let mut ids = Vec::with_capacity(self.genre_ids.len());
        for id in &self.genre_ids {
            if !ids.contains(id) {
                ids.push(*id);
            }
        }
        ids
    }
}
