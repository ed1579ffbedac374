//! Data models for the Local Library catalog

pub mod author;
pub mod book;
pub mod forms;
pub mod genre;
pub mod instance;
pub mod page;
pub mod user;

// Re-export commonly used types
pub use author::{Author, AuthorDetail, AuthorForm};
pub use book::{BookDetail, BookForm, BookShort};
pub use genre::{Genre, Language};
pub use instance::{BookInstance, LoanStatus};
pub use page::{Page, PageQuery, PageRequest};
pub use user::{Permission, SessionClaims, User};
