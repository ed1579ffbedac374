//! User accounts, permissions and session claims

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::error::AppError;

/// Capability checked before a mutating or sensitive-read operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Permission {
    #[serde(rename = "catalog.add_book")]
    AddBook,
    #[serde(rename = "catalog.change_book")]
    ChangeBook,
    #[serde(rename = "catalog.delete_book")]
    DeleteBook,
    #[serde(rename = "catalog.add_author")]
    AddAuthor,
    #[serde(rename = "catalog.change_author")]
    ChangeAuthor,
    #[serde(rename = "catalog.delete_author")]
    DeleteAuthor,
    #[serde(rename = "catalog.can_mark_returned")]
    CanMarkReturned,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::AddBook => "catalog.add_book",
            Permission::ChangeBook => "catalog.change_book",
            Permission::DeleteBook => "catalog.delete_book",
            Permission::AddAuthor => "catalog.add_author",
            Permission::ChangeAuthor => "catalog.change_author",
            Permission::DeleteAuthor => "catalog.delete_author",
            Permission::CanMarkReturned => "catalog.can_mark_returned",
        }
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// User account from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i32,
    pub username: String,
    /// Hashed password (argon2)
    #[serde(skip_serializing)]
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_active: bool,
    pub is_superuser: bool,
}

/// Claims of a login session token.
///
/// `sid` names the server-side session; the token stops working once that
/// session is destroyed, even before `exp`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub user_id: i32,
    pub sid: String,
    pub is_superuser: bool,
    pub permissions: Vec<String>,
    pub exp: i64,
    pub iat: i64,
}

impl SessionClaims {
    /// Create a signed token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse and verify a token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    pub fn has_perm(&self, permission: Permission) -> bool {
        self.is_superuser || self.permissions.iter().any(|p| p == permission.as_str())
    }

    pub fn require(&self, permission: Permission) -> Result<(), AppError> {
        if self.has_perm(permission) {
            Ok(())
        } else {
            Err(AppError::Authorization(format!(
                "Permission {} required",
                permission
            )))
        }
    }
}
