// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Connector,
    Operator,
    Banker,
    Admin,
    SuperAdmin,
}

impl UserRole {
    /// Admin-level roles may disburse, pay commission and manage RTO cases.
    pub fn is_admin_level(self) -> bool {
        matches!(self, UserRole::Admin | UserRole::SuperAdmin)
    }
}

// A user as it comes out of the database
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,

    #[serde(skip_serializing)] // never leaves the server
    #[schema(ignore)]
    pub password_hash: String,

    pub full_name: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserPayload {
    #[validate(email(message = "invalid email"))]
    pub email: String,

    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    pub password: String,

    #[validate(length(min = 1, message = "required"))]
    pub full_name: String,

    pub role: UserRole,

    /// Required when registering a connector.
    #[schema(example = "Pune")]
    pub city: Option<String>,

    /// Connector commission percentage, e.g. "2.00".
    #[schema(value_type = String, example = "2.00")]
    pub commission_percentage: Option<rust_decimal::Decimal>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginUserPayload {
    #[validate(email(message = "invalid email"))]
    pub email: String,

    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
}

// Claims carried inside the JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // user id
    pub exp: usize, // expiration time
    pub iat: usize, // issued at
}
