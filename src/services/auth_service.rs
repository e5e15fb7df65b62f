// src/services/auth_service.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::auth::{Claims, RegisterUserPayload, User, UserRole},
};

#[derive(Clone)]
pub struct AuthService {
    users: UserRepository,
    jwt_secret: String,
    pool: PgPool,
}

impl AuthService {
    pub fn new(users: UserRepository, jwt_secret: String, pool: PgPool) -> Self {
        Self {
            users,
            jwt_secret,
            pool,
        }
    }

    pub async fn register_user(&self, payload: &RegisterUserPayload) -> Result<String, AppError> {
        if self.users.find_by_email(&payload.email).await?.is_some() {
            return Err(AppError::EmailAlreadyExists);
        }

        // Connector registrations carry their profile fields up front.
        let connector_profile = if payload.role == UserRole::Connector {
            let city = payload
                .city
                .clone()
                .filter(|c| !c.trim().is_empty())
                .ok_or_else(|| AppError::Validation("connector city is required".into()))?;
            let percentage = payload.commission_percentage.ok_or_else(|| {
                AppError::Validation("connector commission percentage is required".into())
            })?;
            Some((city, percentage))
        } else {
            None
        };

        // Hashing happens off the async runtime threads.
        let password = payload.password.clone();
        let password_hash =
            tokio::task::spawn_blocking(move || hash(&password, bcrypt::DEFAULT_COST))
                .await
                .map_err(|e| anyhow::anyhow!("hashing task failed: {e}"))??;

        // User and connector profile are created together or not at all.
        let mut tx = self.pool.begin().await?;

        let user = self
            .users
            .create_user(
                &mut *tx,
                &payload.email,
                &password_hash,
                &payload.full_name,
                payload.role,
            )
            .await?;

        if let Some((city, percentage)) = connector_profile {
            self.users
                .create_connector(&mut *tx, user.id, &city, percentage)
                .await?;
        }

        tx.commit().await?;

        self.create_token(user.id)
    }

    pub async fn login_user(&self, email: &str, password: &str) -> Result<String, AppError> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password = password.to_owned();
        let password_hash = user.password_hash.clone();

        let is_valid = tokio::task::spawn_blocking(move || verify(&password, &password_hash))
            .await
            .map_err(|e| anyhow::anyhow!("password verification task failed: {e}"))??;

        if !is_valid {
            return Err(AppError::InvalidCredentials);
        }

        self.create_token(user.id)
    }

    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;

        self.users
            .find_by_id(token_data.claims.sub)
            .await?
            .ok_or_else(|| AppError::NotFound("user not found".into()))
    }

    fn create_token(&self, user_id: Uuid) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(7);

        let claims = Claims {
            sub: user_id,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claims_survive_an_encode_decode_round_trip() {
        let secret = "test-secret";
        let user_id = Uuid::new_v4();
        let now = Utc::now();

        let claims = Claims {
            sub: user_id,
            exp: (now + chrono::Duration::hours(1)).timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_ref()),
        )
        .unwrap();

        let decoded = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(secret.as_ref()),
            &Validation::default(),
        )
        .unwrap();

        assert_eq!(decoded.claims.sub, user_id);
    }

    #[test]
    fn tampered_tokens_are_rejected() {
        let claims = Claims {
            sub: Uuid::new_v4(),
            exp: (Utc::now() + chrono::Duration::hours(1)).timestamp() as usize,
            iat: Utc::now().timestamp() as usize,
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret("secret-a".as_ref()),
        )
        .unwrap();

        let result = decode::<Claims>(
            &token,
            &DecodingKey::from_secret("secret-b".as_ref()),
            &Validation::default(),
        );

        assert!(result.is_err());
    }
}
