use crate::domain::{NewAccount, Principal, PrincipalId, Session, SessionToken};
use crate::ports::auth_backend::{AuthBackend as AuthBackendTrait, AuthError, Result};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{Duration, Utc};
use rand::RngCore;
use rand::rngs::OsRng;
use sqlx::{PgPool, Row};

use super::invalid_data;

/// Argon2でパスワードをハッシュ化する
fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Backend(invalid_data(format!("Failed to hash password: {}", e))))
}

/// ハッシュとパスワードを照合する
fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| AuthError::Backend(invalid_data(format!("Invalid password hash: {}", e))))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// 推測困難なセッショントークンを生成する
fn generate_token() -> SessionToken {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    SessionToken::new(URL_SAFE_NO_PAD.encode(bytes))
}

/// 一意制約違反（メールアドレスの重複）を判定する
fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db_err| db_err.is_unique_violation())
}

/// AuthBackendのPostgreSQL実装
///
/// usersテーブル（Argon2ハッシュ）とsessionsテーブルで
/// 認証とセッションを管理する。
pub struct AuthBackend {
    pool: PgPool,
    session_ttl: Duration,
}

impl AuthBackend {
    /// # 引数
    /// * `pool` - コネクションプール
    /// * `session_ttl` - 発行するセッションの有効期間
    pub fn new(pool: PgPool, session_ttl: Duration) -> Self {
        Self { pool, session_ttl }
    }

    /// 新しいセッションを発行する（期限切れのセッションはここで削除）
    async fn create_session(&self, principal: Principal) -> Result<Session> {
        let purged = sqlx::query("DELETE FROM sessions WHERE expires_at <= NOW()")
            .execute(&self.pool)
            .await?
            .rows_affected();
        if purged > 0 {
            tracing::debug!(purged, "Expired sessions removed");
        }

        let token = generate_token();
        let expires_at = Utc::now() + self.session_ttl;

        sqlx::query(
            r#"
            INSERT INTO sessions (token, user_id, expires_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(token.as_str())
        .bind(principal.id.value())
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        Ok(Session {
            token,
            principal,
            expires_at,
        })
    }
}

#[async_trait]
impl AuthBackendTrait for AuthBackend {
    /// 期限切れのセッションは存在しないものとして扱う
    async fn current_principal(&self, token: &SessionToken) -> Result<Option<Principal>> {
        let row = sqlx::query(
            r#"
            SELECT u.id, u.email
            FROM sessions s
            JOIN users u ON u.id = s.user_id
            WHERE s.token = $1 AND s.expires_at > NOW()
            "#,
        )
        .bind(token.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| Principal {
            id: PrincipalId::from_uuid(row.get("id")),
            email: row.get("email"),
        }))
    }

    /// 未登録のメールアドレスとパスワード不一致は区別しない
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session> {
        let row = sqlx::query(
            r#"
            SELECT id, email, password_hash
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Err(AuthError::InvalidCredentials);
        };

        let hash: String = row.get("password_hash");
        if !verify_password(password, &hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        let principal = Principal {
            id: PrincipalId::from_uuid(row.get("id")),
            email: row.get("email"),
        };
        self.create_session(principal).await
    }

    async fn sign_up(&self, account: NewAccount) -> Result<Principal> {
        let password_hash = hash_password(&account.password)?;
        let id = PrincipalId::new();

        let row = sqlx::query(
            r#"
            INSERT INTO users (id, first_name, last_name, email, password_hash)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (email) DO NOTHING
            RETURNING id, email
            "#,
        )
        .bind(id.value())
        .bind(&account.first_name)
        .bind(&account.last_name)
        .bind(&account.email)
        .bind(&password_hash)
        .fetch_optional(&self.pool)
        .await?;

        let row = row.ok_or(AuthError::AlreadyRegistered)?;
        Ok(Principal {
            id: PrincipalId::from_uuid(row.get("id")),
            email: row.get("email"),
        })
    }

    async fn sign_out(&self, token: &SessionToken) -> Result<()> {
        sqlx::query("DELETE FROM sessions WHERE token = $1")
            .bind(token.as_str())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn update_email(&self, principal_id: PrincipalId, email: &str) -> Result<Principal> {
        let row = sqlx::query(
            r#"
            UPDATE users
            SET email = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, email
            "#,
        )
        .bind(principal_id.value())
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AuthError::AlreadyRegistered
            } else {
                AuthError::from(e)
            }
        })?;

        let row = row.ok_or(AuthError::UserNotFound)?;
        Ok(Principal {
            id: PrincipalId::from_uuid(row.get("id")),
            email: row.get("email"),
        })
    }

    /// セッションは外部キーのON DELETE CASCADEで削除される
    async fn delete_user(&self, principal_id: PrincipalId) -> Result<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(principal_id.value())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AuthError::UserNotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_roundtrip() {
        let hash = hash_password("correct-horse").unwrap();
        assert!(verify_password("correct-horse", &hash).unwrap());
        assert!(!verify_password("wrong-horse", &hash).unwrap());
    }

    #[test]
    fn test_verify_password_rejects_malformed_hash() {
        assert!(matches!(
            verify_password("secret", "not-a-hash"),
            Err(AuthError::Backend(_))
        ));
    }

    #[test]
    fn test_generated_tokens_are_unique_and_url_safe() {
        let a = generate_token();
        let b = generate_token();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 43);
        assert!(
            a.as_str()
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }
}
