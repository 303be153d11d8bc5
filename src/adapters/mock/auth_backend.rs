use crate::domain::{NewAccount, Principal, PrincipalId, Session, SessionToken};
use crate::ports::auth_backend::{AuthBackend as AuthBackendTrait, AuthError, Result};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use uuid::Uuid;

use super::lock;

struct Account {
    principal: Principal,
    password: String,
}

/// AuthBackendのモック実装
///
/// 登録済みの認証情報（メールアドレス → パスワード）とセッションを保持する。
/// バックエンド呼び出し回数を数えるので、検証失敗時に
/// 呼び出しが発生しないことをテストできる。
pub struct AuthBackend {
    accounts: Mutex<HashMap<PrincipalId, Account>>,
    sessions: Mutex<HashMap<SessionToken, PrincipalId>>,
    calls: AtomicUsize,
}

impl AuthBackend {
    pub fn new() -> Self {
        Self {
            accounts: Mutex::new(HashMap::new()),
            sessions: Mutex::new(HashMap::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// テスト用に利用者を登録
    pub fn register(&self, email: &str, password: &str) -> Principal {
        let principal = Principal {
            id: PrincipalId::new(),
            email: email.to_string(),
        };
        lock(&self.accounts).insert(
            principal.id,
            Account {
                principal: principal.clone(),
                password: password.to_string(),
            },
        );
        principal
    }

    /// テスト用にセッションを発行（パスワード確認なし）
    pub fn issue_session(&self, principal_id: PrincipalId) -> SessionToken {
        let token = SessionToken::new(format!("mock-token-{}", Uuid::new_v4()));
        lock(&self.sessions).insert(token.clone(), principal_id);
        token
    }

    /// 登録とセッション発行をまとめて行う
    pub fn signed_in_user(&self, email: &str) -> (Principal, SessionToken) {
        let principal = self.register(email, "correct-horse");
        let token = self.issue_session(principal.id);
        (principal, token)
    }

    /// バックエンドが呼ばれた回数
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// 有効なセッション数
    pub fn session_count(&self) -> usize {
        lock(&self.sessions).len()
    }

    /// 登録済みのメールアドレスか
    pub fn has_account(&self, email: &str) -> bool {
        lock(&self.accounts)
            .values()
            .any(|account| account.principal.email == email)
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

impl Default for AuthBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuthBackendTrait for AuthBackend {
    async fn current_principal(&self, token: &SessionToken) -> Result<Option<Principal>> {
        self.record_call();
        let Some(principal_id) = lock(&self.sessions).get(token).copied() else {
            return Ok(None);
        };
        Ok(lock(&self.accounts)
            .get(&principal_id)
            .map(|account| account.principal.clone()))
    }

    /// 登録済みの認証情報と照合する
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session> {
        self.record_call();
        let principal = lock(&self.accounts)
            .values()
            .find(|account| account.principal.email == email && account.password == password)
            .map(|account| account.principal.clone())
            .ok_or(AuthError::InvalidCredentials)?;

        let token = self.issue_session(principal.id);
        Ok(Session {
            token,
            principal,
            expires_at: Utc::now() + Duration::hours(24),
        })
    }

    /// 未登録なら登録、登録済みならエラー
    async fn sign_up(&self, account: NewAccount) -> Result<Principal> {
        self.record_call();
        if self.has_account(&account.email) {
            return Err(AuthError::AlreadyRegistered);
        }
        Ok(self.register(&account.email, &account.password))
    }

    async fn sign_out(&self, token: &SessionToken) -> Result<()> {
        self.record_call();
        lock(&self.sessions).remove(token);
        Ok(())
    }

    async fn update_email(&self, principal_id: PrincipalId, email: &str) -> Result<Principal> {
        self.record_call();
        let mut accounts = lock(&self.accounts);
        let account = accounts
            .get_mut(&principal_id)
            .ok_or(AuthError::UserNotFound)?;
        account.principal.email = email.to_string();
        Ok(account.principal.clone())
    }

    async fn delete_user(&self, principal_id: PrincipalId) -> Result<()> {
        self.record_call();
        if lock(&self.accounts).remove(&principal_id).is_none() {
            return Err(AuthError::UserNotFound);
        }
        lock(&self.sessions).retain(|_, owner| *owner != principal_id);
        Ok(())
    }
}
