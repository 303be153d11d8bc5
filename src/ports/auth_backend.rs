use crate::domain::{NewAccount, Principal, PrincipalId, Session, SessionToken};
use async_trait::async_trait;
use thiserror::Error;

/// 認証バックエンドのエラー
///
/// 利用者に意味のある失敗（認証情報不一致、重複登録）と
/// バックエンド障害を区別する。
#[derive(Debug, Error)]
pub enum AuthError {
    /// メールアドレスまたはパスワードが一致しない
    #[error("Invalid login credentials")]
    InvalidCredentials,

    /// 既に登録済みのメールアドレス
    #[error("User already registered")]
    AlreadyRegistered,

    /// 対象の利用者が存在しない
    #[error("User not found")]
    UserNotFound,

    /// バックエンド障害（メッセージはそのまま利用者に渡る）
    #[error("{0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<sqlx::Error> for AuthError {
    fn from(err: sqlx::Error) -> Self {
        AuthError::Backend(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, AuthError>;

/// 認証バックエンドポート
///
/// セッション管理はすべてバックエンドに委譲する。
/// テストではインスタンスごとに状態を持つインメモリ実装を使う。
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// セッションから現在の利用者を解決する
    ///
    /// 期限切れ・未知のトークンは`Ok(None)`。
    async fn current_principal(&self, token: &SessionToken) -> Result<Option<Principal>>;

    /// パスワード認証してセッションを発行する
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session>;

    /// 新規登録する
    async fn sign_up(&self, account: NewAccount) -> Result<Principal>;

    /// セッションを破棄する（未知のトークンでも成功）
    async fn sign_out(&self, token: &SessionToken) -> Result<()>;

    /// 管理者権限でメールアドレスを変更する
    async fn update_email(&self, principal_id: PrincipalId, email: &str) -> Result<Principal>;

    /// 管理者権限で利用者を削除する
    ///
    /// 利用者のセッションも無効になる。
    async fn delete_user(&self, principal_id: PrincipalId) -> Result<()>;
}
