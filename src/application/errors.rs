use crate::domain::forms::FieldErrors;
use crate::domain::{BookId, NewBookError};
use crate::ports::AuthError;
use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// エラーの分類
///
/// API層はこの分類でHTTPステータスを決める。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// フォーム検証エラー
    Validation,
    /// 未認証（認証情報不一致を含む）
    NotAuthenticated,
    /// 外部サービス（DB・認証・ルール評価）の失敗
    ExternalService,
    /// ビジネスルール違反
    BusinessRule,
    /// 対象が存在しない
    NotFound,
    /// 重複
    Conflict,
}

/// アプリケーション層のエラー
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// フィールドごとの検証エラー（バックエンドは呼ばれていない）
    #[error("Validation failed")]
    Validation(FieldErrors),

    /// 書籍登録の入力エラー
    #[error("Invalid book: {0:?}")]
    InvalidBook(NewBookError),

    /// セッションがない、または無効
    #[error("User not authenticated")]
    NotAuthenticated,

    /// メールアドレスまたはパスワードが一致しない
    #[error("Invalid login credentials")]
    InvalidCredentials,

    /// 既に登録済み
    #[error("User already registered")]
    AlreadyRegistered,

    /// 認証バックエンドの失敗
    #[error("Auth service error: {0}")]
    AuthService(#[source] AuthError),

    /// 予約可否の評価に失敗
    #[error("Failed to verify reservation eligibility")]
    EligibilityCheckFailed(#[source] BoxError),

    /// 予約不可（理由があればそのまま保持）
    #[error("Reservation not allowed")]
    ReservationNotAllowed { reason: Option<String> },

    /// 書籍が存在しない
    #[error("Book {0} not found")]
    BookNotFound(BookId),

    /// 書籍の取得に失敗
    #[error("Book lookup failed: {0}")]
    BookLookupFailed(#[source] BoxError),

    /// 予約の作成に失敗
    #[error("Reservation insert failed: {0}")]
    ReservationInsertFailed(#[source] BoxError),

    /// カタログ（booksテーブル）の失敗
    #[error("Catalog error: {0}")]
    CatalogError(#[source] BoxError),

    /// 予約ストアの失敗
    #[error("Reservation store error: {0}")]
    ReservationStoreError(#[source] BoxError),
}

impl ApplicationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApplicationError::Validation(_) | ApplicationError::InvalidBook(_) => {
                ErrorKind::Validation
            }
            ApplicationError::NotAuthenticated | ApplicationError::InvalidCredentials => {
                ErrorKind::NotAuthenticated
            }
            ApplicationError::ReservationNotAllowed { .. } => ErrorKind::BusinessRule,
            ApplicationError::BookNotFound(_) => ErrorKind::NotFound,
            ApplicationError::AlreadyRegistered => ErrorKind::Conflict,
            ApplicationError::AuthService(_)
            | ApplicationError::EligibilityCheckFailed(_)
            | ApplicationError::BookLookupFailed(_)
            | ApplicationError::ReservationInsertFailed(_)
            | ApplicationError::CatalogError(_)
            | ApplicationError::ReservationStoreError(_) => ErrorKind::ExternalService,
        }
    }
}

/// 認証バックエンドのエラーを変換する
///
/// 利用者に意味のある失敗は専用のバリアントへ、それ以外は外部サービスエラーへ。
impl From<AuthError> for ApplicationError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => ApplicationError::InvalidCredentials,
            AuthError::AlreadyRegistered => ApplicationError::AlreadyRegistered,
            AuthError::UserNotFound => ApplicationError::NotAuthenticated,
            other => ApplicationError::AuthService(other),
        }
    }
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, ApplicationError>;
