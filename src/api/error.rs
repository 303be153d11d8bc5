use crate::application::{ApplicationError, ErrorKind};
use crate::domain::NewBookError;
use crate::i18n::{MessageKey, Translator};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::any::Any;

use super::types::ActionResult;

/// エラー分類からHTTPステータスへのマッピング
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        // 400 Bad Request - フォーム検証エラー
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        // 401 Unauthorized - 未認証・認証情報不一致
        ErrorKind::NotAuthenticated => StatusCode::UNAUTHORIZED,
        // 404 Not Found - リクエストされたリソースが存在しない
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        // 409 Conflict - 登録済み
        ErrorKind::Conflict => StatusCode::CONFLICT,
        // 422 Unprocessable Entity - ビジネスルール違反
        ErrorKind::BusinessRule => StatusCode::UNPROCESSABLE_ENTITY,
        // 502 Bad Gateway - 外部サービスの失敗
        ErrorKind::ExternalService => StatusCode::BAD_GATEWAY,
    }
}

/// バックエンドのメッセージ（空なら既定のメッセージ）
fn passthrough(
    source: &dyn std::error::Error,
    translator: &Translator,
    locale: &str,
    fallback: MessageKey,
) -> String {
    let message = source.to_string();
    if message.trim().is_empty() {
        translator.translate(locale, fallback)
    } else {
        message
    }
}

/// アプリケーション層のエラーを利用者向けメッセージにする
///
/// 外部サービスの失敗はバックエンドのメッセージをそのまま渡す。
pub fn localize(err: &ApplicationError, translator: &Translator, locale: &str) -> String {
    let t = |key| translator.translate(locale, key);

    match err {
        ApplicationError::Validation(_) => t(MessageKey::ErrorMissingRequiredFields),
        ApplicationError::InvalidBook(NewBookError::MissingRequiredFields) => {
            t(MessageKey::ErrorMissingRequiredFields)
        }
        ApplicationError::InvalidBook(NewBookError::InvalidImageUrl) => {
            t(MessageKey::ErrorInvalidImageUrl)
        }
        ApplicationError::NotAuthenticated => t(MessageKey::ErrorNotAuthenticated),
        ApplicationError::InvalidCredentials => err.to_string(),
        ApplicationError::AlreadyRegistered => t(MessageKey::SignupErrorAlreadyRegistered),
        ApplicationError::AuthService(e) => {
            passthrough(e, translator, locale, MessageKey::ErrorUnknown)
        }
        ApplicationError::EligibilityCheckFailed(_) => {
            t(MessageKey::ErrorReservationVerificationFailed)
        }
        // 理由があればそのまま返す
        ApplicationError::ReservationNotAllowed { reason } => reason
            .as_deref()
            .filter(|reason| !reason.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| t(MessageKey::ErrorReservationNotAllowed)),
        ApplicationError::BookNotFound(_) => t(MessageKey::ErrorBookNotFound),
        ApplicationError::BookLookupFailed(e) => {
            passthrough(e.as_ref(), translator, locale, MessageKey::ErrorBookNotFound)
        }
        ApplicationError::ReservationInsertFailed(e) => passthrough(
            e.as_ref(),
            translator,
            locale,
            MessageKey::ErrorReservationFailed,
        ),
        ApplicationError::CatalogError(e) | ApplicationError::ReservationStoreError(e) => {
            passthrough(e.as_ref(), translator, locale, MessageKey::ErrorUnknown)
        }
    }
}

/// ステータスとメッセージを決める
///
/// 外部サービスの失敗はここでログに記録する。
pub fn describe(
    err: &ApplicationError,
    translator: &Translator,
    locale: &str,
) -> (StatusCode, String) {
    let kind = err.kind();
    if kind == ErrorKind::ExternalService {
        tracing::error!(error = ?err, "External service error: {}", err);
    } else {
        tracing::debug!(kind = ?kind, "Request rejected: {}", err);
    }

    (status_for(kind), localize(err, translator, locale))
}

/// ハンドラー内のパニックを500レスポンスにする
///
/// 詳細はログに記録し、一般的なメッセージと元のメッセージを返す。
pub fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");

    tracing::error!("Handler panicked: {}", detail);

    let body = Json(ActionResult::<()>::failed(format!(
        "{} {}",
        MessageKey::ErrorGeneric.english(),
        detail
    )));
    (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
}
