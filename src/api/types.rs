use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::domain::{
    Book, BookSummary, DueSoonNotification, Principal, Reservation, ReservationEligibility,
    Session,
};

// ============================================================================
// Requests
// ============================================================================

/// フォーム本文（任意の`locale`フィールド付き）
#[derive(Debug, Deserialize)]
pub struct FormRequest<F> {
    #[serde(flatten)]
    pub form: F,
    #[serde(default)]
    pub locale: Option<String>,
}

/// POST /books/:id/reservations の本文（省略可）
#[derive(Debug, Default, Deserialize)]
pub struct ReserveRequest {
    /// 省略時は現在 + 貸出期間
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub locale: Option<String>,
}

/// GET /books のクエリパラメータ
#[derive(Debug, Default, Deserialize)]
pub struct BooksQuery {
    /// 検索語
    pub search: Option<String>,
    /// 検索対象の列（title, author, category）
    pub by: Option<String>,
}

// ============================================================================
// Envelopes
// ============================================================================

/// フォーム送信の結果
///
/// 検証エラーはフィールドごとに複数のメッセージを持つ。
#[derive(Debug, Serialize)]
pub struct FormState<T> {
    pub data: Option<T>,
    pub field_errors: BTreeMap<String, Vec<String>>,
    pub message: Option<String>,
}

impl<T> FormState<T> {
    pub fn success(data: T, message: String) -> Self {
        Self {
            data: Some(data),
            field_errors: BTreeMap::new(),
            message: Some(message),
        }
    }

    pub fn failure(message: String) -> Self {
        Self {
            data: None,
            field_errors: BTreeMap::new(),
            message: Some(message),
        }
    }

    pub fn invalid(field_errors: BTreeMap<String, Vec<String>>, message: String) -> Self {
        Self {
            data: None,
            field_errors,
            message: Some(message),
        }
    }
}

/// 操作の成否
#[derive(Debug, Serialize)]
pub struct ActionResult<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ActionResult<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failed(error: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
        }
    }
}

impl ActionResult<()> {
    pub fn done() -> Self {
        Self {
            success: true,
            data: None,
            error: None,
        }
    }
}

/// サインイン成功時のデータ
#[derive(Debug, Serialize)]
pub struct SessionData {
    pub token: String,
    pub user_id: Uuid,
    pub email: String,
    pub expires_at: DateTime<Utc>,
}

impl From<Session> for SessionData {
    fn from(session: Session) -> Self {
        Self {
            token: session.token.as_str().to_string(),
            user_id: session.principal.id.value(),
            email: session.principal.email,
            expires_at: session.expires_at,
        }
    }
}

/// 利用者データ
#[derive(Debug, Serialize)]
pub struct UserData {
    pub user_id: Uuid,
    pub email: String,
}

impl From<Principal> for UserData {
    fn from(principal: Principal) -> Self {
        Self {
            user_id: principal.id.value(),
            email: principal.email,
        }
    }
}

/// 作成された予約
#[derive(Debug, Serialize)]
pub struct ReservationData {
    pub reservation_id: i64,
    pub book_id: i64,
    pub due_date: DateTime<Utc>,
    pub user_id: Uuid,
}

impl From<Reservation> for ReservationData {
    fn from(reservation: Reservation) -> Self {
        Self {
            reservation_id: reservation.reservation_id.value(),
            book_id: reservation.book_id.value(),
            due_date: reservation.due_date,
            user_id: reservation.user_id.value(),
        }
    }
}

/// GET /books
#[derive(Debug, Serialize)]
pub struct BooksResponse {
    pub error: Option<String>,
    pub books: Vec<BookSummary>,
}

/// GET/POST/PATCH/DELETE /books/:id
#[derive(Debug, Serialize)]
pub struct BookResponse {
    pub error: Option<String>,
    pub book: Option<Book>,
}

/// GET /reservations
#[derive(Debug, Serialize)]
pub struct ReservationsResponse {
    pub error: Option<String>,
    pub reservations: Vec<Reservation>,
}

/// GET /reservations/eligibility
#[derive(Debug, Serialize)]
pub struct EligibilityResponse {
    pub error: Option<String>,
    pub status: Option<ReservationEligibility>,
}

/// GET /notifications/due-soon
#[derive(Debug, Serialize)]
pub struct NotificationsResponse {
    pub error: Option<String>,
    pub notifications: Vec<DueSoonNotification>,
}
