use crate::application::{
    ApplicationError, ServiceDependencies, account, catalog,
    reservation::{self, ReserveBook},
};
use crate::domain::forms::{FieldErrors, SignInForm, SignUpForm, UpdateEmailForm};
use crate::domain::{Book, BookId, BookSearchField, BookUpdate, NewBook, ReservationId};
use crate::i18n::{FormKind, MessageKey, Translator};
use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use chrono::Utc;
use std::sync::Arc;

use super::{
    error::describe,
    session::{MaybeSession, RequestLocale},
    types::{
        ActionResult, BookResponse, BooksQuery, BooksResponse, EligibilityResponse, FormRequest,
        FormState, NotificationsResponse, ReservationData, ReservationsResponse, ReserveRequest,
        SessionData, UserData,
    },
};

// ============================================================================
// State
// ============================================================================

/// ハンドラー間で共有されるアプリケーション状態
#[derive(Clone)]
pub struct AppState {
    pub service_deps: ServiceDependencies,
    pub translator: Translator,
}

impl AppState {
    fn t(&self, locale: &str, key: MessageKey) -> String {
        self.translator.translate(locale, key)
    }

    /// 検証エラーのフォーム応答
    fn invalid_form<T>(
        &self,
        locale: &str,
        form: FormKind,
        errors: &FieldErrors,
    ) -> (StatusCode, Json<FormState<T>>) {
        let field_errors = self.translator.field_errors(locale, form, errors);
        let message = self.t(locale, form.summary_key());
        (
            StatusCode::BAD_REQUEST,
            Json(FormState::invalid(field_errors, message)),
        )
    }

    /// 読み取れなかった本文のステータスとメッセージ
    fn rejected_body(&self, locale: &str, rejection: &JsonRejection) -> (StatusCode, String) {
        tracing::debug!("Request body rejected: {}", rejection.body_text());
        (
            rejection.status(),
            self.t(locale, MessageKey::ErrorInvalidRequestBody),
        )
    }
}

// ============================================================================
// Account handlers
// ============================================================================

/// POST /auth/signin - サインイン
///
/// 成功時はセッショントークンを返す。
/// 検証エラーはフィールドごとのメッセージとして返す。
pub async fn sign_in(
    State(state): State<Arc<AppState>>,
    locale: RequestLocale,
    body: Result<Json<FormRequest<SignInForm>>, JsonRejection>,
) -> (StatusCode, Json<FormState<SessionData>>) {
    let req = match body {
        Ok(Json(req)) => req,
        Err(rejection) => {
            let locale = locale.resolve(None, &state.translator);
            let (status, message) = state.rejected_body(&locale, &rejection);
            return (status, Json(FormState::failure(message)));
        }
    };
    let locale = locale.resolve(req.locale.as_deref(), &state.translator);

    match account::sign_in(&state.service_deps, req.form).await {
        Ok(session) => (
            StatusCode::OK,
            Json(FormState::success(
                SessionData::from(session),
                state.t(&locale, MessageKey::SigninSuccessMessage),
            )),
        ),
        Err(ApplicationError::Validation(errors)) => {
            state.invalid_form(&locale, FormKind::SignIn, &errors)
        }
        Err(err) => {
            let (status, message) = describe(&err, &state.translator, &locale);
            (status, Json(FormState::failure(message)))
        }
    }
}

/// POST /auth/signup - 新規登録
pub async fn sign_up(
    State(state): State<Arc<AppState>>,
    locale: RequestLocale,
    body: Result<Json<FormRequest<SignUpForm>>, JsonRejection>,
) -> (StatusCode, Json<FormState<UserData>>) {
    let req = match body {
        Ok(Json(req)) => req,
        Err(rejection) => {
            let locale = locale.resolve(None, &state.translator);
            let (status, message) = state.rejected_body(&locale, &rejection);
            return (status, Json(FormState::failure(message)));
        }
    };
    let locale = locale.resolve(req.locale.as_deref(), &state.translator);

    match account::sign_up(&state.service_deps, req.form).await {
        Ok(principal) => (
            StatusCode::CREATED,
            Json(FormState::success(
                UserData::from(principal),
                state.t(&locale, MessageKey::SignupSuccessMessage),
            )),
        ),
        Err(ApplicationError::Validation(errors)) => {
            state.invalid_form(&locale, FormKind::SignUp, &errors)
        }
        Err(err) => {
            let (status, message) = describe(&err, &state.translator, &locale);
            (status, Json(FormState::failure(message)))
        }
    }
}

/// POST /auth/signout - サインアウト
pub async fn sign_out(
    State(state): State<Arc<AppState>>,
    session: MaybeSession,
    locale: RequestLocale,
) -> (StatusCode, Json<ActionResult<()>>) {
    let locale = locale.resolve(None, &state.translator);

    match account::sign_out(&state.service_deps, session.token()).await {
        Ok(()) => (StatusCode::OK, Json(ActionResult::done())),
        Err(err) => {
            let (status, message) = describe(&err, &state.translator, &locale);
            (status, Json(ActionResult::failed(message)))
        }
    }
}

/// POST /account/email - メールアドレスの変更
///
/// 失敗メッセージは「接頭辞 + バックエンドのメッセージ + 再試行の案内」。
pub async fn update_email(
    State(state): State<Arc<AppState>>,
    session: MaybeSession,
    locale: RequestLocale,
    body: Result<Json<FormRequest<UpdateEmailForm>>, JsonRejection>,
) -> (StatusCode, Json<FormState<UserData>>) {
    let req = match body {
        Ok(Json(req)) => req,
        Err(rejection) => {
            let locale = locale.resolve(None, &state.translator);
            let (status, message) = state.rejected_body(&locale, &rejection);
            return (status, Json(FormState::failure(message)));
        }
    };
    let locale = locale.resolve(req.locale.as_deref(), &state.translator);

    match account::update_email(&state.service_deps, session.token(), req.form).await {
        Ok(principal) => (
            StatusCode::OK,
            Json(FormState::success(
                UserData::from(principal),
                state.t(&locale, MessageKey::DashboardSuccessEmailUpdated),
            )),
        ),
        Err(ApplicationError::Validation(errors)) => {
            state.invalid_form(&locale, FormKind::UpdateEmail, &errors)
        }
        Err(err @ ApplicationError::NotAuthenticated) => {
            let (status, message) = describe(&err, &state.translator, &locale);
            let message = format!(
                "{} {}",
                state.t(&locale, MessageKey::DashboardErrorNoUserDataShort),
                message
            );
            (status, Json(FormState::failure(message)))
        }
        Err(err) => {
            let (status, message) = describe(&err, &state.translator, &locale);
            let message = format!(
                "{} {}{}",
                state.t(&locale, MessageKey::DashboardErrorEmailUpdateFailedPrefix),
                message,
                state.t(&locale, MessageKey::DashboardErrorTryAgain)
            );
            (status, Json(FormState::failure(message)))
        }
    }
}

/// POST /account/delete - アカウント削除
pub async fn delete_account(
    State(state): State<Arc<AppState>>,
    session: MaybeSession,
    locale: RequestLocale,
) -> (StatusCode, Json<ActionResult<()>>) {
    let locale = locale.resolve(None, &state.translator);

    match account::delete_account(&state.service_deps, session.token()).await {
        Ok(()) => (StatusCode::OK, Json(ActionResult::done())),
        Err(err @ ApplicationError::AuthService(_)) => {
            let (status, message) = describe(&err, &state.translator, &locale);
            let message = format!(
                "{}: {}",
                state.t(&locale, MessageKey::DashboardErrorDeleteFailed),
                message
            );
            (status, Json(ActionResult::failed(message)))
        }
        Err(err) => {
            let (status, message) = describe(&err, &state.translator, &locale);
            (status, Json(ActionResult::failed(message)))
        }
    }
}

// ============================================================================
// Catalog handlers
// ============================================================================

/// GET /books - 書籍一覧・検索
///
/// クエリパラメータ:
/// - search: 検索語（省略時は全件）
/// - by: 検索対象（title, author, category）。省略時はtitle
pub async fn list_books(
    State(state): State<Arc<AppState>>,
    locale: RequestLocale,
    Query(query): Query<BooksQuery>,
) -> (StatusCode, Json<BooksResponse>) {
    let locale = locale.resolve(None, &state.translator);

    let result = match query.search {
        None => catalog::list_books(&state.service_deps).await,
        Some(term) => {
            let field = match query.by.as_deref() {
                None => BookSearchField::Title,
                Some(by) => match by.parse::<BookSearchField>() {
                    Ok(field) => field,
                    Err(message) => {
                        return (
                            StatusCode::BAD_REQUEST,
                            Json(BooksResponse {
                                error: Some(message),
                                books: Vec::new(),
                            }),
                        );
                    }
                },
            };
            catalog::search_books(&state.service_deps, field, &term).await
        }
    };

    match result {
        Ok(books) => (StatusCode::OK, Json(BooksResponse { error: None, books })),
        Err(err) => {
            let (status, message) = describe(&err, &state.translator, &locale);
            (
                status,
                Json(BooksResponse {
                    error: Some(message),
                    books: Vec::new(),
                }),
            )
        }
    }
}

/// 書籍応答の共通処理
fn book_response(
    state: &AppState,
    locale: &str,
    result: Result<Option<Book>, ApplicationError>,
    success: StatusCode,
) -> (StatusCode, Json<BookResponse>) {
    match result {
        Ok(book) => (success, Json(BookResponse { error: None, book })),
        Err(err) => {
            let (status, message) = describe(&err, &state.translator, locale);
            (
                status,
                Json(BookResponse {
                    error: Some(message),
                    book: None,
                }),
            )
        }
    }
}

fn rejected_book_body(
    state: &AppState,
    locale: &str,
    rejection: &JsonRejection,
) -> (StatusCode, Json<BookResponse>) {
    let (status, message) = state.rejected_body(locale, rejection);
    (
        status,
        Json(BookResponse {
            error: Some(message),
            book: None,
        }),
    )
}

/// 正でないIDは存在しない書籍として扱う
fn parse_book_id(
    state: &AppState,
    locale: &str,
    raw: i64,
) -> Result<BookId, (StatusCode, Json<BookResponse>)> {
    BookId::try_from(raw).map_err(|_| {
        (
            StatusCode::NOT_FOUND,
            Json(BookResponse {
                error: Some(state.t(locale, MessageKey::ErrorBookNotFound)),
                book: None,
            }),
        )
    })
}

/// GET /books/:id - 書籍詳細
pub async fn get_book(
    State(state): State<Arc<AppState>>,
    locale: RequestLocale,
    Path(book_id): Path<i64>,
) -> (StatusCode, Json<BookResponse>) {
    let locale = locale.resolve(None, &state.translator);
    let book_id = match parse_book_id(&state, &locale, book_id) {
        Ok(book_id) => book_id,
        Err(response) => return response,
    };

    let result = catalog::get_book(&state.service_deps, book_id).await.map(Some);
    book_response(&state, &locale, result, StatusCode::OK)
}

/// POST /books - 書籍登録
pub async fn create_book(
    State(state): State<Arc<AppState>>,
    locale: RequestLocale,
    body: Result<Json<NewBook>, JsonRejection>,
) -> (StatusCode, Json<BookResponse>) {
    let locale = locale.resolve(None, &state.translator);
    let book = match body {
        Ok(Json(book)) => book,
        Err(rejection) => return rejected_book_body(&state, &locale, &rejection),
    };

    let result = catalog::create_book(&state.service_deps, book).await.map(Some);
    book_response(&state, &locale, result, StatusCode::CREATED)
}

/// PATCH /books/:id - 書籍更新
pub async fn update_book(
    State(state): State<Arc<AppState>>,
    locale: RequestLocale,
    Path(book_id): Path<i64>,
    body: Result<Json<BookUpdate>, JsonRejection>,
) -> (StatusCode, Json<BookResponse>) {
    let locale = locale.resolve(None, &state.translator);
    let update = match body {
        Ok(Json(update)) => update,
        Err(rejection) => return rejected_book_body(&state, &locale, &rejection),
    };
    let book_id = match parse_book_id(&state, &locale, book_id) {
        Ok(book_id) => book_id,
        Err(response) => return response,
    };

    let result = catalog::update_book(&state.service_deps, book_id, update)
        .await
        .map(Some);
    book_response(&state, &locale, result, StatusCode::OK)
}

/// DELETE /books/:id - 書籍削除
pub async fn delete_book(
    State(state): State<Arc<AppState>>,
    locale: RequestLocale,
    Path(book_id): Path<i64>,
) -> (StatusCode, Json<BookResponse>) {
    let locale = locale.resolve(None, &state.translator);
    let book_id = match parse_book_id(&state, &locale, book_id) {
        Ok(book_id) => book_id,
        Err(response) => return response,
    };

    let result = catalog::delete_book(&state.service_deps, book_id)
        .await
        .map(|()| None);
    book_response(&state, &locale, result, StatusCode::OK)
}

// ============================================================================
// Reservation handlers
// ============================================================================

/// POST /books/:id/reservations - 書籍を予約
///
/// 本文が空なら返却期限は現在 + 貸出期間。
/// 読み取れない本文は予約せずに400を返す。
pub async fn reserve_book(
    State(state): State<Arc<AppState>>,
    session: MaybeSession,
    locale: RequestLocale,
    Path(book_id): Path<i64>,
    body: Bytes,
) -> (StatusCode, Json<ActionResult<ReservationData>>) {
    let req = if body.iter().all(u8::is_ascii_whitespace) {
        ReserveRequest::default()
    } else {
        match serde_json::from_slice::<ReserveRequest>(&body) {
            Ok(req) => req,
            Err(e) => {
                tracing::debug!("Reservation body rejected: {}", e);
                let locale = locale.resolve(None, &state.translator);
                return (
                    StatusCode::BAD_REQUEST,
                    Json(ActionResult::failed(
                        state.t(&locale, MessageKey::ErrorInvalidRequestBody),
                    )),
                );
            }
        }
    };
    let locale = locale.resolve(req.locale.as_deref(), &state.translator);

    let book_id = match BookId::try_from(book_id) {
        Ok(book_id) => book_id,
        Err(_) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ActionResult::failed(
                    state.t(&locale, MessageKey::ErrorBookNotFound),
                )),
            );
        }
    };

    let cmd = ReserveBook {
        book_id,
        due_date: req
            .due_date
            .unwrap_or_else(|| state.service_deps.policy.default_due_date(Utc::now())),
    };

    match reservation::reserve(&state.service_deps, session.token(), cmd).await {
        Ok(created) => (
            StatusCode::CREATED,
            Json(ActionResult::ok(ReservationData::from(created))),
        ),
        Err(err) => {
            let (status, message) = describe(&err, &state.translator, &locale);
            (status, Json(ActionResult::failed(message)))
        }
    }
}

/// GET /reservations - 自分の予約一覧
pub async fn list_my_reservations(
    State(state): State<Arc<AppState>>,
    session: MaybeSession,
    locale: RequestLocale,
) -> (StatusCode, Json<ReservationsResponse>) {
    let locale = locale.resolve(None, &state.translator);

    match reservation::list_my_reservations(&state.service_deps, session.token()).await {
        Ok(reservations) => (
            StatusCode::OK,
            Json(ReservationsResponse {
                error: None,
                reservations,
            }),
        ),
        Err(err) => {
            let (status, message) = describe(&err, &state.translator, &locale);
            (
                status,
                Json(ReservationsResponse {
                    error: Some(message),
                    reservations: Vec::new(),
                }),
            )
        }
    }
}

/// GET /reservations/eligibility - 予約可否
///
/// 未認証の場合もエラーではなく「予約不可」を返す。
pub async fn check_eligibility(
    State(state): State<Arc<AppState>>,
    session: MaybeSession,
    locale: RequestLocale,
) -> (StatusCode, Json<EligibilityResponse>) {
    let locale = locale.resolve(None, &state.translator);

    match reservation::check_eligibility(&state.service_deps, session.token()).await {
        Ok(status) => (
            StatusCode::OK,
            Json(EligibilityResponse {
                error: None,
                status: Some(status),
            }),
        ),
        Err(err) => {
            let (status, message) = describe(&err, &state.translator, &locale);
            (
                status,
                Json(EligibilityResponse {
                    error: Some(message),
                    status: None,
                }),
            )
        }
    }
}

// ============================================================================
// Notification handlers
// ============================================================================

/// 未認証時は通知用のメッセージを使う
fn notification_error(
    state: &AppState,
    locale: &str,
    err: &ApplicationError,
) -> (StatusCode, String) {
    let (status, message) = describe(err, &state.translator, locale);
    match err {
        ApplicationError::NotAuthenticated => (
            status,
            state.t(locale, MessageKey::NotificationErrorUserNotFound),
        ),
        _ => (status, message),
    }
}

/// GET /notifications/due-soon - 返却期限が近い予約
pub async fn list_due_soon(
    State(state): State<Arc<AppState>>,
    session: MaybeSession,
    locale: RequestLocale,
) -> (StatusCode, Json<NotificationsResponse>) {
    let locale = locale.resolve(None, &state.translator);

    match reservation::list_due_soon(&state.service_deps, session.token(), Utc::now()).await {
        Ok(notifications) => (
            StatusCode::OK,
            Json(NotificationsResponse {
                error: None,
                notifications,
            }),
        ),
        Err(err) => {
            let (status, message) = notification_error(&state, &locale, &err);
            (
                status,
                Json(NotificationsResponse {
                    error: Some(message),
                    notifications: Vec::new(),
                }),
            )
        }
    }
}

/// POST /notifications/:id/reminded - リマインダー送信済みにする
pub async fn mark_reminded(
    State(state): State<Arc<AppState>>,
    session: MaybeSession,
    locale: RequestLocale,
    Path(reservation_id): Path<i64>,
) -> (StatusCode, Json<ActionResult<()>>) {
    let locale = locale.resolve(None, &state.translator);

    let reservation_id = match ReservationId::try_from(reservation_id) {
        Ok(reservation_id) => reservation_id,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ActionResult::failed(
                    state.t(&locale, MessageKey::ErrorInvalidReservationId),
                )),
            );
        }
    };

    match reservation::mark_reminded(&state.service_deps, session.token(), reservation_id).await {
        Ok(()) => (StatusCode::OK, Json(ActionResult::done())),
        Err(err) => {
            let (status, message) = notification_error(&state, &locale, &err);
            (status, Json(ActionResult::failed(message)))
        }
    }
}
