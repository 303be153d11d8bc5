use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use super::error::handle_panic;
use super::handlers::{
    AppState, check_eligibility, create_book, delete_account, delete_book, get_book,
    list_books, list_due_soon, list_my_reservations, mark_reminded, reserve_book, sign_in,
    sign_out, sign_up, update_book, update_email,
};

/// APIルーターを作成する
///
/// アカウント:
/// - POST /auth/signin, /auth/signup, /auth/signout
/// - POST /account/email, /account/delete
///
/// 書籍:
/// - GET /books?search=&by= - 一覧・検索
/// - POST /books - 登録
/// - GET/PATCH/DELETE /books/:id
///
/// 予約・通知:
/// - POST /books/:id/reservations - 予約
/// - GET /reservations, /reservations/eligibility
/// - GET /notifications/due-soon
/// - POST /notifications/:id/reminded
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check endpoint
        .route("/health", get(health_check))
        // Account
        .route("/auth/signin", post(sign_in))
        .route("/auth/signup", post(sign_up))
        .route("/auth/signout", post(sign_out))
        .route("/account/email", post(update_email))
        .route("/account/delete", post(delete_account))
        // Catalog
        .route("/books", get(list_books).post(create_book))
        .route(
            "/books/:id",
            get(get_book).patch(update_book).delete(delete_book),
        )
        // Reservations
        .route("/books/:id/reservations", post(reserve_book))
        .route("/reservations", get(list_my_reservations))
        .route("/reservations/eligibility", get(check_eligibility))
        // Notifications
        .route("/notifications/due-soon", get(list_due_soon))
        .route("/notifications/:id/reminded", post(mark_reminded))
        .layer(CatchPanicLayer::custom(handle_panic))
        // Add tracing middleware
        .layer(TraceLayer::new_for_http())
        // Add application state
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
