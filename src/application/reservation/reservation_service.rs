use crate::application::dependencies::{ServiceDependencies, resolve_principal};
use crate::application::errors::{ApplicationError, Result};
use crate::domain::{
    BookId, Reservation, ReservationEligibility, ReservationRequest, SessionToken,
};
use chrono::{DateTime, Utc};

/// コマンド：書籍を予約する
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReserveBook {
    pub book_id: BookId,
    /// 返却期限。呼び出し側で計算する（慣例は現在 + 7日）。
    pub due_date: DateTime<Utc>,
}

/// 書籍を予約する
///
/// 処理フロー（各ステップで失敗したら即座に返す）：
/// 1. セッションから利用者を解決
/// 2. 予約可否を外部ルールで評価
/// 3. 判定が否定なら理由をそのまま返す
/// 4. 書籍の存在確認
/// 5. 予約を1件作成
///
/// 失敗時は何も書き込まない。
///
/// # 在庫数について
///
/// 在庫数（available_copies）の再確認・減算は行わない。
/// 同じ書籍への同時予約は直列化されない（既知の課題）。
///
/// # エラー
/// - NotAuthenticated: セッションがない
/// - EligibilityCheckFailed: ルール評価の失敗
/// - ReservationNotAllowed: 判定が否定
/// - BookNotFound / BookLookupFailed: 書籍が存在しない・取得失敗
/// - ReservationInsertFailed: 書き込み失敗
pub async fn reserve(
    deps: &ServiceDependencies,
    session: Option<&SessionToken>,
    cmd: ReserveBook,
) -> Result<Reservation> {
    // 1. 利用者の解決
    let principal = resolve_principal(deps, session).await?;

    tracing::info!(
        book_id = %cmd.book_id,
        user_id = %principal.id,
        due_date = %cmd.due_date,
        "Reserving book"
    );

    // 2. 予約可否の評価
    let verdict = deps
        .eligibility_rules
        .evaluate_reservation_eligibility(principal.id)
        .await
        .map_err(|e| {
            tracing::error!(user_id = %principal.id, "Eligibility check failed: {}", e);
            ApplicationError::EligibilityCheckFailed(e)
        })?;

    // 3. 判定の確認
    if !verdict.can_reserve {
        return Err(ApplicationError::ReservationNotAllowed {
            reason: verdict.reason().map(str::to_string),
        });
    }

    // 4. 書籍の存在確認
    let book = deps
        .books
        .get_by_id(cmd.book_id)
        .await
        .map_err(|e| {
            tracing::error!(book_id = %cmd.book_id, "Book fetch error: {}", e);
            ApplicationError::BookLookupFailed(e)
        })?
        .ok_or(ApplicationError::BookNotFound(cmd.book_id))?;

    if book.available_copies <= 0 {
        // 在庫数は確認のみで予約は続行する
        tracing::warn!(
            book_id = %book.book_id,
            available_copies = book.available_copies,
            "Reserving a book with no available copies"
        );
    }

    // 5. 予約の作成
    let reservation = deps
        .reservations
        .insert(ReservationRequest {
            book_id: cmd.book_id,
            due_date: cmd.due_date,
            user_id: principal.id,
        })
        .await
        .map_err(|e| {
            tracing::error!(book_id = %cmd.book_id, "Reservation insert error: {}", e);
            ApplicationError::ReservationInsertFailed(e)
        })?;

    tracing::info!(
        reservation_id = %reservation.reservation_id,
        "Reservation created"
    );

    Ok(reservation)
}

/// 予約可否を確認する（読み取り専用）
///
/// 画面で予約ボタンを無効化するために使う。
/// 未認証の場合はエラーではなく「予約不可」の判定を返す。
pub async fn check_eligibility(
    deps: &ServiceDependencies,
    session: Option<&SessionToken>,
) -> Result<ReservationEligibility> {
    let principal = match resolve_principal(deps, session).await {
        Ok(principal) => principal,
        Err(ApplicationError::NotAuthenticated) => {
            return Ok(ReservationEligibility::denied(None));
        }
        Err(e) => return Err(e),
    };

    deps.eligibility_rules
        .evaluate_reservation_eligibility(principal.id)
        .await
        .map_err(ApplicationError::EligibilityCheckFailed)
}

/// 利用者の全予約を取得する
pub async fn list_my_reservations(
    deps: &ServiceDependencies,
    session: Option<&SessionToken>,
) -> Result<Vec<Reservation>> {
    let principal = resolve_principal(deps, session).await?;

    deps.reservations
        .find_by_user(principal.id)
        .await
        .map_err(ApplicationError::ReservationStoreError)
}
