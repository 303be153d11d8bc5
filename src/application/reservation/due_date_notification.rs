use crate::application::dependencies::{ServiceDependencies, resolve_principal};
use crate::application::errors::{ApplicationError, Result};
use crate::domain::{DueSoonNotification, ReservationId, SessionToken};
use chrono::{DateTime, Utc};

/// 返却期限が近い予約を取得する
///
/// 対象：利用者のActiveかつ未通知の予約で、
/// 返却期限が`[now, now + リマインダー期間]`に入るもの（両端を含む）。
///
/// 読み取りのみで冪等。
///
/// # 引数
/// * `deps` - サービスの依存関係
/// * `session` - 利用者のセッション
/// * `now` - 期間の起点
pub async fn list_due_soon(
    deps: &ServiceDependencies,
    session: Option<&SessionToken>,
    now: DateTime<Utc>,
) -> Result<Vec<DueSoonNotification>> {
    let principal = resolve_principal(deps, session).await?;
    let window = deps.policy.reminder_window_at(now);

    let notifications = deps
        .reservations
        .find_due_soon(principal.id, window)
        .await
        .map_err(ApplicationError::ReservationStoreError)?;

    tracing::debug!(
        user_id = %principal.id,
        count = notifications.len(),
        "Loaded due date notifications"
    );

    Ok(notifications)
}

/// リマインダー送信済みにする
///
/// reminder_sent を false から true にする一方向の遷移。
/// 無条件の更新なので、重複呼び出しも成功する。
///
/// 予約の所有者は確認しない（認証済みであることのみ確認）。
pub async fn mark_reminded(
    deps: &ServiceDependencies,
    session: Option<&SessionToken>,
    reservation_id: ReservationId,
) -> Result<()> {
    let principal = resolve_principal(deps, session).await?;

    deps.reservations
        .mark_reminder_sent(reservation_id)
        .await
        .map_err(ApplicationError::ReservationStoreError)?;

    tracing::debug!(
        user_id = %principal.id,
        reservation_id = %reservation_id,
        "Marked reminder as sent"
    );

    Ok(())
}
