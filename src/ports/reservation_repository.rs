use crate::domain::{
    DueSoonNotification, PrincipalId, ReminderWindow, Reservation, ReservationId,
    ReservationRequest,
};
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 予約リポジトリポート
#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// 予約を1件作成し、作成された行を返す
    ///
    /// 在庫数の確認・減算は行わない。
    async fn insert(&self, request: ReservationRequest) -> Result<Reservation>;

    /// 利用者の全予約を取得する
    async fn find_by_user(&self, user_id: PrincipalId) -> Result<Vec<Reservation>>;

    /// リマインダー対象の予約を検索する
    ///
    /// status = 'active' かつ reminder_sent = false かつ
    /// window.from <= due_date <= window.to
    async fn find_due_soon(
        &self,
        user_id: PrincipalId,
        window: ReminderWindow,
    ) -> Result<Vec<DueSoonNotification>>;

    /// reminder_sent を true にする
    ///
    /// 無条件の更新。繰り返し呼んでも成功する。
    async fn mark_reminder_sent(&self, reservation_id: ReservationId) -> Result<()>;
}
