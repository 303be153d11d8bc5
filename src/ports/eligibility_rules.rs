use crate::domain::{PrincipalId, ReservationEligibility};
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 予約可否ルールポート
///
/// 判定（延滞ペナルティなど）はデータベース側の関数が行う。
/// このクレートは結果を不透明な判定として扱う。
#[async_trait]
pub trait EligibilityRules: Send + Sync {
    /// 利用者が予約できるか評価する
    async fn evaluate_reservation_eligibility(
        &self,
        principal_id: PrincipalId,
    ) -> Result<ReservationEligibility>;
}
