use crate::domain::{PrincipalId, ReservationEligibility};
use crate::ports::eligibility_rules::{EligibilityRules as EligibilityRulesTrait, Result};
use async_trait::async_trait;
use sqlx::{PgPool, Row};

/// EligibilityRulesのPostgreSQL実装
///
/// ストアド関数 `can_user_reserve_books(user_uuid)` を呼び出す。
/// 判定ルール自体はマイグレーションで定義される。
pub struct EligibilityRules {
    pool: PgPool,
}

impl EligibilityRules {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EligibilityRulesTrait for EligibilityRules {
    /// 関数が行を返さない場合は理由なしの拒否として扱う
    async fn evaluate_reservation_eligibility(
        &self,
        principal_id: PrincipalId,
    ) -> Result<ReservationEligibility> {
        let row = sqlx::query(
            r#"
            SELECT can_reserve, restriction_reason
            FROM can_user_reserve_books($1)
            "#,
        )
        .bind(principal_id.value())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            tracing::warn!(user_id = %principal_id, "Eligibility function returned no rows");
            return Ok(ReservationEligibility::denied(None));
        };

        Ok(ReservationEligibility {
            can_reserve: row.get("can_reserve"),
            restriction_reason: row.get("restriction_reason"),
        })
    }
}
