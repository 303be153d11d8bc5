use crate::domain::{PrincipalId, ReservationEligibility};
use crate::ports::eligibility_rules::{EligibilityRules as EligibilityRulesTrait, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::lock;

/// EligibilityRulesのモック実装
///
/// 既定では全員予約可能。テストから制限・障害を設定できる。
pub struct EligibilityRules {
    restrictions: Mutex<HashMap<PrincipalId, Option<String>>>,
    failure: Mutex<Option<String>>,
    calls: AtomicUsize,
}

impl EligibilityRules {
    pub fn new() -> Self {
        Self {
            restrictions: Mutex::new(HashMap::new()),
            failure: Mutex::new(None),
            calls: AtomicUsize::new(0),
        }
    }

    /// テスト用：利用者を予約不可にする
    pub fn restrict(&self, principal_id: PrincipalId, reason: Option<&str>) {
        lock(&self.restrictions).insert(principal_id, reason.map(str::to_string));
    }

    /// テスト用：判定呼び出しを失敗させる
    pub fn fail_with(&self, message: &str) {
        *lock(&self.failure) = Some(message.to_string());
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for EligibilityRules {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EligibilityRulesTrait for EligibilityRules {
    async fn evaluate_reservation_eligibility(
        &self,
        principal_id: PrincipalId,
    ) -> Result<ReservationEligibility> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(message) = lock(&self.failure).clone() {
            return Err(message.into());
        }

        Ok(match lock(&self.restrictions).get(&principal_id) {
            Some(reason) => ReservationEligibility::denied(reason.clone()),
            None => ReservationEligibility::allowed(),
        })
    }
}
