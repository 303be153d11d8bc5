use crate::domain::{Principal, ReservationPolicy, SessionToken};
use crate::ports::*;
use std::sync::Arc;

use super::errors::{ApplicationError, Result};

/// サービスの依存関係
///
/// 振る舞い（メソッド）は持たず、各ユースケース関数に渡すデータ構造。
/// テストではモックアダプターを、本番ではPostgreSQLアダプターを注入する。
#[derive(Clone)]
pub struct ServiceDependencies {
    pub auth: Arc<dyn AuthBackend>,
    pub eligibility_rules: Arc<dyn EligibilityRules>,
    pub books: Arc<dyn BookRepository>,
    pub reservations: Arc<dyn ReservationRepository>,
    pub policy: ReservationPolicy,
}

/// セッションから利用者を解決するヘルパー関数
///
/// セッションがない・無効な場合は`NotAuthenticated`。
pub(crate) async fn resolve_principal(
    deps: &ServiceDependencies,
    session: Option<&SessionToken>,
) -> Result<Principal> {
    let token = session.ok_or(ApplicationError::NotAuthenticated)?;

    deps.auth
        .current_principal(token)
        .await?
        .ok_or(ApplicationError::NotAuthenticated)
}
