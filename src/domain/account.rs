use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{PrincipalId, SessionToken};

/// 認証済みの利用者
///
/// 作成・削除は認証バックエンドの責務。このクレートは読み取るだけ。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: PrincipalId,
    pub email: String,
}

/// サインイン成功時に発行されるセッション
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: SessionToken,
    pub principal: Principal,
    pub expires_at: DateTime<Utc>,
}

/// 新規登録の入力（検証済み）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}
