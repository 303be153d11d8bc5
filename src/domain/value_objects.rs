use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 利用者ID - 認証バックエンドが発行する主体の識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrincipalId(Uuid);

impl PrincipalId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl Default for PrincipalId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// IDの値が不正
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("identifier must be a positive integer, got {0}")]
pub struct InvalidId(pub i64);

/// 書籍ID - データベースが採番する正の整数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct BookId(i64);

impl BookId {
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for BookId {
    type Error = InvalidId;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if value <= 0 {
            return Err(InvalidId(value));
        }
        Ok(Self(value))
    }
}

impl From<BookId> for i64 {
    fn from(id: BookId) -> Self {
        id.0
    }
}

impl std::fmt::Display for BookId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// 予約ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct ReservationId(i64);

impl ReservationId {
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for ReservationId {
    type Error = InvalidId;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if value <= 0 {
            return Err(InvalidId(value));
        }
        Ok(Self(value))
    }
}

impl From<ReservationId> for i64 {
    fn from(id: ReservationId) -> Self {
        id.0
    }
}

impl std::fmt::Display for ReservationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// セッショントークン
///
/// 認証バックエンドが発行する不透明な文字列。中身は解釈しない。
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// トークンをログに出さない
impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionToken(***)")
    }
}
