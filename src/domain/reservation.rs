use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::{BookId, PrincipalId, ReservationId};

/// 貸出期間（日数）- 予約時の返却期限の既定値
pub const DEFAULT_LOAN_PERIOD_DAYS: i64 = 7;

/// 返却期限リマインダーの対象期間（日数）
pub const REMINDER_WINDOW_DAYS: i64 = 12;

/// 予約ステータス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    /// 予約中
    Active,
    /// 返却済み
    Returned,
    /// 取消済み
    Cancelled,
}

impl ReservationStatus {
    /// 文字列表現を取得する
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Active => "active",
            ReservationStatus::Returned => "returned",
            ReservationStatus::Cancelled => "cancelled",
        }
    }
}

impl std::str::FromStr for ReservationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(ReservationStatus::Active),
            "returned" => Ok(ReservationStatus::Returned),
            "cancelled" => Ok(ReservationStatus::Cancelled),
            _ => Err(format!("Invalid reservation status: {}", s)),
        }
    }
}

/// 予約（reservationsテーブルの1行）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub reservation_id: ReservationId,
    pub book_id: BookId,
    pub user_id: PrincipalId,
    pub due_date: DateTime<Utc>,
    pub status: ReservationStatus,
    pub reminder_sent: bool,
    pub created_at: DateTime<Utc>,
}

/// 予約の書き込み要求
///
/// 呼び出しごとに組み立てられ、成功すると`Reservation`の行になる。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationRequest {
    pub book_id: BookId,
    pub due_date: DateTime<Utc>,
    pub user_id: PrincipalId,
}

/// 予約可否の判定結果
///
/// 判定ロジックはデータベース側にあり、このクレートでは中身を解釈しない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationEligibility {
    pub can_reserve: bool,
    pub restriction_reason: Option<String>,
}

impl ReservationEligibility {
    pub fn allowed() -> Self {
        Self {
            can_reserve: true,
            restriction_reason: None,
        }
    }

    pub fn denied(reason: Option<String>) -> Self {
        Self {
            can_reserve: false,
            restriction_reason: reason,
        }
    }

    /// 拒否理由（空文字は理由なしとして扱う）
    pub fn reason(&self) -> Option<&str> {
        self.restriction_reason
            .as_deref()
            .filter(|reason| !reason.is_empty())
    }
}

/// 返却期限が近い予約の通知
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DueSoonNotification {
    pub reservation_id: ReservationId,
    pub book_id: BookId,
    pub due_date: DateTime<Utc>,
}

impl From<&Reservation> for DueSoonNotification {
    fn from(reservation: &Reservation) -> Self {
        Self {
            reservation_id: reservation.reservation_id,
            book_id: reservation.book_id,
            due_date: reservation.due_date,
        }
    }
}

/// 予約ポリシー
///
/// 貸出期間とリマインダー期間。設定で上書きできる。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReservationPolicy {
    pub loan_period: Duration,
    pub reminder_window: Duration,
}

impl ReservationPolicy {
    /// 予約日時から返却期限を計算する
    pub fn default_due_date(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now + self.loan_period
    }

    /// 現在時刻を起点としたリマインダー期間
    pub fn reminder_window_at(&self, now: DateTime<Utc>) -> ReminderWindow {
        ReminderWindow {
            from: now,
            to: now + self.reminder_window,
        }
    }
}

impl Default for ReservationPolicy {
    fn default() -> Self {
        Self {
            loan_period: Duration::days(DEFAULT_LOAN_PERIOD_DAYS),
            reminder_window: Duration::days(REMINDER_WINDOW_DAYS),
        }
    }
}

/// リマインダー対象期間 `[from, to]`（両端を含む）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderWindow {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl ReminderWindow {
    pub fn contains(&self, due_date: DateTime<Utc>) -> bool {
        self.from <= due_date && due_date <= self.to
    }
}

/// 予約がリマインダー対象か判定する
///
/// 条件：Active状態、未通知、返却期限が期間内
pub fn is_due_soon(reservation: &Reservation, window: &ReminderWindow) -> bool {
    reservation.status == ReservationStatus::Active
        && !reservation.reminder_sent
        && window.contains(reservation.due_date)
}
