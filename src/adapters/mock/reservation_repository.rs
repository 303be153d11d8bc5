use crate::domain::{
    BookId, DueSoonNotification, PrincipalId, ReminderWindow, Reservation, ReservationId,
    ReservationRequest, ReservationStatus, is_due_soon,
};
use crate::ports::reservation_repository::{
    ReservationRepository as ReservationRepositoryTrait, Result,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use super::lock;

/// ReservationRepositoryのモック実装
pub struct ReservationRepository {
    reservations: Mutex<BTreeMap<ReservationId, Reservation>>,
    next_id: Mutex<i64>,
    fail_inserts: AtomicBool,
}

impl ReservationRepository {
    pub fn new() -> Self {
        Self {
            reservations: Mutex::new(BTreeMap::new()),
            next_id: Mutex::new(1),
            fail_inserts: AtomicBool::new(false),
        }
    }

    /// テスト用：予約を直接追加する
    pub fn add_reservation(
        &self,
        user_id: PrincipalId,
        book_id: BookId,
        due_date: DateTime<Utc>,
        status: ReservationStatus,
        reminder_sent: bool,
    ) -> Reservation {
        let reservation = Reservation {
            reservation_id: self.allocate_id(),
            book_id,
            user_id,
            due_date,
            status,
            reminder_sent,
            created_at: Utc::now(),
        };
        lock(&self.reservations).insert(reservation.reservation_id, reservation.clone());
        reservation
    }

    /// テスト用：書き込みを失敗させる
    pub fn fail_inserts(&self) {
        self.fail_inserts.store(true, Ordering::SeqCst);
    }

    pub fn get(&self, reservation_id: ReservationId) -> Option<Reservation> {
        lock(&self.reservations).get(&reservation_id).cloned()
    }

    pub fn count(&self) -> usize {
        lock(&self.reservations).len()
    }

    fn allocate_id(&self) -> ReservationId {
        let mut next_id = lock(&self.next_id);
        let id = *next_id;
        *next_id += 1;
        ReservationId::try_from(id).unwrap_or_else(|_| unreachable!("reservation ids start at 1"))
    }
}

impl Default for ReservationRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReservationRepositoryTrait for ReservationRepository {
    async fn insert(&self, request: ReservationRequest) -> Result<Reservation> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err("reservation insert rejected".into());
        }
        Ok(self.add_reservation(
            request.user_id,
            request.book_id,
            request.due_date,
            ReservationStatus::Active,
            false,
        ))
    }

    async fn find_by_user(&self, user_id: PrincipalId) -> Result<Vec<Reservation>> {
        Ok(lock(&self.reservations)
            .values()
            .filter(|reservation| reservation.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn find_due_soon(
        &self,
        user_id: PrincipalId,
        window: ReminderWindow,
    ) -> Result<Vec<DueSoonNotification>> {
        Ok(lock(&self.reservations)
            .values()
            .filter(|reservation| reservation.user_id == user_id)
            .filter(|reservation| is_due_soon(reservation, &window))
            .map(DueSoonNotification::from)
            .collect())
    }

    /// 存在しないIDでも成功する（UPDATE 0行と同じ）
    async fn mark_reminder_sent(&self, reservation_id: ReservationId) -> Result<()> {
        if let Some(reservation) = lock(&self.reservations).get_mut(&reservation_id) {
            reservation.reminder_sent = true;
        }
        Ok(())
    }
}
