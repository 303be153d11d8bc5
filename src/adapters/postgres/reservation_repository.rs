use crate::domain::{
    BookId, DueSoonNotification, PrincipalId, ReminderWindow, Reservation, ReservationId,
    ReservationRequest, ReservationStatus,
};
use crate::ports::reservation_repository::{
    ReservationRepository as ReservationRepositoryTrait, Result,
};
use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};
use std::str::FromStr;

use super::invalid_data;

/// PostgreSQLの行データをReservationに変換する
fn map_row_to_reservation(row: &PgRow) -> Result<Reservation> {
    let status_str: &str = row.get("status");
    let status = ReservationStatus::from_str(status_str).map_err(invalid_data)?;

    Ok(Reservation {
        reservation_id: ReservationId::try_from(row.get::<i64, _>("reservation_id"))?,
        book_id: BookId::try_from(row.get::<i64, _>("book_id"))?,
        user_id: PrincipalId::from_uuid(row.get("user_id")),
        due_date: row.get("due_date"),
        status,
        reminder_sent: row.get("reminder_sent"),
        created_at: row.get("created_at"),
    })
}

/// ReservationRepositoryのPostgreSQL実装
pub struct ReservationRepository {
    pool: PgPool,
}

impl ReservationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReservationRepositoryTrait for ReservationRepository {
    async fn insert(&self, request: ReservationRequest) -> Result<Reservation> {
        let row = sqlx::query(
            r#"
            INSERT INTO reservations (book_id, user_id, due_date)
            VALUES ($1, $2, $3)
            RETURNING
                reservation_id,
                book_id,
                user_id,
                due_date,
                status,
                reminder_sent,
                created_at
            "#,
        )
        .bind(request.book_id.value())
        .bind(request.user_id.value())
        .bind(request.due_date)
        .fetch_one(&self.pool)
        .await?;

        map_row_to_reservation(&row)
    }

    async fn find_by_user(&self, user_id: PrincipalId) -> Result<Vec<Reservation>> {
        let rows = sqlx::query(
            r#"
            SELECT
                reservation_id,
                book_id,
                user_id,
                due_date,
                status,
                reminder_sent,
                created_at
            FROM reservations
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id.value())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_row_to_reservation).collect()
    }

    /// (user_id, status, reminder_sent, due_date) の部分インデックスを使う
    async fn find_due_soon(
        &self,
        user_id: PrincipalId,
        window: ReminderWindow,
    ) -> Result<Vec<DueSoonNotification>> {
        let rows = sqlx::query(
            r#"
            SELECT reservation_id, book_id, due_date
            FROM reservations
            WHERE user_id = $1
              AND status = 'active'
              AND reminder_sent = FALSE
              AND due_date >= $2
              AND due_date <= $3
            ORDER BY due_date ASC
            "#,
        )
        .bind(user_id.value())
        .bind(window.from)
        .bind(window.to)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(DueSoonNotification {
                    reservation_id: ReservationId::try_from(row.get::<i64, _>("reservation_id"))?,
                    book_id: BookId::try_from(row.get::<i64, _>("book_id"))?,
                    due_date: row.get("due_date"),
                })
            })
            .collect()
    }

    async fn mark_reminder_sent(&self, reservation_id: ReservationId) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE reservations
            SET reminder_sent = TRUE
            WHERE reservation_id = $1
            "#,
        )
        .bind(reservation_id.value())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
