mod due_date_notification;
mod reservation_service;

pub use due_date_notification::{list_due_soon, mark_reminded};
pub use reservation_service::{ReserveBook, check_eligibility, list_my_reservations, reserve};
