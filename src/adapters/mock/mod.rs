//! インメモリ実装
//!
//! 状態はインスタンスごとに持つ（グローバルな共有状態なし）。
//! テストごとに新しく作成して使う。

pub mod auth_backend;
pub mod book_repository;
pub mod eligibility_rules;
pub mod reservation_repository;

pub use auth_backend::AuthBackend;
pub use book_repository::BookRepository;
pub use eligibility_rules::EligibilityRules;
pub use reservation_repository::ReservationRepository;

use std::sync::{Mutex, MutexGuard, PoisonError};

/// パニックしたスレッドが残したロックもそのまま使う
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
