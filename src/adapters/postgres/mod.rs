pub mod auth_backend;
pub mod book_repository;
pub mod eligibility_rules;
pub mod reservation_repository;

// パブリックに型を再エクスポート
pub use auth_backend::AuthBackend as PostgresAuthBackend;
pub use book_repository::BookRepository as PostgresBookRepository;
pub use eligibility_rules::EligibilityRules as PostgresEligibilityRules;
pub use reservation_repository::ReservationRepository as PostgresReservationRepository;

/// 行データの変換エラー
fn invalid_data(message: impl Into<String>) -> Box<dyn std::error::Error + Send + Sync> {
    Box::new(std::io::Error::new(
        std::io::ErrorKind::InvalidData,
        message.into(),
    ))
}
