pub mod auth_backend;
pub mod book_repository;
pub mod eligibility_rules;
pub mod reservation_repository;

pub use auth_backend::{AuthBackend, AuthError};
pub use book_repository::BookRepository;
pub use eligibility_rules::EligibilityRules;
pub use reservation_repository::ReservationRepository;
