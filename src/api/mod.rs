pub mod error;
pub mod handlers;
pub mod router;
pub mod session;
pub mod types;

pub use handlers::AppState;
pub use router::create_router;
pub use session::{MaybeSession, RequestLocale};
pub use types::*;
