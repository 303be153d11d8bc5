pub mod account;
pub mod catalog;
pub mod reservation;

mod dependencies;
mod errors;

pub use dependencies::ServiceDependencies;
pub use errors::{ApplicationError, ErrorKind, Result};
