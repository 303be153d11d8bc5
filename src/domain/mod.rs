pub mod account;
pub mod book;
pub mod forms;
pub mod reservation;
pub mod value_objects;

pub use account::*;
pub use book::*;
pub use reservation::*;
pub use value_objects::*;
