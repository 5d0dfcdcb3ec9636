pub mod reservation;
pub mod session;
pub mod table;
pub mod user;
