pub mod reservation;
pub mod table;
pub mod user;
