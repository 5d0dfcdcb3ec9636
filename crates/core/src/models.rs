pub mod reservation;
pub mod slot;
pub mod table;
pub mod user;
