pub mod auth;
pub mod availability;
pub mod reservation;
pub mod salon;
