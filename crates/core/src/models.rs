pub mod reservation;
pub mod salon;
pub mod service;
pub mod staff;
pub mod user;
