pub mod course;
pub mod filter;
pub mod person;
pub mod seat;
pub mod user;
