pub mod auth;
pub mod course;
pub mod person;
pub mod seat;
