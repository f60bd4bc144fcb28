pub mod auth;
pub mod course;
pub mod health;
pub mod person;
pub mod root;
pub mod seat;
