pub mod person;
pub mod principal;
pub mod role;
