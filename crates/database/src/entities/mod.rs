pub mod addresses;
pub mod courses;
pub mod persons;
pub mod seats;
pub mod users;
