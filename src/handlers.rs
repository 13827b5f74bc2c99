pub mod attendance;
pub mod classes;
pub mod health;
pub mod reports;
pub mod students;
pub mod subjects;
pub mod tracks;
pub mod users;
