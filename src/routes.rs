pub mod routes;
pub mod users;
pub mod todos;
pub mod reports;
pub mod admin;
