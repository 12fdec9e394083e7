pub mod todos_handlers;
pub mod todos_models;
