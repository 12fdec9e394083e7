pub mod admin_handlers;
pub mod admin_models;
