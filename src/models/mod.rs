// src/models/mod.rs

pub mod user;
pub mod auth_token;
pub mod todo;
pub mod project;
pub mod project_member;
