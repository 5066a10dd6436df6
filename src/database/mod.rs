pub mod manager;
pub mod models;
pub mod user_store;
