pub mod reassignment;
pub mod user_service;
