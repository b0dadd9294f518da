pub mod chat;
pub mod error;
pub mod health;
pub mod schemas;
pub mod sessions;
