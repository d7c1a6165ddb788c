pub mod api;
pub mod browser;
pub mod chat;
pub mod config;
pub mod error;
pub mod gateway;
