pub mod auth;
pub mod config;
pub mod handlers;
pub mod lifecycle;
pub mod models;
pub mod notifier;
pub mod routes;
pub mod store;
pub mod sweeper;
pub mod utils;
